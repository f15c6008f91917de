// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised by the composition compiler.
///
/// Neither variant is retried: a composition that fails to compile is a
/// configuration problem of whoever attached it to the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// Malformed composition text: unbalanced braces, a bad condition, an
    /// empty chain term or a token that is not a canonical service name.
    #[error("invalid composition '{composition}': {reason}")]
    Syntax { composition: String, reason: String },

    /// The compiling service does not appear anywhere in the composition.
    #[error("service '{owner}' does not appear in composition '{composition}'")]
    OwnerNotFound { owner: String, composition: String },
}

impl CompositionError {
    pub(crate) fn syntax(composition: &str, reason: impl Into<String>) -> Self {
        Self::Syntax {
            composition: composition.to_string(),
            reason: reason.into(),
        }
    }
}
