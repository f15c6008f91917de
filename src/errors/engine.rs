// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::protocol::Severity;

/// Failure reported by user engine code.
///
/// This is the engine boundary: engines never panic or throw to signal a
/// bad request, they return this value and the service runtime turns it into
/// an `error:<severity>:<service>` report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineFailure {
    pub severity: Severity,
    pub message: String,
}

impl EngineFailure {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    /// Shorthand for a request the engine could not accept (bad input).
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(Severity::Minor, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }
}
