// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for composition compilation events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A composition was compiled for a service and cached.
///
/// # Log Level
/// `debug!` - Happens once per distinct composition per service
///
/// # Example
/// ```
/// use dpe_runtime::observability::messages::composition::CompositionCompiled;
///
/// let msg = CompositionCompiled {
///     owner: "10.1.1.1_java:c:B",
///     composition: "10.1.1.1_java:c:A+10.1.1.1_java:c:B",
///     instructions: 1,
///     statements: 1,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct CompositionCompiled<'a> {
    pub owner: &'a str,
    pub composition: &'a str,
    pub instructions: usize,
    pub statements: usize,
}

impl Display for CompositionCompiled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled composition for '{}': {} instructions, {} statements",
            self.owner, self.instructions, self.statements
        )
    }
}

impl StructuredLog for CompositionCompiled<'_> {
    fn log(&self) {
        tracing::debug!(
            owner = self.owner,
            composition = self.composition,
            instructions = self.instructions,
            statements = self.statements,
            "{}", self
        );
    }
}

/// A composition could not be compiled for a service.
///
/// # Log Level
/// `error!` - The request carrying it is dropped
pub struct CompositionRejected<'a> {
    pub owner: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CompositionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected composition for '{}': {}", self.owner, self.error)
    }
}

impl StructuredLog for CompositionRejected<'_> {
    fn log(&self) {
        tracing::error!(
            owner = self.owner,
            error = %self.error,
            "{}", self
        );
    }
}
