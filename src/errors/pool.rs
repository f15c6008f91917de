// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Immediate configuration was requested while executions are in flight.
    #[error("configuration refused: {in_use} of {capacity} engine instances are busy")]
    ConfigureBusy { in_use: usize, capacity: usize },

    #[error("pool did not become idle within {timeout:?}")]
    PoolExhaustionTimeout { timeout: Duration },

    /// The pool was closed by an undeploy.
    #[error("pool is closed")]
    Closed,
}
