// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use super::consts::{DEFAULT_QUEUE_CAPACITY, FALLBACK_POOL_SIZE};

/// Runtime defaults shared by every service a DPE deploys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Engine pool size for services deployed without one.
    pub pool_size: usize,
    /// Incomplete AND groups older than this are dropped.
    pub barrier_ttl: Option<Duration>,
    /// Bounded work queue depth of each service.
    pub queue_capacity: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            pool_size: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_POOL_SIZE),
            barrier_ttl: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
