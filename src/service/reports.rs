// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// How often a service publishes `done` and `data` reports.
///
/// A frequency of `n` reports every n-th successful execution; 0 turns the
/// report off.
#[derive(Debug, Default)]
pub struct ReportPolicy {
    done_every: AtomicU32,
    data_every: AtomicU32,
    executions: AtomicU64,
}

/// Reports due after one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DueReports {
    pub done: bool,
    pub data: bool,
}

impl ReportPolicy {
    pub fn set_done_every(&self, every: u32) {
        self.done_every.store(every, Ordering::Relaxed);
    }

    pub fn set_data_every(&self, every: u32) {
        self.data_every.store(every, Ordering::Relaxed);
    }

    pub fn done_every(&self) -> u32 {
        self.done_every.load(Ordering::Relaxed)
    }

    pub fn data_every(&self) -> u32 {
        self.data_every.load(Ordering::Relaxed)
    }

    pub fn executions(&self) -> u64 {
        self.executions.load(Ordering::Relaxed)
    }

    /// Count one successful execution and say which reports it triggers.
    pub fn record_execution(&self) -> DueReports {
        let count = self.executions.fetch_add(1, Ordering::Relaxed) + 1;
        let due = |every: u32| every > 0 && count % u64::from(every) == 0;
        DueReports {
            done: due(self.done_every()),
            data: due(self.data_every()),
        }
    }
}
