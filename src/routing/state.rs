// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use crate::name::CanonicalName;

/// Last state reported by each known service, as seen by one service.
///
/// Written after every execution that reports a state (the owner's own and
/// the sender states carried by incoming messages), read by conditional
/// guards.
#[derive(Debug, Default)]
pub struct ServiceStateTable {
    states: RwLock<HashMap<CanonicalName, String>>,
}

impl ServiceStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, service: &CanonicalName, state: impl Into<String>) {
        self.states.write().insert(service.clone(), state.into());
    }

    pub fn get(&self, service: &CanonicalName) -> Option<String> {
        self.states.read().get(service).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.states
            .read()
            .iter()
            .map(|(name, state)| (name.to_string(), state.clone()))
            .collect()
    }
}
