// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::{Duration, Instant};

use crate::composition::StatementId;
use crate::name::CanonicalName;

/// Result of one input arriving at an AND barrier.
#[derive(Debug, PartialEq)]
pub enum Arrival<P> {
    /// Still waiting; `arrived` of `expected` senders delivered.
    Pending { arrived: usize, expected: usize },
    /// Every expected sender delivered. The group is removed from the store.
    Complete(BTreeMap<CanonicalName, P>),
    /// This sender already delivered to the open group.
    Duplicate,
}

struct Group<P> {
    arrivals: BTreeMap<CanonicalName, P>,
    opened_at: Instant,
}

/// Pending AND groups of one service, keyed by statement and communication
/// id so concurrent requests never share a group.
///
/// Groups belong to the composition text they were opened under. When a
/// different composition shows up every open group is discarded.
pub struct BarrierStore<P> {
    composition: Option<String>,
    groups: HashMap<(StatementId, i64), Group<P>>,
    ttl: Option<Duration>,
}

impl<P> BarrierStore<P> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            composition: None,
            groups: HashMap::new(),
            ttl,
        }
    }

    /// Bind the store to `raw`, returning how many groups were discarded.
    pub fn supersede(&mut self, raw: &str) -> usize {
        if self.composition.as_deref() == Some(raw) {
            return 0;
        }
        self.composition = Some(raw.to_string());
        let dropped = self.groups.len();
        self.groups.clear();
        dropped
    }

    /// Drop groups opened more than the TTL before `now`.
    pub fn evict_expired(&mut self, now: Instant) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = self.groups.len();
        self.groups
            .retain(|_, group| now.saturating_duration_since(group.opened_at) < ttl);
        before - self.groups.len()
    }

    pub fn arrive(
        &mut self,
        statement: StatementId,
        communication_id: i64,
        sender: &CanonicalName,
        payload: P,
        expected: &BTreeSet<CanonicalName>,
    ) -> Arrival<P> {
        let key = (statement, communication_id);
        let group = self.groups.entry(key).or_insert_with(|| Group {
            arrivals: BTreeMap::new(),
            opened_at: Instant::now(),
        });
        if group.arrivals.contains_key(sender) {
            return Arrival::Duplicate;
        }
        group.arrivals.insert(sender.clone(), payload);

        let complete = group.arrivals.len() == expected.len()
            && group.arrivals.keys().zip(expected.iter()).all(|(a, b)| a == b);
        if !complete {
            return Arrival::Pending {
                arrived: group.arrivals.len(),
                expected: expected.len(),
            };
        }
        match self.groups.remove(&key) {
            Some(group) => Arrival::Complete(group.arrivals),
            None => Arrival::Pending {
                arrived: 0,
                expected: expected.len(),
            },
        }
    }

    pub fn open_groups(&self) -> usize {
        self.groups.len()
    }
}
