// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for routing events.
//!
//! This module contains message types for logging events related to:
//! * AND barrier arrivals, completion and eviction
//! * Senders that no statement expects
//! * The destinations selected for an output

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// An input arrived at an AND barrier that is still incomplete.
///
/// # Log Level
/// `debug!` - Routine while fan-in inputs trickle in
///
/// # Example
/// ```
/// use dpe_runtime::observability::messages::routing::BarrierPending;
///
/// let msg = BarrierPending {
///     owner: "10.1.1.1_java:c:B",
///     sender: "10.1.1.1_java:c:A",
///     communication_id: 7,
///     arrived: 1,
///     expected: 2,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct BarrierPending<'a> {
    pub owner: &'a str,
    pub sender: &'a str,
    pub communication_id: i64,
    pub arrived: usize,
    pub expected: usize,
}

impl Display for BarrierPending<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "'{}' waiting on AND inputs for request {}: {}/{} arrived (last from '{}')",
            self.owner, self.communication_id, self.arrived, self.expected, self.sender
        )
    }
}

impl StructuredLog for BarrierPending<'_> {
    fn log(&self) {
        tracing::debug!(
            owner = self.owner,
            sender = self.sender,
            communication_id = self.communication_id,
            arrived = self.arrived,
            expected = self.expected,
            "{}", self
        );
    }
}

/// Every input of an AND barrier arrived.
///
/// # Log Level
/// `debug!`
pub struct BarrierCompleted<'a> {
    pub owner: &'a str,
    pub communication_id: i64,
    pub inputs: usize,
}

impl Display for BarrierCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "'{}' AND barrier complete for request {} with {} inputs",
            self.owner, self.communication_id, self.inputs
        )
    }
}

impl StructuredLog for BarrierCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            owner = self.owner,
            communication_id = self.communication_id,
            inputs = self.inputs,
            "{}", self
        );
    }
}

/// Barriers were dropped, either because a new composition replaced the one
/// they belonged to or because they outlived the barrier TTL.
///
/// # Log Level
/// `warn!` - Buffered inputs were discarded
pub struct BarriersDropped<'a> {
    pub owner: &'a str,
    pub count: usize,
    pub reason: &'a str,
}

impl Display for BarriersDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "'{}' dropped {} incomplete AND barriers: {}",
            self.owner, self.count, self.reason
        )
    }
}

impl StructuredLog for BarriersDropped<'_> {
    fn log(&self) {
        tracing::warn!(
            owner = self.owner,
            count = self.count,
            reason = self.reason,
            "{}", self
        );
    }
}

/// A message came from a sender no statement expects.
///
/// # Log Level
/// `warn!` - The message is dropped
///
/// # Example
/// ```
/// use dpe_runtime::observability::messages::routing::SenderRejected;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "unexpected sender");
/// let msg = SenderRejected {
///     owner: "10.1.1.1_java:c:B",
///     sender: "10.1.1.1_java:c:Z",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct SenderRejected<'a> {
    pub owner: &'a str,
    pub sender: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for SenderRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "'{}' dropped message from '{}': {}",
            self.owner, self.sender, self.error
        )
    }
}

impl StructuredLog for SenderRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            owner = self.owner,
            sender = self.sender,
            error = %self.error,
            "{}", self
        );
    }
}

/// Destinations chosen for an output.
///
/// # Log Level
/// `trace!` - Emitted for every routed message
pub struct RouteSelected<'a> {
    pub owner: &'a str,
    pub communication_id: i64,
    pub destinations: &'a [String],
}

impl Display for RouteSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.destinations.is_empty() {
            write!(f, "'{}' output for request {} ends here", self.owner, self.communication_id)
        } else {
            write!(
                f,
                "'{}' routing request {} to {}",
                self.owner,
                self.communication_id,
                self.destinations.join(", ")
            )
        }
    }
}

impl StructuredLog for RouteSelected<'_> {
    fn log(&self) {
        tracing::trace!(
            owner = self.owner,
            communication_id = self.communication_id,
            destinations = self.destinations.len(),
            "{}", self
        );
    }
}
