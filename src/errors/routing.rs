// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised by the routing evaluator.
///
/// The offending message is dropped; the pending group it was aimed at is
/// left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("'{sender}' is not part of any AND group of '{owner}'")]
    UnexpectedSender { owner: String, sender: String },

    #[error("'{sender}' already delivered to the AND group of '{owner}' for communication {communication_id}")]
    DuplicateSender {
        owner: String,
        sender: String,
        communication_id: i64,
    },
}
