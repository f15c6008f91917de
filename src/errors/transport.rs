// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the pub/sub collaborator. Never retried by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,

    #[error("no reply on '{topic}' within {timeout:?}")]
    Timeout { topic: String, timeout: Duration },

    #[error("could not decode message: {0}")]
    Codec(String),

    #[error("publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },
}

impl From<prost::DecodeError> for TransportError {
    fn from(err: prost::DecodeError) -> Self {
        TransportError::Codec(err.to_string())
    }
}
