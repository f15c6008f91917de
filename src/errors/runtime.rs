// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors of the service / container / DPE layers and the orchestrator client.

use thiserror::Error;

use super::{CompositionError, EngineFailure, NameError, PoolError, RoutingError, TransportError};

/// Deploy and undeploy failures at container or DPE level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error("'{name}' is not contained by '{parent}'")]
    NotContained { name: String, parent: String },

    #[error("container '{0}' is not deployed")]
    UnknownContainer(String),

    #[error("service '{0}' is not deployed")]
    UnknownService(String),

    #[error("unknown engine type '{0}'")]
    UnknownEngineType(String),

    #[error("pool size for '{0}' must be greater than zero")]
    InvalidPoolSize(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Malformed or unsupported control commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("empty control command")]
    Empty,

    #[error("unknown control verb '{0}'")]
    UnknownVerb(String),

    #[error("{verb} expects {expected} argument(s), got {got}")]
    Arity {
        verb: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("{verb}: invalid argument '{value}': {reason}")]
    InvalidArgument {
        verb: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures resolving an inbound payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("no shared-memory entry for receiver '{receiver}', sender '{sender}', communication {communication_id}")]
    MissingSharedMemoryEntry {
        receiver: String,
        sender: String,
        communication_id: i64,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Everything that can stop a single message from being served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("invalid sender: {0}")]
    Sender(#[from] NameError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("engine failed: {0}")]
    Engine(#[from] EngineFailure),
}

/// Errors seen by callers of the orchestrator client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    /// The remote side answered with an error status.
    #[error("'{source_name}' reported: {message}")]
    Remote { source_name: String, message: String },
}
