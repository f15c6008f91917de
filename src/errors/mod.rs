// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod composition;
mod config;
mod engine;
mod name;
mod pool;
mod routing;
mod runtime;
mod transport;

pub use composition::CompositionError;
pub use config::ConfigError;
pub use engine::EngineFailure;
pub use name::NameError;
pub use pool::PoolError;
pub use routing::RoutingError;
pub use runtime::{ControlError, DeployError, DispatchError, OrchestratorError, ServiceError};
pub use transport::TransportError;
