// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Containers: named groups of services inside one DPE.
//!
//! A container owns the running [`crate::service::ServiceHandle`]s of its
//! services. Deploying validates that the service name lives inside the
//! container, builds the engine pool from the [`crate::engines::EngineRegistry`]
//! and registers the service with the [`crate::transport::Registrar`].
//! Undeploying stops the service, drops its pending shared-memory entries and
//! unregisters it. Both are idempotent.

mod context;
mod runtime;

pub use context::RuntimeContext;
pub use runtime::{Container, ContainerSnapshot};
