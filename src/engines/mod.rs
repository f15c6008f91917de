// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The user compute contract and the engine plugin table.
//!
//! Services do not know what they compute. Each deployed service wraps a pool
//! of [`Engine`] instances created from an [`EngineRegistry`] entry, resolved
//! by engine type name at deploy time.

mod data;
mod registry;
mod traits;

pub mod builtin;
pub mod stub;

pub use data::EngineData;
pub use registry::{EngineFactory, EngineRegistry};
pub use traits::{Engine, EngineMetadata};
