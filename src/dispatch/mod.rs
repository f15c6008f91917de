// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Delivery of service output to the next services of a composition.
//!
//! Hops between services of the same DPE (same host and port) leave the
//! payload in the DPE's [`SharedMemory`] table and publish only a pointer
//! message; every other hop publishes the full payload.

mod dispatcher;
mod shared_memory;

pub use dispatcher::{Delivery, Dispatcher};
pub use shared_memory::{SharedMemory, SharedMemoryKey};
