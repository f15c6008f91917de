// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Service runtime.
//!
//! A [`Service`] wraps one engine type: a pool of engine instances, the
//! composition cache and routing state of the service, and the dispatcher
//! its output leaves through. A [`ServiceHandle`] attaches a service to the
//! bus and serves its topic with a worker pool.

mod handle;
mod reports;
mod runtime;
mod spec;

#[cfg(test)]
mod integration_tests;

pub use handle::ServiceHandle;
pub use reports::ReportPolicy;
pub use runtime::{Service, ServiceSnapshot};
pub use spec::ServiceSpec;
