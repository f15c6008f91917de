// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for human-readable output and
//! [`StructuredLog`] to emit itself at its own level with its fields attached.
//! Messages that announce a unit of work also implement [`SpannedLog`], and
//! the work runs inside the span they open.
//!
//! # Organization
//!
//! * `composition` - composition compilation events
//! * `routing` - barrier and route selection events
//! * `service` - service lifecycle, execution and report events
//! * `dpe` - DPE, container and control command events
//!
//! # Usage Pattern
//!
//! ```rust
//! use dpe_runtime::observability::messages::{SpannedLog, StructuredLog};
//! use dpe_runtime::observability::messages::service::MessageReceived;
//!
//! let msg = MessageReceived {
//!     service: "10.1.1.1_java:analysis:upper",
//!     sender: "10.1.1.9_java:orchestrator:client",
//!     communication_id: 7,
//!     action: "execute",
//! };
//!
//! msg.log();
//! let _span = msg.span("serve").entered();
//! ```

use tracing::Span;

pub mod composition;
pub mod dpe;
pub mod routing;
pub mod service;

/// A log message that knows its level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its level with its fields attached.
    fn log(&self);
}

pub trait SpannedLog: StructuredLog {
    /// Open a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}
