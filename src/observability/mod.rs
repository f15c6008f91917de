// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic and operational log line of the runtime is a message
//! struct implementing `Display` and [`messages::StructuredLog`], so log text
//! lives in one place and fields are emitted as structured `tracing` fields.
//!
//! Messages are organized by subsystem:
//! * `messages::composition` - composition compilation and caching
//! * `messages::routing` - AND barriers, conditional branches and route selection
//! * `messages::service` - service deployment, execution and reports
//! * `messages::dpe` - DPE and container lifecycle and control commands
//!
//! # Usage
//!
//! ```rust
//! use dpe_runtime::observability::messages::StructuredLog;
//! use dpe_runtime::observability::messages::dpe::ContainerStarted;
//!
//! let msg = ContainerStarted {
//!     container: "10.1.1.1_java:analysis",
//! };
//!
//! msg.log();
//! tracing::info!("{}", msg);
//! ```

pub mod messages;
