// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wire-level vocabulary shared by DPEs, services and orchestrators.
//!
//! * [`message`] - the envelope and metadata every published message carries
//! * [`control`] - `?`-separated control commands (`DEPLOY_SERVICE?...`)
//! * [`report`] - report topics (`done:`, `data:`, `warning:`, `error:`, `info:`)
//! * [`topic`] - hierarchical pub/sub topics with prefix matching

pub mod control;
pub mod message;
pub mod report;
pub mod topic;

pub use control::ControlRequest;
pub use message::{Action, ConfigureMode, DataLocation, Message, Meta, Status};
pub use report::{ReportKind, Severity};
pub use topic::Topic;
