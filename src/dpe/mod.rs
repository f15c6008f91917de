// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data processing environment: the process-level owner of containers.
//!
//! A [`Dpe`] owns its containers and the shared-memory table its services
//! exchange local payloads through. Once [`Dpe::run`] is called it serves
//! `?`-separated control commands on its control topic:
//!
//! | verb                    | effect                                              |
//! |-------------------------|-----------------------------------------------------|
//! | `START_CONTAINER`       | start (or keep) a container                         |
//! | `STOP_CONTAINER`        | undeploy every service of a container and remove it |
//! | `DEPLOY_SERVICE`        | deploy a service into a running container           |
//! | `REMOVE_SERVICE`        | undeploy a service                                  |
//! | `SERVICE_REPORT_DONE`   | set how often a service publishes `done` reports    |
//! | `SERVICE_REPORT_DATA`   | set how often a service publishes `data` reports    |
//! | `SET_FRONT_END`         | record the front-end and announce this DPE to it    |
//! | `START_DPE`/`STOP_DPE`  | a DPE joins/leaves; `STOP_DPE` for itself shuts down|
//! | `PING_DPE`              | publish `info:<dpe>` with a JSON snapshot           |
//!
//! Every command with a `reply_to` gets an answer: `ok`, the snapshot for
//! `PING_DPE`, or an error-status message.

mod handle;
mod runtime;

pub use handle::DpeHandle;
pub use runtime::{Dpe, DpeSnapshot};
