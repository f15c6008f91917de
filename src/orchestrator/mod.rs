// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Front-end client: deploys containers and services through DPE control
//! topics, injects requests into compositions and listens to reports.

mod client;

pub use client::Orchestrator;
