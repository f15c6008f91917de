// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod composition;   // composition DSL compiler + cache
pub mod config;        // DPE config loading + validation
pub mod container;     // service groups inside a DPE
pub mod dispatch;      // local (shared memory) vs network delivery
pub mod dpe;           // process-level runtime and control loop
pub mod engines;       // engine contract, plugin table, built-ins
pub mod errors;        // error handling
pub mod name;          // canonical names
pub mod observability;
pub mod orchestrator;  // front-end client
pub mod pool;          // object + worker pools
pub mod protocol;      // wire envelope, control commands, reports
pub mod routing;       // routing evaluator, AND barriers, service state
pub mod service;       // service runtime
pub mod transport;     // pub/sub + registrar seam, in-memory bus
