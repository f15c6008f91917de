// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engines for tests and placeholder deployments.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::{Engine, EngineData, EngineMetadata};
use crate::errors::EngineFailure;
use crate::protocol::Severity;

/// Echoes its input, optionally tagging it with a fixed state
pub struct StubEngine {
    name: String,
    state: Option<String>,
}

impl StubEngine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: None,
        }
    }

    pub fn with_state(name: &str, state: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Some(state.to_string()),
        }
    }
}

#[async_trait]
impl Engine for StubEngine {
    async fn execute(&mut self, mut input: EngineData) -> Result<EngineData, EngineFailure> {
        input.state = self.state.clone();
        Ok(input)
    }

    fn metadata(&self) -> EngineMetadata {
        EngineMetadata::text(&self.name, "stub")
    }
}

/// An engine that always fails, for testing failure reports
pub struct FailingEngine {
    severity: Severity,
}

impl FailingEngine {
    pub fn new(severity: Severity) -> Self {
        Self { severity }
    }
}

#[async_trait]
impl Engine for FailingEngine {
    async fn execute(&mut self, _input: EngineData) -> Result<EngineData, EngineFailure> {
        Err(EngineFailure::new(self.severity, "Simulated engine failure"))
    }

    fn metadata(&self) -> EngineMetadata {
        EngineMetadata::text("failing", "always fails")
    }
}

/// Echo engine whose executions block until the test opens the gate.
///
/// Each execution consumes one permit of `gate`; `started` and `configured`
/// count calls across every instance sharing the counters.
pub struct GatedEngine {
    gate: Arc<Semaphore>,
    started: Arc<AtomicUsize>,
    configured: Arc<AtomicUsize>,
}

impl GatedEngine {
    pub fn new(gate: Arc<Semaphore>, started: Arc<AtomicUsize>, configured: Arc<AtomicUsize>) -> Self {
        Self {
            gate,
            started,
            configured,
        }
    }
}

#[async_trait]
impl Engine for GatedEngine {
    async fn execute(&mut self, input: EngineData) -> Result<EngineData, EngineFailure> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| EngineFailure::internal("gate closed"))?;
        permit.forget();
        Ok(input)
    }

    async fn configure(&mut self, _input: EngineData) -> Result<(), EngineFailure> {
        self.configured.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn metadata(&self) -> EngineMetadata {
        EngineMetadata::text("gated", "echo gated by a semaphore")
    }
}
