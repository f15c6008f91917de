// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engines::{Engine, EngineData, EngineMetadata};
use crate::errors::EngineFailure;

/// Reverse Text engine - reverses the input string
pub struct ReverseTextEngine;

impl ReverseTextEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Engine for ReverseTextEngine {
    async fn execute(&mut self, input: EngineData) -> Result<EngineData, EngineFailure> {
        let reversed: String = input.as_text()?.chars().rev().collect();
        Ok(EngineData::text(reversed).with_communication_id(input.communication_id))
    }

    fn metadata(&self) -> EngineMetadata {
        EngineMetadata::text("reverse_text", "Reverses the input text")
    }
}
