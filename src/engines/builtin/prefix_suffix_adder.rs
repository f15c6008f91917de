// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engines::{Engine, EngineData, EngineMetadata};
use crate::errors::EngineFailure;

/// Configuration for the Prefix/Suffix Adder engine, sent as JSON in a
/// configure request: `{"prefix": "[", "suffix": "]"}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PrefixSuffixConfig {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

/// Prefix/Suffix Adder engine - wraps text in a configurable prefix and suffix
#[derive(Default)]
pub struct PrefixSuffixAdderEngine {
    config: PrefixSuffixConfig,
}

impl PrefixSuffixAdderEngine {
    pub fn new(config: PrefixSuffixConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Engine for PrefixSuffixAdderEngine {
    async fn execute(&mut self, input: EngineData) -> Result<EngineData, EngineFailure> {
        let text = input.as_text()?;
        let result = format!(
            "{}{}{}",
            self.config.prefix.as_deref().unwrap_or_default(),
            text,
            self.config.suffix.as_deref().unwrap_or_default()
        );
        Ok(EngineData::text(result).with_communication_id(input.communication_id))
    }

    async fn configure(&mut self, input: EngineData) -> Result<(), EngineFailure> {
        self.config = serde_json::from_slice(&input.payload)
            .map_err(|e| EngineFailure::invalid_input(format!("invalid prefix/suffix config: {}", e)))?;
        Ok(())
    }

    fn metadata(&self) -> EngineMetadata {
        EngineMetadata::text("prefix_suffix_adder", "Adds a configurable prefix and suffix")
    }
}
