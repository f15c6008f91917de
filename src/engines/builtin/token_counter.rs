use async_trait::async_trait;
use serde::Serialize;

use crate::engines::{Engine, EngineData, EngineMetadata};
use crate::errors::EngineFailure;

/// Token Counter engine - counts characters, words and lines, emits JSON
pub struct TokenCounterEngine;

impl TokenCounterEngine {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct TokenCountResult {
    char_count: usize,
    word_count: usize,
    line_count: usize,
}

#[async_trait]
impl Engine for TokenCounterEngine {
    async fn execute(&mut self, input: EngineData) -> Result<EngineData, EngineFailure> {
        let text = input.as_text()?;
        let result = TokenCountResult {
            char_count: text.chars().count(),
            word_count: text.split_whitespace().count(),
            line_count: text.lines().count().max(1), // At least 1 line even if empty
        };

        let json = serde_json::to_vec(&result)
            .map_err(|e| EngineFailure::internal(format!("Failed to serialize result: {}", e)))?;

        Ok(EngineData {
            mime_type: EngineData::JSON.to_string(),
            payload: json,
            communication_id: input.communication_id,
            ..Default::default()
        })
    }

    fn metadata(&self) -> EngineMetadata {
        EngineMetadata {
            output_types: vec![EngineData::JSON.to_string()],
            ..EngineMetadata::text("token_counter", "Counts characters, words and lines")
        }
    }
}
