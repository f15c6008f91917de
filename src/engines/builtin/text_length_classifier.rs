// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engines::{Engine, EngineData, EngineMetadata};
use crate::errors::EngineFailure;

pub const EMPTY: &str = "EMPTY";
pub const SHORT: &str = "SHORT";
pub const LONG: &str = "LONG";

/// Passes text through unchanged and reports `EMPTY`, `SHORT` or `LONG` as
/// its state, so compositions can branch on input length.
pub struct TextLengthClassifierEngine {
    short_limit: usize,
}

impl TextLengthClassifierEngine {
    pub fn new() -> Self {
        Self { short_limit: 16 }
    }

    pub fn with_short_limit(short_limit: usize) -> Self {
        Self { short_limit }
    }
}

#[async_trait]
impl Engine for TextLengthClassifierEngine {
    async fn execute(&mut self, input: EngineData) -> Result<EngineData, EngineFailure> {
        let length = input.as_text()?.chars().count();
        let state = match length {
            0 => EMPTY,
            n if n <= self.short_limit => SHORT,
            _ => LONG,
        };
        Ok(input.with_state(state))
    }

    /// Accepts a decimal number as the new short/long boundary.
    async fn configure(&mut self, input: EngineData) -> Result<(), EngineFailure> {
        let limit = input.as_text()?.trim();
        self.short_limit = limit
            .parse()
            .map_err(|e| EngineFailure::invalid_input(format!("invalid short limit '{}': {}", limit, e)))?;
        Ok(())
    }

    fn metadata(&self) -> EngineMetadata {
        EngineMetadata::text(
            "text_length_classifier",
            "Reports EMPTY, SHORT or LONG depending on the input length",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_classifies_and_reconfigures() {
        let mut engine = TextLengthClassifierEngine::with_short_limit(3);
        let cases = [("", EMPTY), ("abc", SHORT), ("abcd", LONG)];
        for (input, expected) in cases {
            let output = engine.execute(EngineData::text(input)).await.unwrap();
            assert_eq!(output.state.as_deref(), Some(expected));
            assert_eq!(output.as_text().unwrap(), input);
        }

        engine.configure(EngineData::text("10")).await.unwrap();
        let output = engine.execute(EngineData::text("abcd")).await.unwrap();
        assert_eq!(output.state.as_deref(), Some(SHORT));

        assert!(engine.configure(EngineData::text("ten")).await.is_err());
    }
}
