// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::EngineFailure;

/// Application data handed to and returned from engines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineData {
    pub mime_type: String,
    pub payload: Vec<u8>,
    pub description: String,
    /// Output state label reported by the engine, read by conditional routing.
    pub state: Option<String>,
    /// Logical execution this data belongs to. Keeps concurrent AND groups apart.
    pub communication_id: i64,
}

impl EngineData {
    pub const TEXT: &'static str = "text/string";
    pub const BYTES: &'static str = "binary/bytes";
    pub const JSON: &'static str = "application/json";

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            mime_type: Self::TEXT.to_string(),
            payload: text.into().into_bytes(),
            ..Default::default()
        }
    }

    pub fn bytes(payload: Vec<u8>) -> Self {
        Self {
            mime_type: Self::BYTES.to_string(),
            payload,
            ..Default::default()
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_communication_id(mut self, communication_id: i64) -> Self {
        self.communication_id = communication_id;
        self
    }

    /// Payload as UTF-8, or an invalid-input failure.
    pub fn as_text(&self) -> Result<&str, EngineFailure> {
        std::str::from_utf8(&self.payload)
            .map_err(|e| EngineFailure::invalid_input(format!("Invalid UTF-8 input: {}", e)))
    }
}
