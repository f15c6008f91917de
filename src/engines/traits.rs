use async_trait::async_trait;
use serde::Serialize;

use super::EngineData;
use crate::errors::EngineFailure;

/// Descriptive information an engine exposes about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub input_types: Vec<String>,
    pub output_types: Vec<String>,
}

impl EngineMetadata {
    /// Metadata for a text-in/text-out engine.
    pub fn text(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            author: "dpe-runtime".to_string(),
            input_types: vec![EngineData::TEXT.to_string()],
            output_types: vec![EngineData::TEXT.to_string()],
        }
    }
}

/// User-supplied compute wrapped by a service.
///
/// Instances live in the service's object pool and are never used by two
/// executions at once, so methods take `&mut self` and engines may keep
/// per-instance state. `execute` and `configure` are never called
/// concurrently on the same instance.
#[async_trait]
pub trait Engine: Send {
    async fn execute(&mut self, input: EngineData) -> Result<EngineData, EngineFailure>;

    /// Execute once for a completed AND group.
    ///
    /// `inputs` are ordered by sender name. The default joins the payloads
    /// with newlines and runs [`Engine::execute`] on the result.
    async fn execute_group(&mut self, inputs: Vec<EngineData>) -> Result<EngineData, EngineFailure> {
        let mut joined = EngineData {
            mime_type: inputs
                .first()
                .map(|d| d.mime_type.clone())
                .unwrap_or_else(|| EngineData::TEXT.to_string()),
            communication_id: inputs.first().map(|d| d.communication_id).unwrap_or_default(),
            ..Default::default()
        };
        for (i, input) in inputs.into_iter().enumerate() {
            if i > 0 {
                joined.payload.push(b'\n');
            }
            joined.payload.extend(input.payload);
        }
        self.execute(joined).await
    }

    async fn configure(&mut self, _input: EngineData) -> Result<(), EngineFailure> {
        Ok(())
    }

    fn metadata(&self) -> EngineMetadata;
}
