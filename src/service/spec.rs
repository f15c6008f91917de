// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{DeployError, NameError};
use crate::name::{CanonicalName, NameKind};

/// What to deploy: the service name, the registered engine type backing it
/// and how many engine instances (and workers) it runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: CanonicalName,
    pub engine_type: String,
    pub pool_size: usize,
    pub description: String,
}

impl ServiceSpec {
    pub fn new(name: CanonicalName, engine_type: impl Into<String>, pool_size: usize) -> Self {
        Self {
            name,
            engine_type: engine_type.into(),
            pool_size,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<(), DeployError> {
        if self.name.kind() != NameKind::Service {
            return Err(NameError::WrongKind {
                name: self.name.to_string(),
                expected: "service",
            }
            .into());
        }
        if self.pool_size == 0 {
            return Err(DeployError::InvalidPoolSize(self.name.to_string()));
        }
        Ok(())
    }
}
