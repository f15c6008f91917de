// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

use super::{CompositionError, NameError};

/// Errors that can occur while loading or validating a DPE configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A host, container or engine name does not form a valid canonical name.
    #[error("invalid name in config: {0}")]
    InvalidName(#[from] NameError),

    #[error("duplicate container '{container}'")]
    DuplicateContainer { container: String },

    #[error("duplicate service '{service}'")]
    DuplicateService { service: String },

    #[error("'{owner}': pool_size must be greater than zero")]
    InvalidPoolSize { owner: String },

    #[error("service '{service}' uses unknown engine type '{engine_type}' (available: {})", .available.join(", "))]
    UnknownEngineType {
        service: String,
        engine_type: String,
        available: Vec<String>,
    },

    #[error("invalid request composition: {0}")]
    InvalidComposition(#[from] CompositionError),

    /// Every problem found by validation, in config order.
    #[error("configuration validation failed:\n{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<ConfigError>),
}
