// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::config::consts::{DEFAULT_QUEUE_CAPACITY, DEFAULT_REQUEST_TIMEOUT_MS};
use crate::config::settings::RuntimeSettings;
use crate::engines::EngineRegistry;
use crate::errors::{ConfigError, NameError};
use crate::name::{CanonicalName, Lang};
use crate::service::ServiceSpec;

/// Configuration of one DPE process.
///
/// Describes the DPE address, the containers and services it deploys on
/// start, and optionally one request to run once everything is up. Loaded
/// from YAML or TOML.
///
/// # Example
/// ```yaml
/// dpe:
///   host: 10.1.1.1
///   lang: java
///   pool_size: 4
///   barrier_ttl_secs: 60
/// containers:
///   - name: text
///     services:
///       - engine: Upper
///         engine_type: change_text_case_upper
///         pool_size: 2
///       - engine: Reverse
///         engine_type: reverse_text
/// request:
///   composition: "10.1.1.1_java:text:Upper+10.1.1.1_java:text:Reverse"
///   input: "hello"
///   timeout_ms: 2000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub dpe: DpeConfig,
    #[serde(default)]
    pub containers: Vec<ContainerConfig>,
    pub request: Option<RequestConfig>,
}

/// Address and runtime defaults of the DPE.
///
/// # Fields
/// * `host`, `port`, `lang` - the DPE canonical name; `port` defaults per language
/// * `front_end` - canonical name of the front-end DPE; absent means this DPE is its own
/// * `pool_size` - default engine pool size for services that do not set one
/// * `barrier_ttl_secs` - drop incomplete AND groups older than this; absent means never
/// * `queue_capacity` - bounded work queue depth of each service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DpeConfig {
    pub host: String,
    pub port: Option<u16>,
    pub lang: Lang,
    pub front_end: Option<String>,
    pub pool_size: Option<usize>,
    pub barrier_ttl_secs: Option<u64>,
    pub queue_capacity: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContainerConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceConfig {
    /// Engine part of the service canonical name.
    pub engine: String,
    /// Key of the engine factory in the engine registry.
    pub engine_type: String,
    pub pool_size: Option<usize>,
    #[serde(default)]
    pub description: String,
}

/// A request the CLI runs after deploying.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestConfig {
    pub composition: String,
    pub input: String,
    pub timeout_ms: Option<u64>,
}

impl RequestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
    }
}

impl Config {
    pub fn dpe_name(&self) -> Result<CanonicalName, NameError> {
        CanonicalName::dpe(&self.dpe.host, self.dpe.port, self.dpe.lang)
    }

    pub fn front_end(&self) -> Result<Option<CanonicalName>, NameError> {
        self.dpe
            .front_end
            .as_deref()
            .map(CanonicalName::parse_dpe)
            .transpose()
    }

    pub fn settings(&self) -> RuntimeSettings {
        let defaults = RuntimeSettings::default();
        RuntimeSettings {
            pool_size: self.dpe.pool_size.unwrap_or(defaults.pool_size),
            barrier_ttl: self.dpe.barrier_ttl_secs.map(Duration::from_secs),
            queue_capacity: self.dpe.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY),
        }
    }

    /// Container names paired with their config, in config order.
    pub fn containers(&self) -> Result<Vec<(CanonicalName, &ContainerConfig)>, NameError> {
        let dpe = self.dpe_name()?;
        self.containers
            .iter()
            .map(|c| Ok((CanonicalName::container(&dpe, &c.name)?, c)))
            .collect()
    }

    /// Deployable specs of every configured service, in config order.
    pub fn service_specs(&self) -> Result<Vec<ServiceSpec>, NameError> {
        let default_pool_size = self.settings().pool_size;
        let mut specs = Vec::new();
        for (container, config) in self.containers()? {
            for service in &config.services {
                let name = CanonicalName::service(&container, &service.engine)?;
                specs.push(
                    ServiceSpec::new(
                        name,
                        service.engine_type.clone(),
                        service.pool_size.unwrap_or(default_pool_size),
                    )
                    .with_description(service.description.clone()),
                );
            }
        }
        Ok(specs)
    }
}

/// Load a config from a YAML or TOML file, chosen by extension
/// (`.toml` is TOML, anything else is YAML).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(cfg)
}

/// Load a config and check it against the engine types of `registry`.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
    registry: &EngineRegistry,
) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg, registry).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
dpe:
  host: 10.1.1.1
  lang: java
  pool_size: 3
containers:
  - name: text
    services:
      - engine: Upper
        engine_type: change_text_case_upper
        pool_size: 2
      - engine: Reverse
        engine_type: reverse_text
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.dpe_name().unwrap().to_string(), "10.1.1.1_java");
        assert!(cfg.front_end().unwrap().is_none());
        assert!(cfg.request.is_none());

        let specs = cfg.service_specs().unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name.to_string(), "10.1.1.1_java:text:Upper");
        assert_eq!(specs[0].pool_size, 2);
        assert_eq!(specs[1].pool_size, 3);
    }

    #[test]
    fn parse_settings() {
        let yaml = r#"
dpe:
  host: 10.1.1.2
  port: 9000
  lang: python
  front_end: 10.1.1.1_java
  barrier_ttl_secs: 30
  queue_capacity: 8
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.dpe_name().unwrap().to_string(), "10.1.1.2%9000_python");
        assert_eq!(cfg.front_end().unwrap().unwrap().to_string(), "10.1.1.1_java");

        let settings = cfg.settings();
        assert_eq!(settings.barrier_ttl, Some(Duration::from_secs(30)));
        assert_eq!(settings.queue_capacity, 8);
        assert!(settings.pool_size > 0);
    }

    #[test]
    fn invalid_names_are_reported() {
        let yaml = r#"
dpe:
  host: "bad host"
  lang: java
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.dpe_name().is_err());
    }
}
