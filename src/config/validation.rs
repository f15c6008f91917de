//! Checks a [`Config`] before anything is deployed.
//!
//! Every problem is collected rather than stopping at the first, so a
//! broken config file is fixed in one pass. The checks, in order:
//!
//! 1. the DPE, front-end, container and service names form valid canonical names
//! 2. container and service names are unique
//! 3. pool sizes are greater than zero
//! 4. every engine type exists in the engine registry
//! 5. the request composition, if any, compiles

use std::collections::HashSet;

use super::Config;
use crate::composition::{compile, entry_services};
use crate::engines::EngineRegistry;
use crate::errors::{CompositionError, ConfigError};
use crate::name::CanonicalName;

pub fn validate_config(cfg: &Config, registry: &EngineRegistry) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Err(e) = cfg.front_end() {
        errors.push(ConfigError::InvalidName(e));
    }
    if cfg.dpe.pool_size == Some(0) {
        errors.push(ConfigError::InvalidPoolSize {
            owner: "dpe".to_string(),
        });
    }

    match cfg.dpe_name() {
        Ok(dpe) => validate_containers(cfg, &dpe, registry, &mut errors),
        Err(e) => errors.push(ConfigError::InvalidName(e)),
    }

    if let Some(request) = &cfg.request {
        if let Err(e) = check_composition(&request.composition) {
            errors.push(ConfigError::InvalidComposition(e));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Compile the whole composition for its first entry service, which
/// parses every clause.
fn check_composition(raw: &str) -> Result<(), CompositionError> {
    let entries = entry_services(raw)?;
    if let Some(entry) = entries.first() {
        compile(raw, entry)?;
    }
    Ok(())
}

fn validate_containers(
    cfg: &Config,
    dpe: &CanonicalName,
    registry: &EngineRegistry,
    errors: &mut Vec<ConfigError>,
) {
    let mut containers = HashSet::new();
    let mut services = HashSet::new();

    for container_cfg in &cfg.containers {
        let container = match CanonicalName::container(dpe, &container_cfg.name) {
            Ok(name) => name,
            Err(e) => {
                errors.push(ConfigError::InvalidName(e));
                continue;
            }
        };
        if !containers.insert(container.clone()) {
            errors.push(ConfigError::DuplicateContainer {
                container: container.to_string(),
            });
        }

        for service_cfg in &container_cfg.services {
            let service = match CanonicalName::service(&container, &service_cfg.engine) {
                Ok(name) => name,
                Err(e) => {
                    errors.push(ConfigError::InvalidName(e));
                    continue;
                }
            };
            if !services.insert(service.clone()) {
                errors.push(ConfigError::DuplicateService {
                    service: service.to_string(),
                });
            }
            if service_cfg.pool_size == Some(0) {
                errors.push(ConfigError::InvalidPoolSize {
                    owner: service.to_string(),
                });
            }
            if !registry.contains(&service_cfg.engine_type) {
                errors.push(ConfigError::UnknownEngineType {
                    service: service.to_string(),
                    engine_type: service_cfg.engine_type.clone(),
                    available: registry.list_available(),
                });
            }
        }
    }
}
