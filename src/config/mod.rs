// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod settings;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, Config, ContainerConfig, DpeConfig, RequestConfig,
    ServiceConfig,
};
pub use settings::RuntimeSettings;
pub use validation::validate_config;
