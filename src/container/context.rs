// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::RuntimeSettings;
use crate::dispatch::Dispatcher;
use crate::engines::EngineRegistry;
use crate::transport::{Registrar, Transport};

/// Collaborators every container of a DPE deploys services against.
pub struct RuntimeContext {
    pub transport: Arc<dyn Transport>,
    pub registrar: Arc<dyn Registrar>,
    pub dispatcher: Arc<Dispatcher>,
    pub engines: Arc<EngineRegistry>,
    pub settings: RuntimeSettings,
}
