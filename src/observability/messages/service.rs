// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for service lifecycle and execution events.
//!
//! This module contains message types for logging events related to:
//! * Service deployment and removal
//! * Messages arriving at a service
//! * Engine execution failures
//! * Engine reconfiguration
//! * Messages a service could not process

use crate::observability::messages::{SpannedLog, StructuredLog};
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A service was deployed into a container.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use dpe_runtime::observability::messages::service::ServiceDeployed;
///
/// let msg = ServiceDeployed {
///     service: "10.1.1.1_java:analysis:upper",
///     engine_type: "change_text_case_upper",
///     pool_size: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ServiceDeployed<'a> {
    pub service: &'a str,
    pub engine_type: &'a str,
    pub pool_size: usize,
}

impl Display for ServiceDeployed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Deployed service '{}' ({} engine, pool_size={})",
            self.service, self.engine_type, self.pool_size
        )
    }
}

impl StructuredLog for ServiceDeployed<'_> {
    fn log(&self) {
        tracing::info!(
            service = self.service,
            engine_type = self.engine_type,
            pool_size = self.pool_size,
            "{}", self
        );
    }
}

/// A service was stopped and removed from its container.
///
/// # Log Level
/// `info!`
pub struct ServiceRemoved<'a> {
    pub service: &'a str,
    /// Shared-memory entries still waiting for the service, now dropped.
    pub pending_entries: usize,
}

impl Display for ServiceRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Removed service '{}'", self.service)?;
        if self.pending_entries > 0 {
            write!(f, " ({} pending entries dropped)", self.pending_entries)?;
        }
        Ok(())
    }
}

impl StructuredLog for ServiceRemoved<'_> {
    fn log(&self) {
        tracing::info!(
            service = self.service,
            pending_entries = self.pending_entries,
            "{}", self
        );
    }
}

/// The engine failed on a request; nothing is routed onward.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use dpe_runtime::observability::messages::service::EngineExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "bad input");
/// let msg = EngineExecutionFailed {
///     service: "10.1.1.1_java:analysis:upper",
///     communication_id: 12,
///     severity: 2,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct EngineExecutionFailed<'a> {
    pub service: &'a str,
    pub communication_id: i64,
    pub severity: u32,
    pub error: &'a dyn std::error::Error,
}

impl Display for EngineExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}' failed request {} (severity {}): {}",
            self.service, self.communication_id, self.severity, self.error
        )
    }
}

impl StructuredLog for EngineExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            service = self.service,
            communication_id = self.communication_id,
            severity = self.severity,
            error = %self.error,
            "{}", self
        );
    }
}

/// Every engine instance of a service was reconfigured.
///
/// # Log Level
/// `info!`
pub struct ServiceConfigured<'a> {
    pub service: &'a str,
    pub mode: &'a str,
    pub instances: usize,
}

impl Display for ServiceConfigured<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configured {} engine instances of '{}' ({})",
            self.instances, self.service, self.mode
        )
    }
}

impl StructuredLog for ServiceConfigured<'_> {
    fn log(&self) {
        tracing::info!(
            service = self.service,
            mode = self.mode,
            instances = self.instances,
            "{}", self
        );
    }
}

/// A message could not be processed and was dropped.
///
/// # Log Level
/// `warn!`
pub struct MessageDropped<'a> {
    pub service: &'a str,
    pub topic: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for MessageDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}' dropped message on '{}': {}",
            self.service, self.topic, self.error
        )
    }
}

impl StructuredLog for MessageDropped<'_> {
    fn log(&self) {
        tracing::warn!(
            service = self.service,
            topic = self.topic,
            error = %self.error,
            "{}", self
        );
    }
}

/// A message arrived on a service topic. Its processing runs inside the
/// span this opens.
///
/// # Log Level
/// `debug!`
pub struct MessageReceived<'a> {
    pub service: &'a str,
    pub sender: &'a str,
    pub communication_id: i64,
    pub action: &'a str,
}

impl Display for MessageReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}' received {} #{} from '{}'",
            self.service, self.action, self.communication_id, self.sender
        )
    }
}

impl StructuredLog for MessageReceived<'_> {
    fn log(&self) {
        tracing::debug!(
            service = self.service,
            sender = self.sender,
            communication_id = self.communication_id,
            action = self.action,
            "{}", self
        );
    }
}

impl SpannedLog for MessageReceived<'_> {
    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "service_message",
            span_name = name,
            service = self.service,
            sender = self.sender,
            communication_id = self.communication_id,
            action = self.action,
        )
    }
}
