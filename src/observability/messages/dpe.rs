// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for DPE and container lifecycle events.

use crate::observability::messages::{SpannedLog, StructuredLog};
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A DPE started listening on its control topic.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use dpe_runtime::observability::messages::dpe::DpeStarted;
///
/// let msg = DpeStarted {
///     dpe: "10.1.1.1_java",
///     front_end: "10.1.1.1_java",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct DpeStarted<'a> {
    pub dpe: &'a str,
    pub front_end: &'a str,
}

impl Display for DpeStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.dpe == self.front_end {
            write!(f, "DPE '{}' started as front-end", self.dpe)
        } else {
            write!(f, "DPE '{}' started (front-end '{}')", self.dpe, self.front_end)
        }
    }
}

impl StructuredLog for DpeStarted<'_> {
    fn log(&self) {
        tracing::info!(dpe = self.dpe, front_end = self.front_end, "{}", self);
    }
}

/// A DPE stopped and released all of its containers.
///
/// # Log Level
/// `info!`
pub struct DpeStopped<'a> {
    pub dpe: &'a str,
    pub containers: usize,
}

impl Display for DpeStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "DPE '{}' stopped ({} containers removed)", self.dpe, self.containers)
    }
}

impl StructuredLog for DpeStopped<'_> {
    fn log(&self) {
        tracing::info!(dpe = self.dpe, containers = self.containers, "{}", self);
    }
}

/// A front-end learned about a worker DPE.
///
/// # Log Level
/// `info!`
pub struct DpeRegistered<'a> {
    pub front_end: &'a str,
    pub dpe: &'a str,
}

impl Display for DpeRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Front-end '{}' registered DPE '{}'", self.front_end, self.dpe)
    }
}

impl StructuredLog for DpeRegistered<'_> {
    fn log(&self) {
        tracing::info!(front_end = self.front_end, dpe = self.dpe, "{}", self);
    }
}

/// # Log Level
/// `info!`
pub struct ContainerStarted<'a> {
    pub container: &'a str,
}

impl Display for ContainerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Started container '{}'", self.container)
    }
}

impl StructuredLog for ContainerStarted<'_> {
    fn log(&self) {
        tracing::info!(container = self.container, "{}", self);
    }
}

/// # Log Level
/// `info!`
pub struct ContainerStopped<'a> {
    pub container: &'a str,
    pub services: usize,
}

impl Display for ContainerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stopped container '{}' ({} services removed)",
            self.container, self.services
        )
    }
}

impl StructuredLog for ContainerStopped<'_> {
    fn log(&self) {
        tracing::info!(container = self.container, services = self.services, "{}", self);
    }
}

/// A control command was malformed or could not be applied.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use dpe_runtime::observability::messages::dpe::ControlCommandFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "unknown verb");
/// let msg = ControlCommandFailed {
///     dpe: "10.1.1.1_java",
///     command: "launchRockets",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ControlCommandFailed<'a> {
    pub dpe: &'a str,
    pub command: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ControlCommandFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "DPE '{}' could not apply '{}': {}",
            self.dpe, self.command, self.error
        )
    }
}

impl StructuredLog for ControlCommandFailed<'_> {
    fn log(&self) {
        tracing::error!(
            dpe = self.dpe,
            command = self.command,
            error = %self.error,
            "{}", self
        );
    }
}

/// A DPE received a control command.
///
/// # Log Level
/// `debug!`
pub struct ControlCommandReceived<'a> {
    pub dpe: &'a str,
    pub command: &'a str,
    pub author: &'a str,
}

impl Display for ControlCommandReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "DPE '{}' received '{}' from '{}'", self.dpe, self.command, self.author)
    }
}

impl StructuredLog for ControlCommandReceived<'_> {
    fn log(&self) {
        tracing::debug!(dpe = self.dpe, command = self.command, author = self.author, "{}", self);
    }
}

impl SpannedLog for ControlCommandReceived<'_> {
    fn span(&self, name: &str) -> Span {
        tracing::info_span!("control", span_name = name, dpe = self.dpe, command = self.command)
    }
}
