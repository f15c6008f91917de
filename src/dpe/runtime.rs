// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::DpeHandle;
use crate::config::RuntimeSettings;
use crate::container::{Container, ContainerSnapshot, RuntimeContext};
use crate::dispatch::{Dispatcher, SharedMemory};
use crate::engines::{EngineData, EngineRegistry};
use crate::errors::{ControlError, DeployError, EngineFailure, NameError, TransportError};
use crate::name::{CanonicalName, NameKind};
use crate::observability::messages::dpe::{
    ControlCommandFailed, ControlCommandReceived, DpeRegistered, DpeStopped,
};
use crate::observability::messages::{SpannedLog, StructuredLog};
use crate::protocol::{ControlRequest, DataLocation, Message, ReportKind, Severity};
use crate::service::{Service, ServiceSpec};
use crate::transport::{Registrar, Transport};

/// Serializable view of a DPE, published in answer to `PING_DPE`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DpeSnapshot {
    pub name: String,
    pub front_end: String,
    pub known_dpes: Vec<String>,
    pub shared_memory_entries: usize,
    pub containers: Vec<ContainerSnapshot>,
}

pub struct Dpe {
    name: CanonicalName,
    context: Arc<RuntimeContext>,
    front_end: RwLock<CanonicalName>,
    known_dpes: RwLock<BTreeSet<CanonicalName>>,
    containers: Mutex<BTreeMap<CanonicalName, Container>>,
    shutdown: CancellationToken,
}

impl Dpe {
    /// A DPE with an empty shared-memory table that is its own front-end.
    pub fn new(
        name: CanonicalName,
        transport: Arc<dyn Transport>,
        registrar: Arc<dyn Registrar>,
        engines: Arc<EngineRegistry>,
        settings: RuntimeSettings,
    ) -> Result<Arc<Self>, NameError> {
        if name.kind() != NameKind::Dpe {
            return Err(NameError::WrongKind {
                name: name.to_string(),
                expected: "DPE",
            });
        }
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&transport),
            Arc::new(SharedMemory::new()),
        ));
        Ok(Arc::new(Self {
            front_end: RwLock::new(name.clone()),
            name,
            context: Arc::new(RuntimeContext {
                transport,
                registrar,
                dispatcher,
                engines,
                settings,
            }),
            known_dpes: RwLock::new(BTreeSet::new()),
            containers: Mutex::new(BTreeMap::new()),
            shutdown: CancellationToken::new(),
        }))
    }

    pub fn name(&self) -> &CanonicalName {
        &self.name
    }

    pub fn front_end(&self) -> CanonicalName {
        self.front_end.read().clone()
    }

    pub fn is_front_end(&self) -> bool {
        *self.front_end.read() == self.name
    }

    /// DPEs that announced themselves to this one.
    pub fn known_dpes(&self) -> Vec<CanonicalName> {
        self.known_dpes.read().iter().cloned().collect()
    }

    pub fn context(&self) -> &Arc<RuntimeContext> {
        &self.context
    }

    pub fn shared_memory(&self) -> &Arc<SharedMemory> {
        self.context.dispatcher.shared_memory()
    }

    /// Start serving control commands.
    pub async fn run(self: &Arc<Self>) -> Result<DpeHandle, TransportError> {
        DpeHandle::start(Arc::clone(self)).await
    }

    pub(crate) fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Start a container on this DPE; an already running one is kept.
    pub async fn deploy(&self, name: CanonicalName, description: &str) -> Result<(), DeployError> {
        self.ensure_contains(&name)?;
        let mut containers = self.containers.lock().await;
        if containers.contains_key(&name) {
            return Ok(());
        }
        let container = Container::start(name.clone(), description, Arc::clone(&self.context)).await?;
        containers.insert(name, container);
        Ok(())
    }

    /// Stop a container and all of its services. Returns `false` when it
    /// was not running.
    pub async fn undeploy(&self, name: &CanonicalName) -> Result<bool, DeployError> {
        self.ensure_contains(name)?;
        let container = self.containers.lock().await.remove(name);
        match container {
            Some(container) => {
                container.stop().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn deploy_service(&self, spec: ServiceSpec) -> Result<Arc<Service>, DeployError> {
        self.ensure_contains(&spec.name)?;
        let container_name = spec
            .name
            .container_name()
            .ok_or_else(|| DeployError::UnknownContainer(spec.name.to_string()))?;
        let containers = self.containers.lock().await;
        let container = containers
            .get(&container_name)
            .ok_or_else(|| DeployError::UnknownContainer(container_name.to_string()))?;
        container.deploy(spec).await
    }

    /// Undeploy a service. Absent services and containers are a no-op.
    pub async fn remove_service(&self, name: &CanonicalName) -> Result<bool, DeployError> {
        self.ensure_contains(name)?;
        let Some(container_name) = name.container_name() else {
            return Ok(false);
        };
        let containers = self.containers.lock().await;
        match containers.get(&container_name) {
            Some(container) => container.undeploy(name).await,
            None => Ok(false),
        }
    }

    pub async fn service(&self, name: &CanonicalName) -> Option<Arc<Service>> {
        let container_name = name.container_name()?;
        let containers = self.containers.lock().await;
        containers.get(&container_name)?.service(name).await
    }

    pub async fn containers(&self) -> Vec<CanonicalName> {
        self.containers.lock().await.keys().cloned().collect()
    }

    pub async fn snapshot(&self) -> DpeSnapshot {
        let containers = self.containers.lock().await;
        let mut snapshots = Vec::with_capacity(containers.len());
        for container in containers.values() {
            snapshots.push(container.snapshot().await);
        }
        DpeSnapshot {
            name: self.name.to_string(),
            front_end: self.front_end().to_string(),
            known_dpes: self.known_dpes().iter().map(ToString::to_string).collect(),
            shared_memory_entries: self.shared_memory().len(),
            containers: snapshots,
        }
    }

    /// Apply one control command and return the acknowledgement payload.
    pub async fn apply(&self, request: ControlRequest) -> Result<EngineData, ControlError> {
        match request {
            ControlRequest::StartContainer { container, description } => {
                self.deploy(container, &description).await?;
            }
            ControlRequest::StopContainer { container } => {
                self.undeploy(&container).await?;
            }
            ControlRequest::DeployService {
                service,
                engine_type,
                pool_size,
                description,
            } => {
                let spec = ServiceSpec::new(service, engine_type, pool_size).with_description(description);
                self.deploy_service(spec).await?;
            }
            ControlRequest::RemoveService { service } => {
                self.remove_service(&service).await?;
            }
            ControlRequest::ReportDone { service, every } => {
                self.require_service(&service).await?.reports().set_done_every(every);
            }
            ControlRequest::ReportData { service, every } => {
                self.require_service(&service).await?.reports().set_data_every(every);
            }
            ControlRequest::SetFrontEnd { front_end } => {
                *self.front_end.write() = front_end.clone();
                self.announce(&front_end, ControlRequest::StartDpe {
                    dpe: self.name.clone(),
                })
                .await?;
            }
            ControlRequest::StartDpe { dpe } => {
                if dpe != self.name && self.known_dpes.write().insert(dpe.clone()) {
                    DpeRegistered {
                        front_end: &self.name.to_string(),
                        dpe: &dpe.to_string(),
                    }
                    .log();
                }
            }
            ControlRequest::StopDpe { dpe } => {
                if dpe == self.name {
                    self.shutdown.cancel();
                } else {
                    self.known_dpes.write().remove(&dpe);
                }
            }
            ControlRequest::PingDpe => {
                let snapshot = self.snapshot().await;
                let json = serde_json::to_vec(&snapshot)
                    .map_err(|e| TransportError::Codec(e.to_string()))?;
                let info = EngineData {
                    mime_type: EngineData::JSON.to_string(),
                    payload: json,
                    ..Default::default()
                };
                let report = Message::data(
                    ReportKind::Info.topic(&self.name),
                    &self.name,
                    "",
                    &info,
                    DataLocation::Network,
                );
                self.context.transport.publish(report).await?;
                return Ok(info);
            }
        }
        Ok(EngineData::text("ok"))
    }

    /// Parse and apply a control message, answering its `reply_to`.
    pub async fn handle_control(&self, message: &Message) {
        let command = String::from_utf8_lossy(&message.data).into_owned();
        let dpe = self.name.to_string();
        let received = ControlCommandReceived {
            dpe: &dpe,
            command: &command,
            author: &message.meta.author,
        };
        received.log();
        let span = received.span("handle_control");
        self.answer_control(message, &command).instrument(span).await
    }

    async fn answer_control(&self, message: &Message, command: &str) {
        let result = match message.text() {
            Ok(text) => match text.parse::<ControlRequest>() {
                Ok(request) => self.apply(request).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e.into()),
        };

        let reply = match &result {
            Ok(ack) => message.reply_with(&self.name, ack),
            Err(e) => {
                ControlCommandFailed {
                    dpe: &self.name.to_string(),
                    command,
                    error: e,
                }
                .log();
                message.reply_with_error(&self.name, &EngineFailure::new(Severity::Minor, e.to_string()))
            }
        };
        if let Some(reply) = reply {
            if let Err(e) = self.context.transport.publish(reply).await {
                ControlCommandFailed {
                    dpe: &self.name.to_string(),
                    command,
                    error: &e,
                }
                .log();
            }
        }
    }

    /// Stop every container, tell the front-end this DPE is leaving, and
    /// unregister.
    pub async fn shutdown(&self) -> Result<usize, DeployError> {
        let containers = std::mem::take(&mut *self.containers.lock().await);
        let count = containers.len();
        for container in containers.into_values() {
            container.stop().await?;
        }
        let front_end = self.front_end();
        if front_end != self.name {
            self.announce(&front_end, ControlRequest::StopDpe {
                dpe: self.name.clone(),
            })
            .await?;
        }
        self.context.registrar.unregister(&self.name).await?;
        DpeStopped {
            dpe: &self.name.to_string(),
            containers: count,
        }
        .log();
        Ok(count)
    }

    /// Send `request` to the control topic of `dpe`, unless it is this DPE.
    pub(crate) async fn announce(
        &self,
        dpe: &CanonicalName,
        request: ControlRequest,
    ) -> Result<(), TransportError> {
        if *dpe == self.name {
            return Ok(());
        }
        let message = Message::control(dpe, &self.name, &request.to_string());
        self.context.transport.publish(message).await
    }

    async fn require_service(&self, name: &CanonicalName) -> Result<Arc<Service>, DeployError> {
        self.service(name)
            .await
            .ok_or_else(|| DeployError::UnknownService(name.to_string()))
    }

    fn ensure_contains(&self, name: &CanonicalName) -> Result<(), DeployError> {
        if self.name.is_dpe_of(name) {
            Ok(())
        } else {
            Err(DeployError::NotContained {
                name: name.to_string(),
                parent: self.name.to_string(),
            })
        }
    }
}
