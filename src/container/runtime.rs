// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::RuntimeContext;
use crate::errors::{DeployError, NameError};
use crate::name::{CanonicalName, NameKind};
use crate::observability::messages::dpe::{ContainerStarted, ContainerStopped};
use crate::observability::messages::service::{ServiceDeployed, ServiceRemoved};
use crate::observability::messages::StructuredLog;
use crate::service::{Service, ServiceHandle, ServiceSnapshot, ServiceSpec};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerSnapshot {
    pub name: String,
    pub description: String,
    pub services: Vec<ServiceSnapshot>,
}

pub struct Container {
    name: CanonicalName,
    description: String,
    context: Arc<RuntimeContext>,
    services: Mutex<BTreeMap<CanonicalName, ServiceHandle>>,
}

impl Container {
    /// Create and register the container `name`.
    pub async fn start(
        name: CanonicalName,
        description: impl Into<String>,
        context: Arc<RuntimeContext>,
    ) -> Result<Self, DeployError> {
        if name.kind() != NameKind::Container {
            return Err(NameError::WrongKind {
                name: name.to_string(),
                expected: "container",
            }
            .into());
        }
        let description = description.into();
        context.registrar.register(&name, &description).await?;
        ContainerStarted {
            container: &name.to_string(),
        }
        .log();
        Ok(Self {
            name,
            description,
            context,
            services: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn name(&self) -> &CanonicalName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Deploy a service into this container.
    ///
    /// Deploying a name that is already running returns the running service
    /// unchanged.
    pub async fn deploy(&self, spec: ServiceSpec) -> Result<Arc<Service>, DeployError> {
        spec.validate()?;
        self.ensure_contains(&spec.name)?;

        let mut services = self.services.lock().await;
        if let Some(handle) = services.get(&spec.name) {
            return Ok(Arc::clone(handle.service()));
        }

        let engines = self.context.engines.instantiate(&spec.engine_type, spec.pool_size)?;
        let service = Arc::new(Service::new(
            spec,
            engines,
            Arc::clone(&self.context.dispatcher),
            self.context.settings.barrier_ttl,
        ));
        let handle = ServiceHandle::start(
            Arc::clone(&service),
            Arc::clone(&self.context.transport),
            self.context.settings.queue_capacity,
        )
        .await?;
        if let Err(e) = self
            .context
            .registrar
            .register(service.name(), &service.spec().description)
            .await
        {
            handle.stop().await;
            return Err(e.into());
        }

        ServiceDeployed {
            service: &service.name().to_string(),
            engine_type: &service.spec().engine_type,
            pool_size: service.engines().capacity(),
        }
        .log();
        self.context.dispatcher.shared_memory().open_receiver(service.name());
        services.insert(service.name().clone(), handle);
        Ok(service)
    }

    /// Stop and remove a service. Returns `false` when it was not deployed.
    pub async fn undeploy(&self, name: &CanonicalName) -> Result<bool, DeployError> {
        self.ensure_contains(name)?;
        let handle = self.services.lock().await.remove(name);
        match handle {
            Some(handle) => {
                self.stop_service(handle).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn service(&self, name: &CanonicalName) -> Option<Arc<Service>> {
        self.services
            .lock()
            .await
            .get(name)
            .map(|handle| Arc::clone(handle.service()))
    }

    pub async fn services(&self) -> Vec<CanonicalName> {
        self.services.lock().await.keys().cloned().collect()
    }

    /// Undeploy every service and unregister the container.
    pub async fn stop(&self) -> Result<usize, DeployError> {
        let handles = std::mem::take(&mut *self.services.lock().await);
        let count = handles.len();
        for handle in handles.into_values() {
            self.stop_service(handle).await?;
        }
        self.context.registrar.unregister(&self.name).await?;
        ContainerStopped {
            container: &self.name.to_string(),
            services: count,
        }
        .log();
        Ok(count)
    }

    pub async fn snapshot(&self) -> ContainerSnapshot {
        let services = self
            .services
            .lock()
            .await
            .values()
            .map(|handle| handle.service().snapshot())
            .collect();
        ContainerSnapshot {
            name: self.name.to_string(),
            description: self.description.clone(),
            services,
        }
    }

    fn ensure_contains(&self, name: &CanonicalName) -> Result<(), DeployError> {
        if self.name.is_container_of(name) {
            Ok(())
        } else {
            Err(DeployError::NotContained {
                name: name.to_string(),
                parent: self.name.to_string(),
            })
        }
    }

    async fn stop_service(&self, handle: ServiceHandle) -> Result<(), DeployError> {
        let name = handle.service().name().clone();
        handle.stop().await;
        let purged = self.context.dispatcher.shared_memory().close_receiver(&name);
        self.context.registrar.unregister(&name).await?;
        ServiceRemoved {
            service: &name.to_string(),
            pending_entries: purged,
        }
        .log();
        Ok(())
    }
}
