// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::composition::entry_services;
use crate::engines::EngineData;
use crate::errors::OrchestratorError;
use crate::name::CanonicalName;
use crate::protocol::{
    Action, ConfigureMode, ControlRequest, DataLocation, Message, ReportKind, Topic,
};
use crate::service::ServiceSpec;
use crate::transport::{Subscription, Transport};

/// Talks to DPEs and services over a [`Transport`].
///
/// Control commands and synchronous calls wait at most `timeout` for an
/// answer. Asynchronous `execute` calls return once the request is
/// published; downstream failures only show up as error reports.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use dpe_runtime::engines::EngineData;
/// use dpe_runtime::orchestrator::Orchestrator;
/// use dpe_runtime::transport::InMemoryTransport;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = Arc::new(InMemoryTransport::new());
/// let orchestrator = Orchestrator::new("10.1.1.9_java:orchestrator:Client".parse()?, transport);
///
/// let composition = "10.1.1.1_java:text:Upper+10.1.1.1_java:text:Reverse";
/// let upper = "10.1.1.1_java:text:Upper".parse()?;
/// let reply = orchestrator
///     .sync_execute(&upper, composition, EngineData::text("hello"))
///     .await?;
/// println!("{}", String::from_utf8_lossy(&reply.payload));
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    name: CanonicalName,
    transport: Arc<dyn Transport>,
    timeout: Duration,
    next_id: AtomicI64,
}

impl Orchestrator {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(name: CanonicalName, transport: Arc<dyn Transport>) -> Self {
        Self {
            name,
            transport,
            timeout: Self::DEFAULT_TIMEOUT,
            next_id: AtomicI64::new(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &CanonicalName {
        &self.name
    }

    /// Send a control command to the DPE hosting `target` and wait for its
    /// acknowledgement.
    pub async fn control(
        &self,
        target: &CanonicalName,
        request: &ControlRequest,
    ) -> Result<Message, OrchestratorError> {
        let message = Message::control(&target.dpe_name(), &self.name, &request.to_string());
        let reply = self.transport.request(message, self.timeout).await?;
        check(reply)
    }

    pub async fn deploy_container(
        &self,
        container: &CanonicalName,
        description: &str,
    ) -> Result<(), OrchestratorError> {
        let request = ControlRequest::StartContainer {
            container: container.clone(),
            description: description.to_string(),
        };
        self.control(container, &request).await.map(|_| ())
    }

    pub async fn remove_container(&self, container: &CanonicalName) -> Result<(), OrchestratorError> {
        let request = ControlRequest::StopContainer {
            container: container.clone(),
        };
        self.control(container, &request).await.map(|_| ())
    }

    pub async fn deploy_service(&self, spec: &ServiceSpec) -> Result<(), OrchestratorError> {
        let request = ControlRequest::DeployService {
            service: spec.name.clone(),
            engine_type: spec.engine_type.clone(),
            pool_size: spec.pool_size,
            description: spec.description.clone(),
        };
        self.control(&spec.name, &request).await.map(|_| ())
    }

    pub async fn remove_service(&self, service: &CanonicalName) -> Result<(), OrchestratorError> {
        let request = ControlRequest::RemoveService {
            service: service.clone(),
        };
        self.control(service, &request).await.map(|_| ())
    }

    /// Publish `done` reports every `every` executions of `service` (0 = off).
    pub async fn report_done(&self, service: &CanonicalName, every: u32) -> Result<(), OrchestratorError> {
        let request = ControlRequest::ReportDone {
            service: service.clone(),
            every,
        };
        self.control(service, &request).await.map(|_| ())
    }

    /// Publish `data` reports every `every` executions of `service` (0 = off).
    pub async fn report_data(&self, service: &CanonicalName, every: u32) -> Result<(), OrchestratorError> {
        let request = ControlRequest::ReportData {
            service: service.clone(),
            every,
        };
        self.control(service, &request).await.map(|_| ())
    }

    /// JSON snapshot of a DPE.
    pub async fn ping(&self, dpe: &CanonicalName) -> Result<serde_json::Value, OrchestratorError> {
        let reply = self.control(dpe, &ControlRequest::PingDpe).await?;
        serde_json::from_slice(&reply.data).map_err(|e| OrchestratorError::Remote {
            source_name: reply.meta.author.clone(),
            message: format!("malformed snapshot: {}", e),
        })
    }

    /// Send `data` to `service` as a new request and return its
    /// communication id.
    pub async fn execute(
        &self,
        service: &CanonicalName,
        composition: &str,
        data: EngineData,
    ) -> Result<i64, OrchestratorError> {
        let data = data.with_communication_id(self.next_communication_id());
        self.execute_with_id(service, composition, &data).await?;
        Ok(data.communication_id)
    }

    /// Send `data` keeping its communication id, e.g. to feed one AND group
    /// from several entry services.
    pub async fn execute_with_id(
        &self,
        service: &CanonicalName,
        composition: &str,
        data: &EngineData,
    ) -> Result<(), OrchestratorError> {
        let message = Message::data(Topic::of(service), &self.name, composition, data, DataLocation::Network);
        self.transport.publish(message).await?;
        Ok(())
    }

    /// Send `data` to every entry service of `composition` under one
    /// communication id.
    pub async fn execute_composition(
        &self,
        composition: &str,
        data: EngineData,
    ) -> Result<i64, OrchestratorError> {
        let entries = entry_services(composition)?;
        let data = data.with_communication_id(self.next_communication_id());
        for service in &entries {
            self.execute_with_id(service, composition, &data).await?;
        }
        Ok(data.communication_id)
    }

    /// Run `service` on `data` and wait for its output instead of routing it
    /// onward.
    pub async fn sync_execute(
        &self,
        service: &CanonicalName,
        composition: &str,
        data: EngineData,
    ) -> Result<EngineData, OrchestratorError> {
        let data = data.with_communication_id(self.next_communication_id());
        let message = Message::data(Topic::of(service), &self.name, composition, &data, DataLocation::Network);
        let reply = self.transport.request(message, self.timeout).await?;
        Ok(check(reply)?.engine_data())
    }

    /// Reconfigure every engine instance of `service`.
    ///
    /// `mode` decides what happens while requests are in flight; with
    /// [`ConfigureMode::WithTimeout`] the service waits at most
    /// `pool_timeout` for its pool to become idle.
    pub async fn configure(
        &self,
        service: &CanonicalName,
        data: EngineData,
        mode: ConfigureMode,
        pool_timeout: Duration,
    ) -> Result<(), OrchestratorError> {
        let data = data.with_communication_id(self.next_communication_id());
        let mut message = Message::data(Topic::of(service), &self.name, "", &data, DataLocation::Network);
        message.meta.set_action(Action::Configure);
        message.meta.set_configure_mode(mode);
        message.meta.configure_timeout_ms = u64::try_from(pool_timeout.as_millis()).unwrap_or(u64::MAX);
        let reply = self.transport.request(message, self.timeout).await?;
        check(reply).map(|_| ())
    }

    /// Every report of one category (`done`, `data`, `warning`, `error` or
    /// `info`).
    pub async fn subscribe_reports(&self, kind: ReportKind) -> Result<Subscription, OrchestratorError> {
        Ok(self.transport.subscribe(kind.category()).await?)
    }

    /// Reports of one category about a single service or DPE.
    pub async fn subscribe_reports_of(
        &self,
        kind: ReportKind,
        name: &CanonicalName,
    ) -> Result<Subscription, OrchestratorError> {
        Ok(self.transport.subscribe(kind.topic(name)).await?)
    }

    fn next_communication_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

fn check(reply: Message) -> Result<Message, OrchestratorError> {
    match reply.failure() {
        Some(failure) => Err(OrchestratorError::Remote {
            source_name: reply.meta.author.clone(),
            message: failure.message,
        }),
        None => Ok(reply),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeSettings;
    use crate::dpe::{Dpe, DpeHandle};
    use crate::engines::EngineRegistry;
    use crate::transport::InMemoryTransport;

    fn name(s: &str) -> CanonicalName {
        s.parse().unwrap()
    }

    async fn setup() -> (Orchestrator, DpeHandle) {
        let transport = Arc::new(InMemoryTransport::new());
        let dpe = Dpe::new(
            name("10.1.1.1_java"),
            transport.clone(),
            transport.clone(),
            Arc::new(EngineRegistry::with_builtins()),
            RuntimeSettings {
                pool_size: 2,
                barrier_ttl: None,
                queue_capacity: 8,
            },
        )
        .unwrap();
        let handle = dpe.run().await.unwrap();
        let orchestrator = Orchestrator::new(name("10.1.1.9_java:orchestrator:Test"), transport)
            .with_timeout(Duration::from_secs(2));
        (orchestrator, handle)
    }

    #[tokio::test]
    async fn test_deploy_and_sync_execute() {
        let (orchestrator, handle) = setup().await;
        orchestrator.deploy_container(&name("10.1.1.1_java:text"), "").await.unwrap();
        let spec = ServiceSpec::new(name("10.1.1.1_java:text:Reverse"), "reverse_text", 1);
        orchestrator.deploy_service(&spec).await.unwrap();

        let output = orchestrator
            .sync_execute(&spec.name, "10.1.1.1_java:text:Reverse", EngineData::text("abc"))
            .await
            .unwrap();
        assert_eq!(output.payload, b"cba");

        let snapshot = orchestrator.ping(&name("10.1.1.1_java")).await.unwrap();
        assert_eq!(snapshot["containers"][0]["services"][0]["executions"], 1);

        orchestrator.remove_container(&name("10.1.1.1_java:text")).await.unwrap();
        assert!(handle.dpe().containers().await.is_empty());
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_remote_errors() {
        let (orchestrator, handle) = setup().await;

        let err = orchestrator
            .deploy_service(&ServiceSpec::new(name("10.1.1.1_java:none:S1"), "reverse_text", 1))
            .await
            .unwrap_err();
        match err {
            OrchestratorError::Remote { source_name, message } => {
                assert_eq!(source_name, "10.1.1.1_java");
                assert!(message.contains("not deployed"));
            }
            other => panic!("unexpected {other:?}"),
        }

        orchestrator.deploy_container(&name("10.1.1.1_java:text"), "").await.unwrap();
        let spec = ServiceSpec::new(name("10.1.1.1_java:text:Count"), "token_counter", 1);
        orchestrator.deploy_service(&spec).await.unwrap();
        let err = orchestrator
            .sync_execute(&spec.name, "10.1.1.1_java:text:Count", EngineData::bytes(vec![0xff, 0xfe]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::Remote { .. }));

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_configure_and_reports() {
        let (orchestrator, handle) = setup().await;
        orchestrator.deploy_container(&name("10.1.1.1_java:text"), "").await.unwrap();
        let spec = ServiceSpec::new(name("10.1.1.1_java:text:Classify"), "text_length_classifier", 2);
        orchestrator.deploy_service(&spec).await.unwrap();
        orchestrator.report_done(&spec.name, 1).await.unwrap();
        orchestrator.report_data(&spec.name, 1).await.unwrap();
        let mut done = orchestrator.subscribe_reports(ReportKind::Done).await.unwrap();
        let mut data = orchestrator.subscribe_reports_of(ReportKind::Data, &spec.name).await.unwrap();

        orchestrator
            .configure(&spec.name, EngineData::text("2"), ConfigureMode::Immediate, Duration::ZERO)
            .await
            .unwrap();

        let composition = "10.1.1.1_java:text:Classify";
        let id = orchestrator
            .execute_composition(composition, EngineData::text("three words here"))
            .await
            .unwrap();
        let report = done.recv().await.unwrap();
        assert_eq!(report.meta.communication_id, id);
        let report = data.recv().await.unwrap();
        assert_eq!(report.meta.sender_state.as_deref(), Some("LONG"));

        handle.stop().await;
    }
}
