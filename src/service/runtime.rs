// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use super::reports::ReportPolicy;
use super::spec::ServiceSpec;
use crate::composition::CompositionCache;
use crate::dispatch::Dispatcher;
use crate::engines::{Engine, EngineData, EngineMetadata};
use crate::errors::{EngineFailure, PoolError, ServiceError};
use crate::name::CanonicalName;
use crate::observability::messages::routing::{RouteSelected, SenderRejected};
use crate::observability::messages::service::{EngineExecutionFailed, MessageReceived, ServiceConfigured};
use crate::observability::messages::{SpannedLog, StructuredLog};
use crate::pool::{ObjectPool, PooledAll};
use crate::protocol::{Action, ConfigureMode, DataLocation, Message, ReportKind, Severity, Status};
use crate::routing::{Admission, RoutingEvaluator, ServiceStateTable};

/// Serializable view of a deployed service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSnapshot {
    pub name: String,
    pub engine_type: String,
    pub description: String,
    pub pool_size: usize,
    pub idle_engines: usize,
    pub executions: u64,
    pub report_done_every: u32,
    pub report_data_every: u32,
    pub engine: EngineMetadata,
}

pub struct Service {
    spec: ServiceSpec,
    metadata: EngineMetadata,
    engines: Arc<ObjectPool<Box<dyn Engine>>>,
    compositions: CompositionCache,
    router: RoutingEvaluator<EngineData>,
    dispatcher: Arc<Dispatcher>,
    reports: ReportPolicy,
}

impl Service {
    /// `engines` must be non-empty; their count becomes the pool size.
    pub fn new(
        spec: ServiceSpec,
        engines: Vec<Box<dyn Engine>>,
        dispatcher: Arc<Dispatcher>,
        barrier_ttl: Option<Duration>,
    ) -> Self {
        let metadata = engines
            .first()
            .map(|engine| engine.metadata())
            .unwrap_or_else(|| EngineMetadata::text(&spec.engine_type, ""));
        let states = Arc::new(ServiceStateTable::new());
        Self {
            compositions: CompositionCache::new(spec.name.clone()),
            router: RoutingEvaluator::new(spec.name.clone(), states, barrier_ttl),
            engines: ObjectPool::new(engines),
            metadata,
            spec,
            dispatcher,
            reports: ReportPolicy::default(),
        }
    }

    pub fn name(&self) -> &CanonicalName {
        &self.spec.name
    }

    pub fn spec(&self) -> &ServiceSpec {
        &self.spec
    }

    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    pub fn reports(&self) -> &ReportPolicy {
        &self.reports
    }

    pub fn states(&self) -> &Arc<ServiceStateTable> {
        self.router.states()
    }

    pub fn compositions(&self) -> &CompositionCache {
        &self.compositions
    }

    pub fn engines(&self) -> &Arc<ObjectPool<Box<dyn Engine>>> {
        &self.engines
    }

    pub fn snapshot(&self) -> ServiceSnapshot {
        ServiceSnapshot {
            name: self.spec.name.to_string(),
            engine_type: self.spec.engine_type.clone(),
            description: self.spec.description.clone(),
            pool_size: self.engines.capacity(),
            idle_engines: self.engines.available(),
            executions: self.reports.executions(),
            report_done_every: self.reports.done_every(),
            report_data_every: self.reports.data_every(),
            engine: self.metadata.clone(),
        }
    }

    /// Serve one message published on the service topic.
    pub async fn serve(&self, message: Message) -> Result<(), ServiceError> {
        let action = message.meta.action();
        let service = self.spec.name.to_string();
        let received = MessageReceived {
            service: &service,
            sender: &message.meta.author,
            communication_id: message.meta.communication_id,
            action: match action {
                Action::Execute => "execute",
                Action::Configure => "configure",
            },
        };
        received.log();
        let span = received.span("serve");
        match action {
            Action::Execute => self.execute(message).instrument(span).await,
            Action::Configure => self.configure(message).instrument(span).await,
        }
    }

    /// Execute the engine on `message` and route the result.
    ///
    /// Nothing happens until every input of a pending AND group arrived. On
    /// engine failure an error report is published and nothing is routed.
    /// When the requester asked for a reply it gets the result instead of
    /// the next services.
    pub async fn execute(&self, message: Message) -> Result<(), ServiceError> {
        let sender: CanonicalName = message.meta.author.parse()?;
        let communication_id = message.meta.communication_id;
        let data = self.dispatcher.resolve(&self.spec.name, &sender, &message)?;
        if let Some(state) = &data.state {
            self.states().record(&sender, state.clone());
        }

        let compiled = self.compositions.resolve(&message.meta.composition)?;
        let admission = self
            .router
            .admit(&compiled, &sender, communication_id, data)
            .map_err(|e| {
                SenderRejected {
                    owner: &self.spec.name.to_string(),
                    sender: &sender.to_string(),
                    error: &e,
                }
                .log();
                e
            })?;
        let (inputs, joined) = match admission {
            Admission::Pending => return Ok(()),
            Admission::Ready { inputs, joined } => (inputs, joined),
        };

        let started = Instant::now();
        let result = {
            let mut engine = self.engines.acquire().await?;
            let mut inputs: Vec<EngineData> = inputs.into_iter().map(|(_, data)| data).collect();
            if inputs.len() == 1 {
                let input = inputs.remove(0);
                engine.execute(input).await
            } else {
                engine.execute_group(inputs).await
            }
        };
        let elapsed = started.elapsed();

        let mut output = match result {
            Ok(output) => output,
            Err(failure) => {
                self.fail(&message, &failure).await?;
                return Err(failure.into());
            }
        };
        output.communication_id = communication_id;
        if let Some(state) = &output.state {
            self.states().record(&self.spec.name, state.clone());
        }

        let due = self.reports.record_execution();
        if due.done {
            let done = EngineData {
                communication_id,
                ..EngineData::text(self.spec.name.to_string())
            };
            self.publish_report(ReportKind::Done, &done, compiled.raw(), elapsed).await?;
        }
        if due.data {
            self.publish_report(ReportKind::Data, &output, compiled.raw(), elapsed)
                .await?;
        }

        if let Some(reply) = message.reply_with(&self.spec.name, &output) {
            self.dispatcher.transport().publish(reply).await?;
            return Ok(());
        }

        let destinations = self.router.destinations(&compiled, &sender, &joined);
        let names: Vec<String> = destinations.iter().map(ToString::to_string).collect();
        RouteSelected {
            owner: &self.spec.name.to_string(),
            communication_id,
            destinations: &names,
        }
        .log();
        for destination in &destinations {
            self.dispatcher
                .send(&self.spec.name, destination, compiled.raw(), &output)
                .await?;
        }
        Ok(())
    }

    /// Apply a configure request to every engine instance once the pool is
    /// idle, honouring the request's wait mode.
    pub async fn configure(&self, message: Message) -> Result<(), ServiceError> {
        let mode = format!("{:?}", message.meta.configure_mode());
        let mut engines = match self.acquire_idle_pool(&message).await {
            Ok(engines) => engines,
            Err(e) => {
                let failure = EngineFailure::new(Severity::Minor, e.to_string());
                self.publish_status(ReportKind::Warning(Severity::Minor), &message, &failure)
                    .await?;
                if let Some(reply) = message.reply_with_error(&self.spec.name, &failure) {
                    self.dispatcher.transport().publish(reply).await?;
                }
                return Err(e.into());
            }
        };

        let input = message.engine_data();
        let mut failed = None;
        for engine in engines.iter_mut() {
            if let Err(failure) = engine.configure(input.clone()).await {
                failed = Some(failure);
                break;
            }
        }
        let instances = engines.len();
        drop(engines);
        if let Some(failure) = failed {
            self.fail(&message, &failure).await?;
            return Err(failure.into());
        }

        ServiceConfigured {
            service: &self.spec.name.to_string(),
            mode: &mode,
            instances,
        }
        .log();
        let ack = EngineData::text("configured").with_communication_id(message.meta.communication_id);
        if let Some(reply) = message.reply_with(&self.spec.name, &ack) {
            self.dispatcher.transport().publish(reply).await?;
        }
        Ok(())
    }

    async fn acquire_idle_pool(&self, message: &Message) -> Result<PooledAll<Box<dyn Engine>>, PoolError> {
        match message.meta.configure_mode() {
            ConfigureMode::Blocking => self.engines.acquire_all().await,
            ConfigureMode::Immediate => self.engines.try_acquire_all(),
            ConfigureMode::WithTimeout => {
                let timeout = Duration::from_millis(message.meta.configure_timeout_ms);
                self.engines.acquire_all_timeout(timeout).await
            }
        }
    }

    /// Log an engine failure, publish the error report and answer a waiting
    /// requester.
    async fn fail(&self, message: &Message, failure: &EngineFailure) -> Result<(), ServiceError> {
        EngineExecutionFailed {
            service: &self.spec.name.to_string(),
            communication_id: message.meta.communication_id,
            severity: failure.severity.as_u32(),
            error: failure,
        }
        .log();
        self.publish_status(ReportKind::Error(failure.severity), message, failure)
            .await?;
        if let Some(reply) = message.reply_with_error(&self.spec.name, failure) {
            self.dispatcher.transport().publish(reply).await?;
        }
        Ok(())
    }

    async fn publish_status(
        &self,
        kind: ReportKind,
        request: &Message,
        failure: &EngineFailure,
    ) -> Result<(), ServiceError> {
        let data = EngineData {
            description: failure.message.clone(),
            communication_id: request.meta.communication_id,
            ..EngineData::text(failure.message.clone())
        };
        let mut report = Message::data(
            kind.topic(&self.spec.name),
            &self.spec.name,
            &request.meta.composition,
            &data,
            DataLocation::Network,
        );
        report.meta.severity = failure.severity.as_u32();
        report.meta.set_status(match kind {
            ReportKind::Error(_) => Status::Error,
            ReportKind::Warning(_) => Status::Warning,
            _ => Status::Info,
        });
        self.dispatcher.transport().publish(report).await?;
        Ok(())
    }

    async fn publish_report(
        &self,
        kind: ReportKind,
        data: &EngineData,
        composition: &str,
        elapsed: Duration,
    ) -> Result<(), ServiceError> {
        let mut report = Message::data(
            kind.topic(&self.spec.name),
            &self.spec.name,
            composition,
            data,
            DataLocation::Network,
        );
        report.meta.execution_time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.dispatcher.transport().publish(report).await?;
        Ok(())
    }
}
