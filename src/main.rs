// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use dpe_runtime::config::{load_and_validate_config, Config};
use dpe_runtime::dpe::Dpe;
use dpe_runtime::engines::{EngineData, EngineRegistry};
use dpe_runtime::name::CanonicalName;
use dpe_runtime::orchestrator::Orchestrator;
use dpe_runtime::protocol::{ControlRequest, ReportKind, Severity};
use dpe_runtime::transport::InMemoryTransport;

/// Canonical name the CLI sends its request as.
const CLIENT_CONTAINER: &str = "cli";
const CLIENT_ENGINE: &str = "Client";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <config.yaml|config.toml> [input_text]", args[0]);
        eprintln!("Example: {} configs/text-pipeline.yaml \"hello world\"", args[0]);
        eprintln!("Example: {} configs/fan-in.toml", args[0]);
        std::process::exit(1);
    }

    let registry = Arc::new(EngineRegistry::with_builtins());
    let config = load_and_validate_config(&args[1], &registry)
        .with_context(|| format!("loading {}", args[1]))?;
    let input = args.get(2).cloned();

    run(config, registry, input).await
}

async fn run(config: Config, registry: Arc<EngineRegistry>, input: Option<String>) -> anyhow::Result<()> {
    let transport = Arc::new(InMemoryTransport::new());
    let dpe_name = config.dpe_name()?;
    let dpe = Dpe::new(
        dpe_name.clone(),
        transport.clone(),
        transport.clone(),
        registry,
        config.settings(),
    )?;
    let handle = dpe.run().await?;

    if let Some(front_end) = config.front_end()? {
        dpe.apply(ControlRequest::SetFrontEnd { front_end }).await?;
    }
    for (container, container_config) in config.containers()? {
        dpe.deploy(container, &container_config.description).await?;
    }
    for spec in config.service_specs()? {
        dpe.deploy_service(spec).await?;
    }

    println!("DPE {} running", dpe_name);
    for container in dpe.containers().await {
        println!("  container {}", container);
    }
    for service in config.service_specs()? {
        println!("    service {} ({}, pool_size={})", service.name, service.engine_type, service.pool_size);
    }

    let Some(request) = &config.request else {
        println!("No request configured; press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
        handle.stop().await;
        return Ok(());
    };

    let client = CanonicalName::service(
        &CanonicalName::container(&dpe_name, CLIENT_CONTAINER)?,
        CLIENT_ENGINE,
    )?;
    let orchestrator = Orchestrator::new(client, transport.clone()).with_timeout(request.timeout());
    let text = input.unwrap_or_else(|| request.input.clone());

    let outcome = execute(&orchestrator, &dpe, &request.composition, &text, request.timeout()).await;
    handle.stop().await;

    let stats = transport.stats();
    println!();
    println!(
        "Transport: {} messages, {} bytes ({} payload bytes)",
        stats.messages, stats.bytes, stats.payload_bytes
    );
    outcome
}

/// Enable data reports on every service, inject the input and print each
/// report until no report arrives for `timeout`.
async fn execute(
    orchestrator: &Orchestrator,
    dpe: &Dpe,
    composition: &str,
    input: &str,
    timeout: Duration,
) -> anyhow::Result<()> {
    let snapshot = dpe.snapshot().await;
    for service in snapshot.containers.iter().flat_map(|c| c.services.iter()) {
        let name: CanonicalName = service.name.parse()?;
        orchestrator.report_data(&name, 1).await?;
    }
    let mut data = orchestrator.subscribe_reports(ReportKind::Data).await?;
    let mut errors = orchestrator
        .subscribe_reports(ReportKind::Error(Severity::Minor))
        .await?;

    println!();
    println!("Composition: {}", composition);
    println!("Input: \"{}\"", input);
    let id = orchestrator.execute_composition(composition, EngineData::text(input)).await?;

    let mut reports = 0;
    loop {
        tokio::select! {
            report = data.recv() => {
                let Some(report) = report else { break };
                if report.meta.communication_id != id {
                    continue;
                }
                reports += 1;
                let service = report.topic.as_str().trim_start_matches("data:");
                let state = report.meta.sender_state.as_deref().unwrap_or("-");
                println!(
                    "  {} [{} ms, state {}]: {}",
                    service,
                    report.meta.execution_time_ms,
                    state,
                    String::from_utf8_lossy(&report.data)
                );
            }
            report = errors.recv() => {
                let Some(report) = report else { break };
                bail!("{}: {}", report.meta.author, String::from_utf8_lossy(&report.data));
            }
            _ = tokio::time::sleep(timeout) => break,
        }
    }

    if reports == 0 {
        bail!("no service produced output within {:?}", timeout);
    }
    Ok(())
}
