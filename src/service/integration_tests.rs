use std::sync::Arc;
use std::time::Duration;

use crate::config::RuntimeSettings;
use crate::dpe::{Dpe, DpeHandle};
use crate::engines::{EngineData, EngineRegistry};
use crate::name::CanonicalName;
use crate::orchestrator::Orchestrator;
use crate::protocol::{Message, ReportKind, Severity};
use crate::service::ServiceSpec;
use crate::transport::{InMemoryTransport, Subscription};

const TIMEOUT: Duration = Duration::from_secs(2);

fn name(s: &str) -> CanonicalName {
    s.parse().unwrap()
}

/// Start a DPE hosting `services` (`container:Engine`, engine type) with
/// data reports on for every service.
async fn start_dpe(transport: &Arc<InMemoryTransport>, dpe: &str, services: &[(&str, &str)]) -> DpeHandle {
    let dpe = Dpe::new(
        name(dpe),
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
    for (service, engine_type) in services {
        let service = name(&format!("{}:{}", dpe.name(), service));
        let container = service.container_name().unwrap();
        dpe.deploy(container, "").await.unwrap();
        dpe.deploy_service(ServiceSpec::new(service.clone(), *engine_type, 2))
            .await
            .unwrap()
            .reports()
            .set_data_every(1);
    }
    dpe.run().await.unwrap()
}

fn orchestrator(transport: &Arc<InMemoryTransport>) -> Orchestrator {
    Orchestrator::new(name("10.1.1.9_java:orchestrator:Test"), transport.clone()).with_timeout(TIMEOUT)
}

async fn next_report(reports: &mut Subscription) -> Message {
    tokio::time::timeout(TIMEOUT, reports.recv())
        .await
        .expect("report in time")
        .expect("transport open")
}

#[tokio::test]
async fn test_fan_out_and_join() {
    let transport = Arc::new(InMemoryTransport::new());
    let handle = start_dpe(
        &transport,
        "10.1.1.1_java",
        &[
            ("fan:Source", "change_text_case_lower"),
            ("fan:Left", "change_text_case_upper"),
            ("fan:Right", "reverse_text"),
            ("fan:Join", "prefix_suffix_adder"),
        ],
    )
    .await;
    let join = name("10.1.1.1_java:fan:Join");
    let orchestrator = orchestrator(&transport);
    let mut joined = orchestrator.subscribe_reports_of(ReportKind::Data, &join).await.unwrap();

    let composition = "10.1.1.1_java:fan:Source+10.1.1.1_java:fan:Left,10.1.1.1_java:fan:Right+&10.1.1.1_java:fan:Join";
    let first = orchestrator
        .execute_composition(composition, EngineData::text("Fan In"))
        .await
        .unwrap();
    let second = orchestrator
        .execute_composition(composition, EngineData::text("Two"))
        .await
        .unwrap();

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let report = next_report(&mut joined).await;
        outputs.push((report.meta.communication_id, String::from_utf8(report.data).unwrap()));
    }
    outputs.sort();
    // Group inputs are ordered by sender name: Left before Right.
    assert_eq!(
        outputs,
        vec![
            (first, "FAN IN\nni naf".to_string()),
            (second, "TWO\nowt".to_string()),
        ]
    );

    let service = handle.dpe().service(&join).await.unwrap();
    assert_eq!(service.reports().executions(), 2);
    assert!(handle.dpe().shared_memory().is_empty());
    handle.stop().await;
}

#[tokio::test]
async fn test_conditional_routing_follows_classifier_state() {
    let transport = Arc::new(InMemoryTransport::new());
    let handle = start_dpe(
        &transport,
        "10.1.1.1_java",
        &[
            ("route:Classify", "text_length_classifier"),
            ("route:Short", "change_text_case_upper"),
            ("route:Long", "token_counter"),
        ],
    )
    .await;
    let orchestrator = orchestrator(&transport);
    let short = name("10.1.1.1_java:route:Short");
    let long = name("10.1.1.1_java:route:Long");
    let mut short_reports = orchestrator.subscribe_reports_of(ReportKind::Data, &short).await.unwrap();
    let mut long_reports = orchestrator.subscribe_reports_of(ReportKind::Data, &long).await.unwrap();

    let composition = r#"10.1.1.1_java:route:Classify;
        if (10.1.1.1_java:route:Classify == "SHORT") { 10.1.1.1_java:route:Classify + 10.1.1.1_java:route:Short }
        else { 10.1.1.1_java:route:Classify + 10.1.1.1_java:route:Long }"#;

    orchestrator
        .execute_composition(composition, EngineData::text("tiny"))
        .await
        .unwrap();
    let report = next_report(&mut short_reports).await;
    assert_eq!(report.data, b"TINY");
    let classify_name = name("10.1.1.1_java:route:Classify");
    let classify = handle.dpe().service(&classify_name).await.unwrap();
    assert_eq!(classify.states().get(&classify_name).as_deref(), Some("SHORT"));

    orchestrator
        .execute_composition(composition, EngineData::text("a much longer input sentence"))
        .await
        .unwrap();
    let report = next_report(&mut long_reports).await;
    let counts: serde_json::Value = serde_json::from_slice(&report.data).unwrap();
    assert_eq!(counts["word_count"], 5);

    assert!(short_reports.try_recv().is_none());
    assert_eq!(classify.states().get(&classify_name).as_deref(), Some("LONG"));
    assert_eq!(classify.compositions().compilations(), 1);
    handle.stop().await;
}

/// Payload bytes the transport carried while running `composition` once.
async fn payload_bytes_for(
    transport: &Arc<InMemoryTransport>,
    composition: &str,
    last: &CanonicalName,
) -> u64 {
    let orchestrator = orchestrator(transport);
    let mut reports = orchestrator.subscribe_reports_of(ReportKind::Data, last).await.unwrap();
    let before = transport.stats().payload_bytes;
    orchestrator
        .execute_composition(composition, EngineData::text("hello"))
        .await
        .unwrap();
    let report = next_report(&mut reports).await;
    assert_eq!(report.data, b"OLLEH");
    transport.stats().payload_bytes - before
}

#[tokio::test]
async fn test_local_hops_skip_the_network() {
    let transport = Arc::new(InMemoryTransport::new());
    let local = start_dpe(
        &transport,
        "10.1.1.1_java",
        &[("c:Upper", "change_text_case_upper"), ("c:Reverse", "reverse_text")],
    )
    .await;
    let remote = start_dpe(&transport, "10.1.1.2_java", &[("c:Reverse", "reverse_text")]).await;
    for handle in [&local, &remote] {
        let upper = name(&format!("{}:c:Upper", handle.dpe().name()));
        if let Some(service) = handle.dpe().service(&upper).await {
            service.reports().set_data_every(0);
        }
    }

    // Injection and the final data report: 5 + 5 bytes.
    let same_dpe = payload_bytes_for(
        &transport,
        "10.1.1.1_java:c:Upper+10.1.1.1_java:c:Reverse",
        &name("10.1.1.1_java:c:Reverse"),
    )
    .await;
    assert_eq!(same_dpe, 10);

    // The hop to the other DPE carries the payload as well.
    let cross_dpe = payload_bytes_for(
        &transport,
        "10.1.1.1_java:c:Upper+10.1.1.2_java:c:Reverse",
        &name("10.1.1.2_java:c:Reverse"),
    )
    .await;
    assert_eq!(cross_dpe, 15);

    assert!(local.dpe().shared_memory().is_empty());
    local.stop().await;
    remote.stop().await;
}

#[tokio::test]
async fn test_failed_engine_reports_error_and_stops_routing() {
    let transport = Arc::new(InMemoryTransport::new());
    let handle = start_dpe(
        &transport,
        "10.1.1.1_java",
        &[("c:Count", "token_counter"), ("c:Upper", "change_text_case_upper")],
    )
    .await;
    let orchestrator = orchestrator(&transport);
    let mut errors = orchestrator.subscribe_reports(ReportKind::Error(Severity::Minor)).await.unwrap();

    orchestrator
        .execute_composition(
            "10.1.1.1_java:c:Count+10.1.1.1_java:c:Upper",
            EngineData::bytes(vec![0xff, 0xfe]),
        )
        .await
        .unwrap();

    let report = next_report(&mut errors).await;
    assert_eq!(report.topic.as_str(), "error:1:10.1.1.1_java:c:Count");
    assert!(report.failure().is_some());

    let upper = handle.dpe().service(&name("10.1.1.1_java:c:Upper")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(upper.reports().executions(), 0);
    handle.stop().await;
}

#[tokio::test]
async fn test_loop_composition_stops_at_the_tail() {
    let transport = Arc::new(InMemoryTransport::new());
    let handle = start_dpe(
        &transport,
        "10.1.1.1_java",
        &[("loop:S1", "reverse_text"), ("loop:S3", "reverse_text")],
    )
    .await;
    let s1_name = name("10.1.1.1_java:loop:S1");
    let s3_name = name("10.1.1.1_java:loop:S3");
    let orchestrator = orchestrator(&transport);
    let mut s1_reports = orchestrator.subscribe_reports_of(ReportKind::Data, &s1_name).await.unwrap();

    orchestrator
        .execute_composition(
            "10.1.1.1_java:loop:S1+10.1.1.1_java:loop:S3+10.1.1.1_java:loop:S1",
            EngineData::text("abc"),
        )
        .await
        .unwrap();

    assert_eq!(next_report(&mut s1_reports).await.data, b"cba");
    assert_eq!(next_report(&mut s1_reports).await.data, b"cba");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let s1 = handle.dpe().service(&s1_name).await.unwrap();
    let s3 = handle.dpe().service(&s3_name).await.unwrap();
    assert_eq!(s1.reports().executions(), 2);
    assert_eq!(s3.reports().executions(), 1);
    assert!(s1_reports.try_recv().is_none());
    assert!(handle.dpe().shared_memory().is_empty());
    handle.stop().await;
}

#[tokio::test]
async fn test_successor_missing_from_the_dpe_leaves_no_shared_memory() {
    let transport = Arc::new(InMemoryTransport::new());
    let handle = start_dpe(&transport, "10.1.1.1_java", &[("c:Upper", "change_text_case_upper")]).await;
    let upper = name("10.1.1.1_java:c:Upper");
    let orchestrator = orchestrator(&transport);
    let mut reports = orchestrator.subscribe_reports_of(ReportKind::Data, &upper).await.unwrap();

    for text in ["one", "two"] {
        orchestrator
            .execute_composition("10.1.1.1_java:c:Upper+10.1.1.1_java:c:Nobody", EngineData::text(text))
            .await
            .unwrap();
        next_report(&mut reports).await;
    }

    assert!(handle.dpe().shared_memory().is_empty());
    assert_eq!(handle.dpe().snapshot().await.shared_memory_entries, 0);
    handle.stop().await;
}
