use std::io::Write;
use std::time::Duration;

use crate::config::{load_and_validate_config, load_config};
use crate::engines::EngineRegistry;
use crate::errors::ConfigError;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_text_pipeline_yaml_loading() {
    let cfg = load_and_validate_config("configs/text-pipeline.yaml", &EngineRegistry::with_builtins()).unwrap();

    assert_eq!(cfg.dpe_name().unwrap().to_string(), "127.0.0.1_java");
    let specs = cfg.service_specs().unwrap();
    let names: Vec<String> = specs.iter().map(|s| s.name.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "127.0.0.1_java:text:Upper",
            "127.0.0.1_java:text:Reverse",
            "127.0.0.1_java:text:Count",
        ]
    );
    assert_eq!(specs.iter().map(|s| s.pool_size).collect::<Vec<_>>(), vec![2, 4, 1]);

    let request = cfg.request.unwrap();
    assert_eq!(request.timeout(), Duration::from_secs(2));
}

#[test]
fn test_fan_in_toml_loading() {
    let cfg = load_and_validate_config("configs/fan-in.toml", &EngineRegistry::with_builtins()).unwrap();

    assert_eq!(cfg.dpe_name().unwrap().to_string(), "127.0.0.1_python");
    let settings = cfg.settings();
    assert_eq!(settings.barrier_ttl, Some(Duration::from_secs(60)));
    assert_eq!(settings.queue_capacity, 16);
    assert_eq!(cfg.containers.len(), 1);
    assert_eq!(cfg.containers[0].services.len(), 4);
}

#[test]
fn test_conditional_yaml_loading() {
    let cfg = load_and_validate_config("configs/conditional.yaml", &EngineRegistry::with_builtins()).unwrap();
    let request = cfg.request.unwrap();
    assert!(request.composition.contains("if ("));
}

#[test]
fn test_missing_file() {
    let err = load_config("configs/does-not-exist.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_malformed_files() {
    let yaml = write_temp(".yaml", "dpe: [not, a, map]");
    assert!(matches!(load_config(yaml.path()), Err(ConfigError::Yaml(_))));

    let toml = write_temp(".toml", "[dpe]\nhost = ");
    assert!(matches!(load_config(toml.path()), Err(ConfigError::Toml(_))));
}

#[test]
fn test_validation_failure_lists_every_error() {
    let file = write_temp(
        ".yml",
        r#"
dpe:
  host: 10.1.1.1
  lang: cpp
containers:
  - name: c
    services:
      - engine: A
        engine_type: missing_engine
      - engine: B
        engine_type: reverse_text
        pool_size: 0
"#,
    );

    let err = load_and_validate_config(file.path(), &EngineRegistry::with_builtins()).unwrap_err();
    match &err {
        ConfigError::Invalid(errors) => assert_eq!(errors.len(), 2),
        other => panic!("unexpected error: {}", other),
    }
    let message = err.to_string();
    assert!(message.contains("missing_engine"));
    assert!(message.contains("10.1.1.1_cpp:c:B"));
}
