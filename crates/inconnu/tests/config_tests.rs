//! Integration tests for configuration loading.

use std::path::PathBuf;

use inconnu::config::env::EnvConfig;
use inconnu::config::file::{ConfigFormat, load_config, parse_config};
use inconnu::label::EntityLabel;
use inconnu::{Config, Inconnu, PatternDomain};

fn temp_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("inconnu-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn default_config_builds_an_engine() {
    let engine = Inconnu::builder().config(Config::default()).build().unwrap();
    assert_eq!(engine.config().batch_size, 100);
    assert_eq!(engine.config().chunk_size, 10_000);
    assert_eq!(engine.config().chunk_overlap, 200);
}

#[test]
fn invalid_config_fails_at_build() {
    let err = Inconnu::builder()
        .config(Config::new().chunk_size(10).chunk_overlap(20))
        .build()
        .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn toml_file_drives_the_engine() {
    let path = temp_file(
        "engine.toml",
        r#"
enabled_domains = ["healthcare"]
excluded_labels = []
store_original = true
"#,
    );
    let config = load_config(&path).unwrap();
    assert!(config.store_original);
    assert!(config.excluded_labels.is_empty());

    let engine = Inconnu::builder().config(config).build().unwrap();
    assert!(engine.supported_patterns().contains(&EntityLabel::Npi));
}

#[test]
fn json_round_trip() {
    let config = Config::new()
        .enable_domain(PatternDomain::Technology)
        .excluded_labels([EntityLabel::Date])
        .log_conflicts(true);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(parse_config(&json, ConfigFormat::Json).unwrap(), config);
}

#[test]
fn labels_in_files_are_normalized() {
    let config = parse_config(r#"excluded_labels = ["per", "EMAIL_ADDRESS"]"#, ConfigFormat::Toml).unwrap();
    assert_eq!(config.excluded_labels, [EntityLabel::Person, EntityLabel::Email]);
}

#[test]
fn unknown_extension_is_rejected() {
    let path = temp_file("engine.yaml", "chunk_size: 10\n");
    assert!(load_config(&path).unwrap_err().is_config());
}

#[test]
fn environment_overrides_file() {
    let path = temp_file("base.json", r#"{"batch_size": 25, "language": "en"}"#);
    let base = load_config(&path).unwrap();

    let env = EnvConfig::default().with_source([
        ("INCONNU_BATCH_SIZE", "5"),
        ("INCONNU_LANGUAGE", "nl"),
        ("UNRELATED", "1"),
    ]);
    let config = env.apply(base).unwrap();
    config.validate().unwrap();
    assert_eq!(config.batch_size, 5);
    assert_eq!(config.language, "nl");
}
