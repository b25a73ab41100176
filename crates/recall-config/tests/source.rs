use std::io::Write;
use std::path::{Path, PathBuf};

use recall_config::{
    default_locations, discover_and_load, load_from_source, locate, BackendConfig, ConfigFormat,
    FileConfigSource, RecallConfig, CONFIG_ENV,
};
use recall_core::RecallError;

const TOML_CONTENT: &str = "[backend]\nkind = \"sqlite\"\npath = \"a.db\"\n";

const JSON_CONTENT: &str = r#"{ "backend": { "kind": "memory" }, "logging": { "filter": "warn" } }"#;

const YAML_CONTENT: &str = "backend:\n  kind: mongodb\n  database: yaml_db\n";

fn temp_file(content: &str, ext: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("recall_source_test_")
        .suffix(&format!(".{ext}"))
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn file_source_by_extension() {
    let toml = temp_file(TOML_CONTENT, "toml");
    let source = FileConfigSource::open(toml.path()).unwrap();
    assert_eq!(source.format(), ConfigFormat::Toml);
    let config: RecallConfig = load_from_source(&source).unwrap();
    assert_eq!(config.backend.kind(), "sqlite");

    let json = temp_file(JSON_CONTENT, "json");
    let config = RecallConfig::load_from(&FileConfigSource::open(json.path()).unwrap()).unwrap();
    assert_eq!(config.backend, BackendConfig::Memory);
    assert_eq!(config.logging.filter.as_deref(), Some("warn"));

    let yaml = temp_file(YAML_CONTENT, "yml");
    let config = RecallConfig::load_from(&FileConfigSource::open(yaml.path()).unwrap()).unwrap();
    let BackendConfig::Mongodb(mongo) = config.backend else {
        panic!("expected mongodb backend");
    };
    assert_eq!(mongo.database, "yaml_db");
}

#[test]
fn unknown_extension_fails_on_open() {
    let err = FileConfigSource::open("/tmp/recall.cfg").unwrap_err();
    assert!(matches!(err, RecallError::Config(msg) if msg.contains("unsupported")));
}

#[test]
fn unreadable_file_fails_on_fetch() {
    let source = FileConfigSource::open("/tmp/recall_source_missing_9f2c.toml").unwrap();
    let result: Result<RecallConfig, _> = load_from_source(&source);
    assert!(matches!(result, Err(RecallError::Config(msg)) if msg.contains("failed to read")));
}

#[test]
fn discover_with_explicit_path() {
    let file = temp_file(TOML_CONTENT, "toml");
    let config: RecallConfig = discover_and_load(Some(file.path())).unwrap();
    assert_eq!(config.backend.kind(), "sqlite");
}

#[test]
fn explicit_path_wins_over_environment() {
    let explicit = temp_file(TOML_CONTENT, "toml");
    assert_eq!(locate(Some(explicit.path())).unwrap(), explicit.path());

    let err = locate(Some(Path::new("/tmp/recall_source_absent_4b1e.yaml"))).unwrap_err();
    assert!(matches!(err, RecallError::Config(msg) if msg.contains("not found")));
}

// The only test in this binary that reads `RECALL_CONFIG`.
#[test]
fn environment_variable_names_the_file() {
    let file = temp_file(JSON_CONTENT, "json");
    std::env::set_var(CONFIG_ENV, file.path());
    let located = locate(None);
    let loaded = RecallConfig::load(None);

    std::env::set_var(CONFIG_ENV, "/tmp/recall_source_env_absent_77aa.toml");
    let missing = locate(None);
    std::env::remove_var(CONFIG_ENV);

    assert_eq!(located.unwrap(), file.path());
    assert_eq!(loaded.unwrap().logging.filter.as_deref(), Some("warn"));
    assert!(matches!(missing, Err(RecallError::Config(msg)) if msg.contains("not found")));
}

#[test]
fn default_locations_order() {
    let paths = default_locations();
    assert_eq!(paths[0], PathBuf::from("./recall.toml"));
    assert_eq!(paths[3], PathBuf::from("./recall.yml"));
    if paths.len() > 4 {
        assert!(paths[4].ends_with(".recall/config.toml"));
    }
}
