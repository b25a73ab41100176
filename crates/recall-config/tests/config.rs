use std::io::Write;

use recall_config::{BackendConfig, ConfigFormat, LoggingConfig, RecallConfig, SqliteSettings};
use recall_core::RecallError;

fn temp_file(content: &str, ext: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("recall_config_test_")
        .suffix(&format!(".{ext}"))
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn load_mongodb_toml() {
    let file = temp_file(
        r#"
[backend]
kind = "mongodb"
connection_string_env = "ATLAS_URI"
database = "memory"
index_name = "vec_idx"
num_candidates_multiplier = 20

[logging]
filter = "recall=debug"
json = true
"#,
        "toml",
    );

    let config = RecallConfig::load(Some(file.path())).unwrap();
    let BackendConfig::Mongodb(mongo) = &config.backend else {
        panic!("expected mongodb backend, got {:?}", config.backend);
    };
    assert_eq!(mongo.database, "memory");
    assert_eq!(mongo.connection_string_env, "ATLAS_URI");
    assert_eq!(mongo.connection_string, None);
    assert_eq!(mongo.index_name, "vec_idx");
    assert_eq!(mongo.embedding_path, "embedding");
    assert_eq!(mongo.num_candidates_multiplier, 20);
    assert_eq!(mongo.app_name, "recall");
    assert_eq!(config.logging.filter.as_deref(), Some("recall=debug"));
    assert!(config.logging.json);
}

#[test]
fn mongodb_defaults() {
    let config = RecallConfig::parse(
        "[backend]\nkind = \"mongodb\"\ndatabase = \"db\"\n",
        ConfigFormat::Toml,
    )
    .unwrap();
    let BackendConfig::Mongodb(mongo) = config.backend else {
        panic!("expected mongodb backend");
    };
    assert_eq!(mongo.connection_string_env, "MONGODB_URI");
    assert_eq!(mongo.index_name, "default");
    assert_eq!(mongo.num_candidates_multiplier, 10);
}

#[test]
fn mongodb_requires_database() {
    let result = RecallConfig::parse("[backend]\nkind = \"mongodb\"\n", ConfigFormat::Toml);
    assert!(matches!(result, Err(RecallError::Config(_))));
}

#[test]
fn connection_string_from_env() {
    std::env::set_var("RECALL_CONFIG_TEST_URI", "mongodb://from-env:27017");
    let config = RecallConfig::parse(
        r#"
[backend]
kind = "mongodb"
database = "db"
connection_string_env = "RECALL_CONFIG_TEST_URI"
"#,
        ConfigFormat::Toml,
    )
    .unwrap();
    let BackendConfig::Mongodb(mongo) = config.backend else {
        panic!("expected mongodb backend");
    };
    assert_eq!(
        mongo.resolve_connection_string().unwrap(),
        "mongodb://from-env:27017"
    );
}

#[test]
fn sqlite_and_memory_backends() {
    let sqlite = RecallConfig::parse(
        "[backend]\nkind = \"sqlite\"\npath = \"/tmp/r.db\"\n",
        ConfigFormat::Toml,
    )
    .unwrap();
    assert_eq!(
        sqlite.backend,
        BackendConfig::Sqlite(SqliteSettings {
            path: "/tmp/r.db".to_string()
        })
    );

    let default_path = RecallConfig::parse("[backend]\nkind = \"sqlite\"\n", ConfigFormat::Toml)
        .unwrap();
    assert_eq!(default_path.backend, BackendConfig::Sqlite(SqliteSettings::default()));

    let memory = RecallConfig::parse("[backend]\nkind = \"memory\"\n", ConfigFormat::Toml).unwrap();
    assert_eq!(memory.backend, BackendConfig::Memory);
}

#[test]
fn empty_document_defaults_to_memory() {
    let config = RecallConfig::parse("", ConfigFormat::Toml).unwrap();
    assert_eq!(config.backend, BackendConfig::Memory);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn unknown_backend_kind() {
    let result = RecallConfig::parse("[backend]\nkind = \"redis\"\n", ConfigFormat::Toml);
    assert!(matches!(result, Err(RecallError::Config(msg)) if msg.starts_with("TOML parse error")));
}

#[test]
fn yaml_and_json_documents() {
    let yaml = RecallConfig::parse(
        "backend:\n  kind: sqlite\n  path: \":memory:\"\nlogging:\n  json: true\n",
        ConfigFormat::Yaml,
    )
    .unwrap();
    assert_eq!(yaml.backend.kind(), "sqlite");
    assert!(yaml.logging.json);

    let json = RecallConfig::parse(
        r#"{"backend": {"kind": "mongodb", "database": "db", "connection_string": "mongodb://x"}}"#,
        ConfigFormat::Json,
    )
    .unwrap();
    let BackendConfig::Mongodb(mongo) = json.backend else {
        panic!("expected mongodb backend");
    };
    assert_eq!(mongo.resolve_connection_string().unwrap(), "mongodb://x");
}

#[test]
fn explicit_missing_path_is_error() {
    let result = RecallConfig::load(Some(std::path::Path::new(
        "/tmp/recall_config_does_not_exist.toml",
    )));
    assert!(matches!(result, Err(RecallError::Config(msg)) if msg.contains("not found")));
}
