use futures::TryStreamExt;
use recall::config::ConfigFormat;
use recall::{open_store, MemoryRecord, MemoryStore, RecallConfig, RecallError};

fn record(id: &str, embedding: Vec<f32>) -> MemoryRecord {
    MemoryRecord::local_record(id, format!("text {id}"), "", embedding, "", None)
}

async fn exercise(config: RecallConfig) {
    let store = open_store(&config).await.unwrap();
    store.create_collection("notes").await.unwrap();
    assert!(store.does_collection_exist("notes").await.unwrap());

    let keys: Vec<String> = store
        .upsert_batch(
            "notes",
            vec![
                record("a", vec![1.0, 0.0]),
                record("b", vec![0.0, 1.0]),
                record("c", vec![0.7, 0.7]),
            ],
        )
        .try_collect()
        .await
        .unwrap();
    assert_eq!(keys, vec!["a", "b", "c"]);

    let got = store.get("notes", "c", false).await.unwrap().unwrap();
    assert_eq!(got.metadata.text, "text c");
    assert!(got.embedding.is_empty());
    assert!(got.timestamp.is_some());

    let matches: Vec<(MemoryRecord, f64)> = store
        .get_nearest_matches("notes", vec![1.0, 0.0], 2, 0.0, false)
        .try_collect()
        .await
        .unwrap();
    let order: Vec<&str> = matches.iter().map(|(r, _)| r.key()).collect();
    assert_eq!(order, vec!["a", "c"]);

    store.delete_collection("notes").await.unwrap();
    assert!(!store.does_collection_exist("notes").await.unwrap());
}

#[tokio::test]
async fn memory_backend_from_config() {
    let config = RecallConfig::parse("[backend]\nkind = \"memory\"\n", ConfigFormat::Toml).unwrap();
    exercise(config).await;
}

#[tokio::test]
async fn default_config_opens_memory_backend() {
    exercise(RecallConfig::default()).await;
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn sqlite_backend_from_config() {
    let config = RecallConfig::parse(
        "backend:\n  kind: sqlite\n  path: \":memory:\"\n",
        ConfigFormat::Yaml,
    )
    .unwrap();
    exercise(config).await;
}

#[cfg(not(feature = "mongodb"))]
#[tokio::test]
async fn mongodb_without_feature_is_config_error() {
    let config = RecallConfig::parse(
        "[backend]\nkind = \"mongodb\"\ndatabase = \"db\"\nconnection_string = \"mongodb://localhost\"\n",
        ConfigFormat::Toml,
    )
    .unwrap();
    let err = open_store(&config).await.err().unwrap();
    assert!(matches!(err, RecallError::Config(msg) if msg.contains("mongodb")));
}

#[cfg(feature = "mongodb")]
#[tokio::test]
async fn mongodb_backend_connects_lazily() {
    let config = RecallConfig::parse(
        "[backend]\nkind = \"mongodb\"\ndatabase = \"db\"\nconnection_string = \"mongodb://localhost:27017\"\nindex_name = \"vec_idx\"\n",
        ConfigFormat::Toml,
    )
    .unwrap();
    assert!(open_store(&config).await.is_ok());
}

#[cfg(feature = "mongodb")]
#[tokio::test]
async fn mongodb_missing_env_var_is_config_error() {
    let config = RecallConfig::parse(
        "[backend]\nkind = \"mongodb\"\ndatabase = \"db\"\nconnection_string_env = \"RECALL_FACADE_UNSET_URI\"\n",
        ConfigFormat::Toml,
    )
    .unwrap();
    let err = open_store(&config).await.err().unwrap();
    assert!(matches!(err, RecallError::Config(_)));
}
