//! Integration tests against a live MongoDB Atlas cluster.
//!
//! These tests need `MONGODB_URI` pointing at a cluster whose `recall_test`
//! database has a vector search index named `default` on `embedding`
//! (3 dimensions, cosine) for the `atlas_search` collection.
//! Run with: cargo test -p recall-mongodb -- --ignored atlas

use std::time::Duration;

use futures::TryStreamExt;
use recall_mongodb::{MongoBackend, MongoBackendConfig};
use recall_store::{MemoryRecord, MemoryStore, RecordStore};

async fn atlas_store() -> RecordStore {
    let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let backend = MongoBackend::from_uri(&uri, MongoBackendConfig::new("recall_test"))
        .await
        .expect("MongoDB client creation failed");
    RecordStore::from_backend(backend)
}

fn record(id: &str, embedding: Vec<f32>) -> MemoryRecord {
    MemoryRecord::local_record(id, format!("text {id}"), "", embedding, "", None)
}

#[tokio::test]
#[ignore = "requires MongoDB Atlas"]
async fn atlas_collection_lifecycle() {
    let store = atlas_store().await;
    let name = "atlas_lifecycle";
    store.delete_collection(name).await.unwrap();
    assert!(!store.does_collection_exist(name).await.unwrap());

    store.create_collection(name).await.unwrap();
    store.create_collection(name).await.unwrap();
    assert!(store.does_collection_exist(name).await.unwrap());

    let names: Vec<String> = store.get_collections().try_collect().await.unwrap();
    assert!(names.iter().any(|n| n == name));

    store.delete_collection(name).await.unwrap();
    assert!(!store.does_collection_exist(name).await.unwrap());
}

#[tokio::test]
#[ignore = "requires MongoDB Atlas"]
async fn atlas_crud() {
    let store = atlas_store().await;
    let name = "atlas_crud";
    store.create_collection(name).await.unwrap();

    store.upsert(name, record("a", vec![1.0, 2.0, 3.0])).await.unwrap();
    let bare = store.get(name, "a", false).await.unwrap().unwrap();
    assert!(bare.embedding.is_empty());
    let full = store.get(name, "a", true).await.unwrap().unwrap();
    assert_eq!(full.embedding, vec![1.0, 2.0, 3.0]);

    store.upsert(name, record("a", vec![3.0, 2.0, 1.0])).await.unwrap();
    let replaced = store.get(name, "a", true).await.unwrap().unwrap();
    assert_eq!(replaced.embedding, vec![3.0, 2.0, 1.0]);

    let found: Vec<MemoryRecord> = store
        .get_batch(name, vec!["a".into(), "missing".into()], false)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    store.remove(name, "a").await.unwrap();
    store.remove(name, "a").await.unwrap();
    assert!(store.get(name, "a", false).await.unwrap().is_none());

    store.delete_collection(name).await.unwrap();
}

#[tokio::test]
#[ignore = "requires MongoDB Atlas"]
async fn atlas_search() {
    let store = atlas_store().await;
    let name = "atlas_search";
    store.create_collection(name).await.unwrap();

    let vectors = [
        vec![1.0, 0.0, 0.0],
        vec![0.9, 0.1, 0.0],
        vec![0.5, 0.5, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ];
    let records = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| record(&format!("r{i}"), v.clone()))
        .collect();
    let keys: Vec<String> = store.upsert_batch(name, records).try_collect().await.unwrap();
    assert_eq!(keys.len(), 5);

    // Atlas indexes asynchronously.
    tokio::time::sleep(Duration::from_secs(2)).await;

    let matches: Vec<(MemoryRecord, f64)> = store
        .get_nearest_matches(name, vec![1.0, 0.0, 0.0], 4, -1.0, false)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(matches.len(), 4);
    for pair in matches.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }

    store.remove_batch(name, &keys).await.unwrap();
}
