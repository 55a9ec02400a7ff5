use agentrt_core::Storage;
use agentrt_storage_memory::MemoryStorage;
use std::sync::Arc;

// --- Basic CRUD ---

#[tokio::test]
async fn save_then_load() {
    let store = MemoryStorage::new();

    store.save("agent:1", serde_json::json!("hello")).await.unwrap();

    let val = store.load("agent:1").await.unwrap();
    assert_eq!(val, Some(serde_json::json!("hello")));
}

#[tokio::test]
async fn load_missing_returns_none() {
    let store = MemoryStorage::new();

    let val = store.load("missing").await.unwrap();
    assert_eq!(val, None);
}

#[tokio::test]
async fn overwrite_replaces_checkpoint() {
    let store = MemoryStorage::new();

    store.save("agent:1", serde_json::json!(1)).await.unwrap();
    store.save("agent:1", serde_json::json!(2)).await.unwrap();

    let val = store.load("agent:1").await.unwrap();
    assert_eq!(val, Some(serde_json::json!(2)));
}

#[tokio::test]
async fn delete_removes_checkpoint() {
    let store = MemoryStorage::new();

    store.save("agent:1", serde_json::json!("val")).await.unwrap();
    store.delete("agent:1").await.unwrap();

    let val = store.load("agent:1").await.unwrap();
    assert_eq!(val, None);
}

#[tokio::test]
async fn delete_missing_is_noop() {
    let store = MemoryStorage::new();
    store.delete("nonexistent").await.unwrap();
}

// --- Isolation between keys ---

#[tokio::test]
async fn keys_are_isolated() {
    let store = MemoryStorage::new();

    store.save("agent:1", serde_json::json!("from-1")).await.unwrap();
    store.save("agent:2", serde_json::json!("from-2")).await.unwrap();

    assert_eq!(store.load("agent:1").await.unwrap(), Some(serde_json::json!("from-1")));
    assert_eq!(store.load("agent:2").await.unwrap(), Some(serde_json::json!("from-2")));
}

#[tokio::test]
async fn delete_one_key_doesnt_affect_other() {
    let store = MemoryStorage::new();

    store.save("agent:1", serde_json::json!("val1")).await.unwrap();
    store.save("agent:2", serde_json::json!("val2")).await.unwrap();
    store.delete("agent:1").await.unwrap();

    assert_eq!(store.load("agent:1").await.unwrap(), None);
    assert_eq!(store.load("agent:2").await.unwrap(), Some(serde_json::json!("val2")));
}

// --- Object safety ---

#[tokio::test]
async fn usable_as_dyn_storage() {
    let store: Box<dyn Storage> = Box::new(MemoryStorage::new());
    store.save("agent:1", serde_json::json!("val")).await.unwrap();
    let val = store.load("agent:1").await.unwrap();
    assert_eq!(val, Some(serde_json::json!("val")));
}

#[tokio::test]
async fn usable_as_arc_dyn_storage() {
    let store: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    store.save("agent:1", serde_json::json!("val")).await.unwrap();
    let val = store.load("agent:1").await.unwrap();
    assert_eq!(val, Some(serde_json::json!("val")));
}

// --- Concurrent access ---

#[tokio::test]
async fn concurrent_writes_to_different_keys() {
    let store = Arc::new(MemoryStorage::new());

    let mut handles = vec![];
    for i in 0..10 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .save(&format!("agent:{i}"), serde_json::json!(i))
                .await
                .unwrap();
        }));
    }

    for h in handles {
        h.await.unwrap();
    }

    assert_eq!(store.len().await, 10);
    for i in 0..10 {
        let val = store.load(&format!("agent:{i}")).await.unwrap();
        assert_eq!(val, Some(serde_json::json!(i)));
    }
}

// --- Complex values ---

#[tokio::test]
async fn stores_complex_json_checkpoints() {
    let store = MemoryStorage::new();

    let complex = serde_json::json!({
        "state": {"orders": 3, "status": "active"},
        "pending_instructions": [],
        "dirty_state": false
    });

    store.save("agent:1", complex.clone()).await.unwrap();
    let val = store.load("agent:1").await.unwrap();
    assert_eq!(val, Some(complex));
}

#[tokio::test]
async fn is_empty_reflects_checkpoint_count() {
    let store = MemoryStorage::new();
    assert!(store.is_empty().await);

    store.save("agent:1", serde_json::json!({})).await.unwrap();
    assert!(!store.is_empty().await);
    assert_eq!(store.len().await, 1);
}
