//! Tests for lazily loaded trees driven by an `ItemsModel`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lattice_items::LoadError;
use lattice_items::model::{
    CanonicalItem, ChildLoadCoordinator, ExpandOutcome, ItemConfig, ItemsModel, tree_rows,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Notify;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("lattice_items=debug")
        .with_test_writer()
        .try_init();
}

fn directory_model() -> Arc<ItemsModel> {
    let config = ItemConfig::new()
        .with_item_title("name")
        .with_item_value("path")
        .with_preserve_empty_children(true);

    Arc::new(ItemsModel::with_records(
        config,
        vec![
            json!({"name": "src", "path": "/src", "children": []}),
            json!({"name": "docs", "path": "/docs", "children": []}),
            json!({"name": "Cargo.toml", "path": "/Cargo.toml"}),
        ],
    ))
}

/// Splices fetched children into the record whose path matches `path`.
fn splice_children(model: &ItemsModel, path: &Value, children: Value) {
    model.update_records(|records| {
        if let Some(record) = records.iter_mut().find(|record| record.get("path") == Some(path)) {
            record["children"] = children;
        }
    });
}

fn item_at(model: &ItemsModel, index: usize) -> CanonicalItem {
    model.items()[index].clone()
}

#[tokio::test]
async fn test_expand_fills_children() {
    init_tracing();
    let model = directory_model();

    let loader_model = model.clone();
    let coordinator = ChildLoadCoordinator::with_loader(move |item: &CanonicalItem| {
        let model = loader_model.clone();
        let path = item.value.clone();
        async move {
            tokio::task::yield_now().await;
            let children = json!([{"name": "lib.rs", "path": format!("{}/lib.rs", path.as_str().unwrap_or(""))}]);
            splice_children(&model, &path, children);
            Ok::<(), LoadError>(())
        }
    });

    let changes = Arc::new(AtomicUsize::new(0));
    let changes_clone = changes.clone();
    model.items_changed.connect(move |_| {
        changes_clone.fetch_add(1, Ordering::SeqCst);
    });

    let src = item_at(&model, 0);
    assert!(src.awaits_children());
    assert_eq!(coordinator.expand(&src).await, ExpandOutcome::Loaded);
    assert_eq!(changes.load(Ordering::SeqCst), 1);

    let src = item_at(&model, 0);
    assert_eq!(src.children()[0].title, "lib.rs");
    assert_eq!(src.children()[0].value, json!("/src/lib.rs"));

    // Loaded items no longer trigger loads.
    assert_eq!(coordinator.expand(&src).await, ExpandOutcome::NotLoadable);

    let leaf = item_at(&model, 2);
    assert_eq!(coordinator.expand(&leaf).await, ExpandOutcome::NotLoadable);
}

#[tokio::test]
async fn test_independent_loads_with_rows() {
    init_tracing();
    let model = directory_model();
    let gate_src = Arc::new(Notify::new());
    let gate_docs = Arc::new(Notify::new());

    let gates = (gate_src.clone(), gate_docs.clone());
    let coordinator = Arc::new(ChildLoadCoordinator::with_loader(move |item: &CanonicalItem| {
        let gate = if item.value == json!("/src") {
            gates.0.clone()
        } else {
            gates.1.clone()
        };
        async move {
            gate.notified().await;
            Ok::<(), LoadError>(())
        }
    }));

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    coordinator
        .loading_changed
        .connect(move |(value, loading)| events_clone.lock().push((value.clone(), *loading)));

    let src = item_at(&model, 0);
    let docs = item_at(&model, 1);

    let expand_src = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.expand(&src).await }
    });
    let expand_docs = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.expand(&docs).await }
    });

    while coordinator.loading_count() < 2 {
        tokio::task::yield_now().await;
    }

    let items = model.items();
    let rows = tree_rows(&items, Some(coordinator.as_ref()));
    let loading: Vec<bool> = rows.iter().map(|row| row.loading).collect();
    assert_eq!(loading, vec![true, true, false]);

    gate_docs.notify_one();
    assert_eq!(expand_docs.await.ok(), Some(ExpandOutcome::Loaded));
    assert!(coordinator.is_loading(&json!("/src")));
    assert!(!coordinator.is_loading(&json!("/docs")));

    gate_src.notify_one();
    assert_eq!(expand_src.await.ok(), Some(ExpandOutcome::Loaded));
    assert_eq!(coordinator.loading_count(), 0);

    let events = events.lock();
    assert_eq!(events.len(), 4);
    assert!(events.contains(&(json!("/docs"), false)));
    assert_eq!(events.last(), Some(&(json!("/src"), false)));
}

#[tokio::test]
async fn test_failed_load_allows_retry() {
    init_tracing();
    let model = directory_model();
    let attempts = Arc::new(AtomicUsize::new(0));

    let counter = attempts.clone();
    let coordinator = ChildLoadCoordinator::with_loader(move |_item: &CanonicalItem| {
        let attempt = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt == 0 {
                Err(LoadError::failed("network down"))
            } else {
                Ok(())
            }
        }
    });

    let docs = item_at(&model, 1);
    assert_eq!(
        coordinator.expand(&docs).await,
        ExpandOutcome::Failed(LoadError::failed("network down"))
    );
    assert!(!coordinator.is_loading(&docs.value));
    assert_eq!(coordinator.expand(&docs).await, ExpandOutcome::Loaded);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
