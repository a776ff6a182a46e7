//! Lazy child loading coordination.
//!
//! Tree views may show items whose children have not been fetched yet: an
//! item with an empty child list (see
//! [`ItemConfig::preserve_empty_children`](super::ItemConfig)) is expanded by
//! running a caller-supplied [`ChildLoader`]. The [`ChildLoadCoordinator`]
//! guarantees one in-flight load per item identity and tracks the loading
//! state per item, so loading one branch never blocks another.
//!
//! # Example
//!
//! ```ignore
//! use lattice_items::model::{ChildLoadCoordinator, ExpandOutcome};
//!
//! let coordinator = ChildLoadCoordinator::with_loader(|item: &CanonicalItem| {
//!     let path = item.value.clone();
//!     async move { fetch_children(path).await.map_err(|e| LoadError::failed(e.to_string())) }
//! });
//!
//! match coordinator.expand(&item).await {
//!     ExpandOutcome::Loaded => model.update_records(|records| splice(records)),
//!     ExpandOutcome::Failed(err) => show_error(err),
//!     ExpandOutcome::Coalesced | ExpandOutcome::NotLoadable => {}
//! }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::Instrument;

use lattice_items_core::Signal;
use lattice_items_core::logging::{span_names, targets};

use super::bridge::canonical_value;
use super::item::CanonicalItem;
use crate::error::LoadError;

/// Fetches the children of an item.
///
/// The loader is expected to make the children available through its own
/// channel (typically by updating the records an
/// [`ItemsModel`](super::ItemsModel) is built from); the returned future only
/// signals completion.
pub trait ChildLoader: Send + Sync {
    /// Starts loading the children of `item`.
    fn load(&self, item: &CanonicalItem) -> BoxFuture<'static, Result<(), LoadError>>;
}

impl<F, Fut> ChildLoader for F
where
    F: Fn(&CanonicalItem) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), LoadError>> + Send + 'static,
{
    fn load(&self, item: &CanonicalItem) -> BoxFuture<'static, Result<(), LoadError>> {
        self(item).boxed()
    }
}

/// Loading state of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No load in flight.
    #[default]
    Idle,
    /// A load is in flight.
    Loading,
}

/// Result of [`ChildLoadCoordinator::expand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// No loader is configured, or the item does not await children.
    NotLoadable,
    /// A load for the same item is already in flight; nothing was started.
    Coalesced,
    /// The loader completed successfully.
    Loaded,
    /// The loader failed.
    Failed(LoadError),
}

/// Identity key of an item for load tracking: its value as compact JSON,
/// with whole-number floats written as integers.
pub fn load_key(value: &Value) -> String {
    canonical_value(value).to_string()
}

/// Coordinates lazy child loads for a tree of canonical items.
pub struct ChildLoadCoordinator {
    loader: Option<Arc<dyn ChildLoader>>,
    states: Mutex<HashMap<String, LoadState>>,
    /// Emitted when an item starts (`true`) or stops (`false`) loading.
    /// Args: (item value, loading)
    pub loading_changed: Signal<(Value, bool)>,
}

impl Default for ChildLoadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChildLoadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildLoadCoordinator")
            .field("has_loader", &self.loader.is_some())
            .field("loading", &self.loading_count())
            .finish()
    }
}

impl ChildLoadCoordinator {
    /// Creates a coordinator without a loader; every expansion is a no-op.
    pub fn new() -> Self {
        Self {
            loader: None,
            states: Mutex::new(HashMap::new()),
            loading_changed: Signal::new(),
        }
    }

    /// Creates a coordinator with the given loader.
    pub fn with_loader<L>(loader: L) -> Self
    where
        L: ChildLoader + 'static,
    {
        Self {
            loader: Some(Arc::new(loader)),
            ..Self::new()
        }
    }

    /// Returns `true` if a loader is configured.
    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    /// Returns the loading state of the item with the given value.
    pub fn state(&self, value: &Value) -> LoadState {
        self.states
            .lock()
            .get(&load_key(value))
            .copied()
            .unwrap_or_default()
    }

    /// Returns `true` if the item with the given value is loading.
    pub fn is_loading(&self, value: &Value) -> bool {
        self.state(value) == LoadState::Loading
    }

    /// Number of loads in flight.
    pub fn loading_count(&self) -> usize {
        self.states
            .lock()
            .values()
            .filter(|state| **state == LoadState::Loading)
            .count()
    }

    /// Handles a user-triggered expansion of `item`.
    ///
    /// Loads only when a loader is configured and the item has an empty child
    /// list. A second expansion of the same item while its load is in flight
    /// returns [`ExpandOutcome::Coalesced`] without calling the loader. The
    /// loading state is cleared once the loader settles, whatever the
    /// outcome, and also if the returned future is dropped early.
    pub async fn expand(&self, item: &CanonicalItem) -> ExpandOutcome {
        let Some(loader) = &self.loader else {
            return ExpandOutcome::NotLoadable;
        };
        if !item.awaits_children() {
            return ExpandOutcome::NotLoadable;
        }

        let key = load_key(&item.value);
        {
            let mut states = self.states.lock();
            if states.get(&key) == Some(&LoadState::Loading) {
                tracing::debug!(target: targets::LOADER, %key, "load already in flight, coalescing");
                return ExpandOutcome::Coalesced;
            }
            states.insert(key.clone(), LoadState::Loading);
        }

        let _guard = LoadingGuard {
            coordinator: self,
            key: key.clone(),
            value: item.value.clone(),
        };
        tracing::debug!(target: targets::LOADER, %key, title = %item.title, "loading children");
        self.loading_changed.emit((item.value.clone(), true));

        let span = tracing::debug_span!(target: targets::LOADER, span_names::LOAD_CHILDREN, %key);
        match loader.load(item).instrument(span).await {
            Ok(()) => {
                tracing::debug!(target: targets::LOADER, %key, "children loaded");
                ExpandOutcome::Loaded
            }
            Err(err) => {
                tracing::warn!(target: targets::LOADER, %key, error = %err, "child load failed");
                ExpandOutcome::Failed(err)
            }
        }
    }

    fn finish(&self, key: &str, value: Value) {
        self.states.lock().remove(key);
        self.loading_changed.emit((value, false));
    }
}

/// Clears an item's loading state when the load settles or is abandoned.
struct LoadingGuard<'a> {
    coordinator: &'a ChildLoadCoordinator,
    key: String,
    value: Value,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let value = std::mem::take(&mut self.value);
        self.coordinator.finish(&self.key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemConfig, normalize};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn lazy_item(value: &str) -> CanonicalItem {
        let config = ItemConfig::new().with_preserve_empty_children(true);
        normalize(&config, &json!({"title": value, "value": value, "children": []}))
    }

    /// A loader that blocks until released and counts its calls.
    fn gated_loader(gate: Arc<Notify>, calls: Arc<AtomicUsize>) -> ChildLoadCoordinator {
        ChildLoadCoordinator::with_loader(move |_item: &CanonicalItem| {
            calls.fetch_add(1, Ordering::SeqCst);
            let gate = gate.clone();
            async move {
                gate.notified().await;
                Ok::<(), LoadError>(())
            }
        })
    }

    #[tokio::test]
    async fn test_expand_without_loader() {
        let coordinator = ChildLoadCoordinator::new();
        assert!(!coordinator.has_loader());
        assert_eq!(coordinator.expand(&lazy_item("a")).await, ExpandOutcome::NotLoadable);
    }

    #[tokio::test]
    async fn test_expand_item_without_empty_children() {
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = gated_loader(Arc::new(Notify::new()), calls.clone());

        let leaf = normalize(&ItemConfig::new(), &json!({"title": "leaf"}));
        let parent = normalize(&ItemConfig::new(), &json!({"title": "p", "children": ["x"]}));

        assert_eq!(coordinator.expand(&leaf).await, ExpandOutcome::NotLoadable);
        assert_eq!(coordinator.expand(&parent).await, ExpandOutcome::NotLoadable);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expand_loads_and_clears() {
        let coordinator = ChildLoadCoordinator::with_loader(|_item: &CanonicalItem| async {
            Ok::<(), LoadError>(())
        });
        let events = Arc::new(Mutex::new(Vec::new()));

        let events_clone = events.clone();
        coordinator
            .loading_changed
            .connect(move |(value, loading)| events_clone.lock().push((value.clone(), *loading)));

        let item = lazy_item("a");
        assert_eq!(coordinator.expand(&item).await, ExpandOutcome::Loaded);
        assert!(!coordinator.is_loading(&item.value));
        assert_eq!(
            *events.lock(),
            vec![(json!("a"), true), (json!("a"), false)]
        );
    }

    #[tokio::test]
    async fn test_duplicate_expand_is_coalesced() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = gated_loader(gate.clone(), calls.clone());
        let item = lazy_item("a");

        let (first, second, ()) = tokio::join!(
            coordinator.expand(&item),
            coordinator.expand(&item),
            async {
                tokio::task::yield_now().await;
                assert!(coordinator.is_loading(&item.value));
                gate.notify_one();
            }
        );

        assert_eq!(first, ExpandOutcome::Loaded);
        assert_eq!(second, ExpandOutcome::Coalesced);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.state(&item.value), LoadState::Idle);
    }

    #[tokio::test]
    async fn test_items_load_independently() {
        let gate_a = Arc::new(Notify::new());
        let gate_b = Arc::new(Notify::new());
        let coordinator = ChildLoadCoordinator::with_loader({
            let gate_a = gate_a.clone();
            let gate_b = gate_b.clone();
            move |item: &CanonicalItem| {
                let gate = if item.value == json!("a") {
                    gate_a.clone()
                } else {
                    gate_b.clone()
                };
                async move {
                    gate.notified().await;
                    Ok::<(), LoadError>(())
                }
            }
        });
        let a = lazy_item("a");
        let b = lazy_item("b");

        let (outcome_a, outcome_b, ()) = tokio::join!(
            coordinator.expand(&a),
            coordinator.expand(&b),
            async {
                tokio::task::yield_now().await;
                assert_eq!(coordinator.loading_count(), 2);

                gate_b.notify_one();
                tokio::task::yield_now().await;
                tokio::task::yield_now().await;
                assert!(coordinator.is_loading(&a.value));
                assert!(!coordinator.is_loading(&b.value));

                gate_a.notify_one();
            }
        );

        assert_eq!(outcome_a, ExpandOutcome::Loaded);
        assert_eq!(outcome_b, ExpandOutcome::Loaded);
        assert_eq!(coordinator.loading_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_clears_state() {
        let coordinator = ChildLoadCoordinator::with_loader(|_item: &CanonicalItem| async {
            Err::<(), _>(LoadError::failed("offline"))
        });
        let item = lazy_item("a");

        assert_eq!(
            coordinator.expand(&item).await,
            ExpandOutcome::Failed(LoadError::failed("offline"))
        );
        assert!(!coordinator.is_loading(&item.value));

        // A later expansion starts a fresh load.
        assert!(matches!(coordinator.expand(&item).await, ExpandOutcome::Failed(_)));
    }

    #[test]
    fn test_dropped_expand_clears_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let coordinator = gated_loader(Arc::new(Notify::new()), calls.clone());
        let item = lazy_item("a");

        // Polled once: the load starts and stays pending, then the future is dropped.
        assert!(coordinator.expand(&item).now_or_never().is_none());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!coordinator.is_loading(&item.value));
    }

    #[test]
    fn test_load_key_is_structural() {
        let a: Value = serde_json::from_str(r#"{"b": 1, "a": 2}"#).unwrap();
        let b = json!({"a": 2, "b": 1});
        assert_eq!(load_key(&a), load_key(&b));
    }

    #[test]
    fn test_load_key_ignores_number_form() {
        assert_eq!(load_key(&json!(1)), load_key(&json!(1.0)));
        assert_eq!(load_key(&json!({"id": 2.0})), load_key(&json!({"id": 2})));
        assert_ne!(load_key(&json!(1)), load_key(&json!("1")));
    }

    #[test]
    fn test_panicking_slot_does_not_leave_item_loading() {
        use std::panic::{AssertUnwindSafe, catch_unwind};
        use std::sync::atomic::AtomicBool;

        let coordinator = ChildLoadCoordinator::with_loader(|_item: &CanonicalItem| async {
            Ok::<(), LoadError>(())
        });
        let armed = Arc::new(AtomicBool::new(true));
        let armed_clone = armed.clone();
        coordinator.loading_changed.connect(move |(_, loading)| {
            if *loading && armed_clone.swap(false, Ordering::SeqCst) {
                panic!("slot failure");
            }
        });

        let item = lazy_item("a");
        let result = catch_unwind(AssertUnwindSafe(|| coordinator.expand(&item).now_or_never()));
        assert!(result.is_err());
        assert!(!coordinator.is_loading(&item.value));

        assert_eq!(coordinator.expand(&item).now_or_never(), Some(ExpandOutcome::Loaded));
    }
}
