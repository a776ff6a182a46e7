//! A live, recomputed collection of canonical items.
//!
//! `ItemsModel` owns the raw records and the field-mapping configuration a
//! list or tree view is driven by. Whenever either changes, the canonical
//! items are rebuilt and `items_changed` is emitted.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use lattice_items_core::{PerfSpan, Signal};
use lattice_items_core::logging::targets;

use super::bridge;
use super::config::ItemConfig;
use super::flatten::{FlatEntry, flatten};
use super::item::{CanonicalItem, normalize_batch};

/// Internal storage: inputs and the items derived from them.
struct ModelState {
    config: ItemConfig,
    records: Vec<Value>,
    items: Arc<[CanonicalItem]>,
}

impl ModelState {
    fn new(config: ItemConfig, records: Vec<Value>) -> Self {
        let items = normalize_batch(&config, &records).into();
        Self {
            config,
            records,
            items,
        }
    }

    fn recompute(&mut self) -> usize {
        let _perf = PerfSpan::new("recompute_items");
        self.items = normalize_batch(&self.config, &self.records).into();
        self.items.len()
    }
}

/// A collection of raw records exposed as canonical items.
///
/// # Example
///
/// ```
/// use lattice_items::model::{ItemConfig, ItemsModel};
/// use serde_json::json;
///
/// let model = ItemsModel::with_records(
///     ItemConfig::new(),
///     vec![json!({"title": "Apple", "value": 1}), json!({"title": "Pear", "value": 2})],
/// );
///
/// model.items_changed.connect(|count| println!("now {} items", count));
///
/// let selected = model.import_values(&[json!(2)]);
/// assert_eq!(selected[0].title, "Pear");
/// assert_eq!(ItemsModel::export_values(&selected), vec![json!(2)]);
/// ```
pub struct ItemsModel {
    state: RwLock<ModelState>,
    /// Emitted after the items were recomputed. Args: new top-level item count.
    pub items_changed: Signal<usize>,
}

impl Default for ItemsModel {
    fn default() -> Self {
        Self::new(ItemConfig::default())
    }
}

impl std::fmt::Debug for ItemsModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("ItemsModel")
            .field("config", &state.config)
            .field("records", &state.records.len())
            .field("items", &state.items.len())
            .finish()
    }
}

impl ItemsModel {
    /// Creates an empty model.
    pub fn new(config: ItemConfig) -> Self {
        Self::with_records(config, Vec::new())
    }

    /// Creates a model over the given records.
    pub fn with_records(config: ItemConfig, records: Vec<Value>) -> Self {
        Self {
            state: RwLock::new(ModelState::new(config, records)),
            items_changed: Signal::new(),
        }
    }

    /// Replaces all records and recomputes the items.
    pub fn set_records(&self, records: Vec<Value>) {
        let count = {
            let mut state = self.state.write();
            state.records = records;
            state.recompute()
        };
        tracing::debug!(target: targets::NORMALIZE, count, "records replaced");
        self.items_changed.emit(count);
    }

    /// Appends one record and recomputes the items.
    pub fn push_record(&self, record: Value) {
        let count = {
            let mut state = self.state.write();
            state.records.push(record);
            state.recompute()
        };
        self.items_changed.emit(count);
    }

    /// Applies `f` to the records in place and recomputes the items.
    ///
    /// Lazy loaders use this to splice fetched children into a record.
    pub fn update_records<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<Value>) -> R,
    {
        let (result, count) = {
            let mut state = self.state.write();
            let result = f(&mut state.records);
            (result, state.recompute())
        };
        self.items_changed.emit(count);
        result
    }

    /// Replaces the configuration and recomputes the items.
    pub fn set_config(&self, config: ItemConfig) {
        let count = {
            let mut state = self.state.write();
            state.config = config;
            state.recompute()
        };
        tracing::debug!(target: targets::NORMALIZE, count, "item config replaced");
        self.items_changed.emit(count);
    }

    /// Returns a copy of the current configuration.
    pub fn config(&self) -> ItemConfig {
        self.state.read().config.clone()
    }

    /// Returns a copy of the raw records.
    pub fn records(&self) -> Vec<Value> {
        self.state.read().records.clone()
    }

    /// Returns a snapshot of the current items.
    ///
    /// The snapshot stays valid after later updates; it just stops being current.
    pub fn items(&self) -> Arc<[CanonicalItem]> {
        self.state.read().items.clone()
    }

    /// Provides read access to the current items.
    pub fn with_items<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[CanonicalItem]) -> R,
    {
        f(&self.state.read().items)
    }

    /// Provides read access to the flattened render list.
    pub fn with_flattened<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[FlatEntry<'_>]) -> R,
    {
        let state = self.state.read();
        f(&flatten(&state.items))
    }

    /// Returns the number of top-level items.
    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    /// Returns `true` if there are no items.
    pub fn is_empty(&self) -> bool {
        self.state.read().items.is_empty()
    }

    /// Finds the first top-level item whose value equals `value`.
    pub fn find_by_value(&self, value: &Value) -> Option<CanonicalItem> {
        self.state
            .read()
            .items
            .iter()
            .find(|item| bridge::values_equal(&item.value, value))
            .cloned()
    }

    /// Converts external model values into items, matching against the
    /// current top-level items.
    pub fn import_values(&self, values: &[Value]) -> Vec<CanonicalItem> {
        let state = self.state.read();
        bridge::import_values(&state.config, &state.items, values)
    }

    /// Converts items back into external model values.
    pub fn export_values(items: &[CanonicalItem]) -> Vec<Value> {
        bridge::export_values(items)
    }
}
