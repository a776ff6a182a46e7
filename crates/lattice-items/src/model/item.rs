//! Canonical items and the item normalizer.
//!
//! [`normalize`] turns one raw record into a [`CanonicalItem`] using an
//! [`ItemConfig`]; [`normalize_batch`] does the same for a whole collection,
//! recursing into children.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::{Map, Value};

use lattice_items_core::DebugTreeNode;
use lattice_items_core::logging::{span_names, targets};

use super::bridge::canonical_value;
use super::config::ItemConfig;

/// The normalized representation of one raw record.
///
/// Items are immutable value trees; equality is structural, so two items
/// built from deep-equal records under the same config compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalItem {
    /// Display title. Empty when the record has no usable title.
    pub title: String,
    /// The item's value (`null` when undefined).
    pub value: Value,
    /// Merged property bag: computed `title`/`value` overlaid by the
    /// record's extra properties.
    pub props: Map<String, Value>,
    /// Normalized children. `None` when the record has no child list.
    pub children: Option<Vec<CanonicalItem>>,
    /// The record this item was built from.
    pub raw: Arc<Value>,
}

impl CanonicalItem {
    /// Returns `true` if this item has at least one child.
    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|children| !children.is_empty())
    }

    /// Returns `true` if this item has a child list that is still empty.
    ///
    /// Such items are candidates for lazy child loading.
    pub fn awaits_children(&self) -> bool {
        self.children.as_ref().is_some_and(Vec::is_empty)
    }

    /// Returns the children as a slice (empty when absent).
    pub fn children(&self) -> &[CanonicalItem] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Looks up a property.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Returns `true` if the `divider` property is truthy.
    pub fn has_divider(&self) -> bool {
        self.prop("divider").is_some_and(is_truthy)
    }

    /// Number of items in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(Self::subtree_len).sum::<usize>()
    }
}

impl DebugTreeNode for CanonicalItem {
    fn debug_label(&self) -> String {
        self.title.clone()
    }

    fn debug_detail(&self) -> Option<String> {
        Some(self.value.to_string())
    }

    fn debug_children(&self) -> &[Self] {
        self.children()
    }
}

/// Normalizes one raw record into a canonical item.
///
/// 1. The title is resolved with the record itself as fallback.
/// 2. The value is the record (`return_object`) or resolved with the title
///    as fallback.
/// 3. Extra properties come from `item_props`; in auto mode (`Whole`) an
///    object record is used directly, minus its `children` key. Only object
///    results are merged.
/// 4. `props = {title, value, ..extra}`; extra keys win.
/// 5. Children are normalized recursively when they resolve to a non-empty
///    array (or to any array with `preserve_empty_children`).
///
/// # Example
///
/// ```
/// use lattice_items::model::{normalize, ItemConfig};
/// use serde_json::json;
///
/// let item = normalize(&ItemConfig::new(), &json!({"title": "Fruits", "value": 1}));
/// assert_eq!(item.title, "Fruits");
/// assert_eq!(item.value, json!(1));
/// assert!(item.children.is_none());
/// ```
pub fn normalize(config: &ItemConfig, record: &Value) -> CanonicalItem {
    let title = config.item_title.resolve(record, Some(record));
    let value = if config.return_object {
        Some(record.clone())
    } else {
        config
            .item_value
            .resolve(record, title.as_deref())
            .map(Cow::into_owned)
    };
    let children = config.item_children.resolve(record, None);

    let mut props = Map::new();
    if let Some(title) = title {
        props.insert("title".to_string(), title.into_owned());
    }
    if let Some(value) = value {
        props.insert("value".to_string(), value);
    }
    merge_item_props(config, record, &mut props);

    let children = match children.as_deref() {
        Some(Value::Array(records)) if !records.is_empty() || config.preserve_empty_children => {
            Some(normalize_all(config, records))
        }
        _ => None,
    };

    let item = CanonicalItem {
        title: display_string(props.get("title")),
        value: props.get("value").cloned().unwrap_or(Value::Null),
        props,
        children,
        raw: Arc::new(record.clone()),
    };

    tracing::trace!(
        target: targets::NORMALIZE,
        title = %item.title,
        children = item.children.as_ref().map(Vec::len),
        "normalized item"
    );

    item
}

/// Normalizes a collection of records, preserving order.
///
/// Produces exactly one item per record; no deduplication.
pub fn normalize_batch(config: &ItemConfig, records: &[Value]) -> Vec<CanonicalItem> {
    let span = tracing::debug_span!(
        target: targets::NORMALIZE,
        span_names::NORMALIZE,
        records = records.len()
    );
    let _entered = span.enter();

    let items = normalize_all(config, records);
    tracing::debug!(target: targets::NORMALIZE, count = items.len(), "normalized batch");
    items
}

fn normalize_all(config: &ItemConfig, records: &[Value]) -> Vec<CanonicalItem> {
    records.iter().map(|record| normalize(config, record)).collect()
}

fn merge_item_props(config: &ItemConfig, record: &Value, props: &mut Map<String, Value>) {
    if config.item_props.is_whole() {
        if let Value::Object(fields) = record {
            props.extend(
                fields
                    .iter()
                    .filter(|(key, _)| key.as_str() != "children")
                    .map(|(key, value)| (key.clone(), value.clone())),
            );
        }
        return;
    }

    if let Some(Value::Object(extra)) = config.item_props.resolve(record, None).as_deref() {
        props.extend(extra.iter().map(|(key, value)| (key.clone(), value.clone())));
    }
}

/// Converts a resolved field into display text.
///
/// Absent and `null` become the empty string, strings are used as is,
/// numbers and booleans use their textual form (`1.0` reads as `1`), arrays
/// and objects their compact JSON.
pub fn display_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => canonical_value(other).to_string(),
    }
}

/// Truthiness of a property value.
///
/// `null`, `false`, zero and the empty string are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
