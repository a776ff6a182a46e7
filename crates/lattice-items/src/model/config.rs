//! Field-mapping configuration for item normalization.

use serde::Deserialize;
use serde_json::Value;

use lattice_items_core::logging::targets;

use super::selector::FieldSelector;
use crate::error::ConfigError;

/// How raw records map onto canonical items.
///
/// Defaults match the conventional record shape
/// `{"title": .., "value": .., "children": [..], "props": {..}, "type": ..}`.
///
/// # Example
///
/// ```
/// use lattice_items::model::{FieldSelector, ItemConfig};
///
/// let config = ItemConfig::new()
///     .with_item_title("name")
///     .with_item_value(vec!["meta", "id"])
///     .with_item_children(false);
///
/// assert!(config.item_children.is_disabled());
/// ```
///
/// Configurations can also be read from JSON or TOML; function selectors
/// are only available programmatically.
///
/// ```
/// use lattice_items::model::ItemConfig;
///
/// let config = ItemConfig::from_toml_str(r#"
/// item_title = "name"
/// item_value = ["meta", "id"]
/// item_props = true
/// return_object = true
/// "#).unwrap();
///
/// assert!(config.return_object);
/// assert!(config.item_props.is_whole());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    /// Selector for the item title.
    pub item_title: FieldSelector,
    /// Selector for the item value.
    pub item_value: FieldSelector,
    /// Selector for the child records.
    pub item_children: FieldSelector,
    /// Selector for extra item properties. `Whole` enables auto mode: the
    /// record itself (minus `children`) becomes the property bag.
    pub item_props: FieldSelector,
    /// Selector for the item type (`item`, `divider`, `subheader`, ...).
    pub item_type: FieldSelector,
    /// When set, an item's value is the raw record itself.
    pub return_object: bool,
    /// When set, a children field resolving to an empty array produces an
    /// empty (not absent) child list. Lazily loaded trees rely on this to
    /// mark items whose children have not been fetched yet.
    pub preserve_empty_children: bool,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            item_title: FieldSelector::key("title"),
            item_value: FieldSelector::key("value"),
            item_children: FieldSelector::key("children"),
            item_props: FieldSelector::key("props"),
            item_type: FieldSelector::key("type"),
            return_object: false,
            preserve_empty_children: false,
        }
    }
}

impl ItemConfig {
    /// Creates a configuration with the default field names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON text. Missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str(text)?;
        tracing::debug!(target: targets::CONFIG, ?config, "loaded item config from json");
        Ok(config)
    }

    /// Parses a configuration from TOML text. Missing fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(text)?;
        tracing::debug!(target: targets::CONFIG, ?config, "loaded item config from toml");
        Ok(config)
    }

    /// Sets the title selector.
    pub fn with_item_title(mut self, selector: impl Into<FieldSelector>) -> Self {
        self.item_title = selector.into();
        self
    }

    /// Sets the value selector.
    pub fn with_item_value(mut self, selector: impl Into<FieldSelector>) -> Self {
        self.item_value = selector.into();
        self
    }

    /// Sets the children selector.
    pub fn with_item_children(mut self, selector: impl Into<FieldSelector>) -> Self {
        self.item_children = selector.into();
        self
    }

    /// Sets the props selector.
    pub fn with_item_props(mut self, selector: impl Into<FieldSelector>) -> Self {
        self.item_props = selector.into();
        self
    }

    /// Sets the type selector.
    pub fn with_item_type(mut self, selector: impl Into<FieldSelector>) -> Self {
        self.item_type = selector.into();
        self
    }

    /// Sets whether values are the raw records themselves.
    pub fn with_return_object(mut self, return_object: bool) -> Self {
        self.return_object = return_object;
        self
    }

    /// Sets whether empty child arrays are kept as empty child lists.
    pub fn with_preserve_empty_children(mut self, preserve: bool) -> Self {
        self.preserve_empty_children = preserve;
        self
    }

    /// Classifies a raw record using the type selector.
    ///
    /// Records without a resolvable string type are plain items.
    pub fn item_kind(&self, record: &Value) -> ItemKind {
        let fallback = Value::String("item".to_string());
        match self.item_type.resolve(record, Some(&fallback)).as_deref() {
            Some(Value::String(kind)) => ItemKind::from(kind.as_str()),
            _ => ItemKind::Item,
        }
    }
}

/// The kind of row a raw record describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ItemKind {
    /// A regular selectable item.
    #[default]
    Item,
    /// A separator line.
    Divider,
    /// A non-selectable section header.
    Subheader,
    /// Any other application-defined type.
    Other(String),
}

impl From<&str> for ItemKind {
    fn from(kind: &str) -> Self {
        match kind {
            "item" => Self::Item,
            "divider" => Self::Divider,
            "subheader" => Self::Subheader,
            other => Self::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = ItemConfig::default();
        assert!(matches!(config.item_title, FieldSelector::Key(ref k) if k == "title"));
        assert!(matches!(config.item_value, FieldSelector::Key(ref k) if k == "value"));
        assert!(matches!(config.item_children, FieldSelector::Key(ref k) if k == "children"));
        assert!(matches!(config.item_props, FieldSelector::Key(ref k) if k == "props"));
        assert!(matches!(config.item_type, FieldSelector::Key(ref k) if k == "type"));
        assert!(!config.return_object);
        assert!(!config.preserve_empty_children);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ItemConfig::from_json_str(
            r#"{"item_title": ["label", "text"], "item_children": false}"#,
        )
        .unwrap();

        assert!(matches!(config.item_title, FieldSelector::Path(ref p) if p == &["label", "text"]));
        assert!(config.item_children.is_disabled());
        assert!(matches!(config.item_value, FieldSelector::Key(ref k) if k == "value"));
    }

    #[test]
    fn test_from_toml() {
        let config = ItemConfig::from_toml_str(
            r#"
            item_value = "id"
            preserve_empty_children = true
            "#,
        )
        .unwrap();

        assert!(matches!(config.item_value, FieldSelector::Key(ref k) if k == "id"));
        assert!(config.preserve_empty_children);
    }

    #[test]
    fn test_invalid_config_text() {
        assert!(matches!(
            ItemConfig::from_json_str("{not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            ItemConfig::from_toml_str("item_title = 5"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_item_kind() {
        let config = ItemConfig::new();
        assert_eq!(config.item_kind(&json!({"title": "a"})), ItemKind::Item);
        assert_eq!(config.item_kind(&json!({"type": "divider"})), ItemKind::Divider);
        assert_eq!(config.item_kind(&json!({"type": "subheader"})), ItemKind::Subheader);
        assert_eq!(
            config.item_kind(&json!({"type": "group"})),
            ItemKind::Other("group".to_string())
        );
        assert_eq!(config.item_kind(&json!("plain")), ItemKind::Item);

        let disabled = ItemConfig::new().with_item_type(false);
        assert_eq!(disabled.item_kind(&json!({"type": "divider"})), ItemKind::Item);
    }
}
