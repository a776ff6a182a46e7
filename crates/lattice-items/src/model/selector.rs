//! Field selectors and record field resolution.
//!
//! A [`FieldSelector`] describes how one field (title, value, children, ...)
//! is pulled out of a raw record. Resolution never fails: anything that
//! cannot be found degrades to the caller-supplied fallback.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Type alias for a selector function.
///
/// Called with `(record, fallback)`; the result is used verbatim.
pub type SelectorFn = Arc<dyn Fn(&Value, Option<&Value>) -> Option<Value> + Send + Sync>;

/// Describes how to extract a field from a raw record.
///
/// # Example
///
/// ```
/// use lattice_items::model::FieldSelector;
/// use serde_json::json;
///
/// let record = json!({"user": {"name": "Ada", "tags": ["admin"]}});
///
/// let name = FieldSelector::from("user.name");
/// assert_eq!(name.resolve(&record, None).as_deref(), Some(&json!("Ada")));
///
/// let tag = FieldSelector::from(vec!["user", "tags", "0"]);
/// assert_eq!(tag.resolve(&record, None).as_deref(), Some(&json!("admin")));
///
/// let missing = FieldSelector::from("user.email");
/// let fallback = json!("n/a");
/// assert_eq!(missing.resolve(&record, Some(&fallback)).as_deref(), Some(&fallback));
/// ```
#[derive(Clone, Default)]
pub enum FieldSelector {
    /// Extraction is switched off; always yields the fallback.
    #[default]
    Disabled,
    /// Selects the whole record.
    Whole,
    /// A key name. If the record has no such literal key, the key is read as
    /// a path using dot notation and bracket indices (`"rows[0].label"`).
    Key(String),
    /// An explicit sequence of key names. Numeric segments index arrays.
    Path(Vec<String>),
    /// A function of `(record, fallback)`.
    Func(SelectorFn),
}

impl FieldSelector {
    /// Creates a key selector.
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Creates a path selector from its segments.
    pub fn path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Path(segments.into_iter().map(Into::into).collect())
    }

    /// Creates a function selector.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Value, Option<&Value>) -> Option<Value> + Send + Sync + 'static,
    {
        Self::Func(Arc::new(f))
    }

    /// Returns `true` for the `Disabled` selector.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Returns `true` for the `Whole` selector.
    pub fn is_whole(&self) -> bool {
        matches!(self, Self::Whole)
    }

    /// Resolves this selector against `record`.
    ///
    /// `None` means the field is undefined. Borrowed results point into
    /// `record` (or at `fallback`); function selectors produce owned values.
    pub fn resolve<'a>(
        &self,
        record: &'a Value,
        fallback: Option<&'a Value>,
    ) -> Option<Cow<'a, Value>> {
        resolve(record, self, fallback)
    }
}

/// Resolves `selector` against `record`, degrading to `fallback`.
///
/// - `Func` is invoked with `(record, fallback)` and its result returned as is.
/// - `Key`/`Path` walk the record; a missing key, a `null` or scalar
///   intermediate, or an out-of-range index yields `fallback`. A key that is
///   present with a `null` value yields `null`.
/// - `Disabled` yields `fallback`; `Whole` yields the record.
pub fn resolve<'a>(
    record: &'a Value,
    selector: &FieldSelector,
    fallback: Option<&'a Value>,
) -> Option<Cow<'a, Value>> {
    let borrowed_fallback = || fallback.map(Cow::Borrowed);

    match selector {
        FieldSelector::Disabled => borrowed_fallback(),
        FieldSelector::Whole => Some(Cow::Borrowed(record)),
        FieldSelector::Func(f) => f(record, fallback).map(Cow::Owned),
        _ if !is_container(record) => borrowed_fallback(),
        FieldSelector::Key(key) => {
            if key.is_empty() {
                return borrowed_fallback();
            }
            if let Some(direct) = record.as_object().and_then(|obj| obj.get(key)) {
                return Some(Cow::Borrowed(direct));
            }
            let parts = parse_path(key);
            nested_value(record, &parts)
                .map(Cow::Borrowed)
                .or_else(borrowed_fallback)
        }
        FieldSelector::Path(segments) => {
            let parts: Vec<&str> = segments.iter().map(String::as_str).collect();
            nested_value(record, &parts)
                .map(Cow::Borrowed)
                .or_else(borrowed_fallback)
        }
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Walks `parts` from `record`. An empty path selects the record itself.
fn nested_value<'a>(record: &'a Value, parts: &[&str]) -> Option<&'a Value> {
    let mut current = record;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(*part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Splits a path string into segments.
///
/// Supports dot notation for keys and bracket notation for indices.
/// Examples: `"foo.bar"`, `"users[0].name"`, `"data[0][1].value"`.
fn parse_path(path: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut current_key_start = 0;

    for (i, c) in path.char_indices() {
        match c {
            '.' | '[' | ']' => {
                if i > current_key_start {
                    parts.push(&path[current_key_start..i]);
                }
                current_key_start = i + 1;
            }
            _ => {}
        }
    }

    if current_key_start < path.len() {
        parts.push(&path[current_key_start..]);
    }

    parts
}

impl fmt::Debug for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Whole => f.write_str("Whole"),
            Self::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Self::Path(segments) => f.debug_tuple("Path").field(segments).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl From<&str> for FieldSelector {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for FieldSelector {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<Vec<&str>> for FieldSelector {
    fn from(segments: Vec<&str>) -> Self {
        Self::path(segments)
    }
}

impl From<Vec<String>> for FieldSelector {
    fn from(segments: Vec<String>) -> Self {
        Self::Path(segments)
    }
}

impl From<bool> for FieldSelector {
    /// `true` selects the whole record, `false` disables the field.
    fn from(enabled: bool) -> Self {
        if enabled { Self::Whole } else { Self::Disabled }
    }
}

/// Config-file representation of a selector (functions cannot be written down).
#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorRepr {
    Flag(bool),
    Key(String),
    Path(Vec<String>),
}

impl<'de> Deserialize<'de> for FieldSelector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match SelectorRepr::deserialize(deserializer)? {
            SelectorRepr::Flag(flag) => Self::from(flag),
            SelectorRepr::Key(key) => Self::Key(key),
            SelectorRepr::Path(segments) => Self::Path(segments),
        })
    }
}
