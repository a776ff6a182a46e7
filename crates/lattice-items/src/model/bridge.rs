//! Mapping between externally held model values and canonical items.
//!
//! A selection control stores plain values (`"apple"`, `42`, a whole record
//! in `return_object` mode) while its list works with canonical items. The
//! functions here convert between the two against a set of *known* items.

use serde_json::{Number, Value};

use lattice_items_core::logging::{span_names, targets};

use super::config::ItemConfig;
use super::item::{CanonicalItem, normalize};

/// Converts external values into canonical items.
///
/// For each value, in order:
/// - `null` is dropped unless one of the known items has a `null` value;
/// - the first known item whose value is deep-equal to it is reused as is;
/// - otherwise a new item is normalized from the value itself (custom input
///   that is not part of the known set).
///
/// # Example
///
/// ```
/// use lattice_items::model::{import_values, normalize_batch, ItemConfig};
/// use serde_json::json;
///
/// let config = ItemConfig::new();
/// let known = normalize_batch(&config, &[json!({"title": "Apple", "value": {"id": 1}})]);
///
/// let items = import_values(&config, &known, &[json!({"id": 1}), json!("Custom"), json!(null)]);
/// assert_eq!(items.len(), 2);
/// assert_eq!(items[0].title, "Apple");
/// assert_eq!(items[1].title, "Custom");
/// ```
pub fn import_values(
    config: &ItemConfig,
    known: &[CanonicalItem],
    values: &[Value],
) -> Vec<CanonicalItem> {
    import_values_with(known, values, |value| normalize(config, value))
}

/// Like [`import_values`], with a caller-supplied conversion for values that
/// match no known item.
pub fn import_values_with<F>(known: &[CanonicalItem], values: &[Value], synthesize: F) -> Vec<CanonicalItem>
where
    F: Fn(&Value) -> CanonicalItem,
{
    let span = tracing::trace_span!(target: targets::BRIDGE, span_names::IMPORT_VALUES, values = values.len());
    let _entered = span.enter();

    let null_is_known = known.iter().any(|item| item.value.is_null());

    values
        .iter()
        .filter(|value| !value.is_null() || null_is_known)
        .map(|value| match known.iter().find(|item| values_equal(&item.value, value)) {
            Some(existing) => existing.clone(),
            None => {
                tracing::trace!(target: targets::BRIDGE, %value, "synthesizing item for unknown value");
                synthesize(value)
            }
        })
        .collect()
}

/// Converts canonical items back into external values, preserving order.
pub fn export_values(items: &[CanonicalItem]) -> Vec<Value> {
    items.iter().map(|item| item.value.clone()).collect()
}

/// Structural equality of two values.
///
/// Numbers compare by numeric value, so `1` equals `1.0`; arrays and objects
/// compare element by element.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if x.is_f64() || y.is_f64() {
        x.as_f64() == y.as_f64()
    } else {
        x == y
    }
}

/// Rewrites whole-number floats as integers, recursively.
///
/// Two values that are [`values_equal`] serialize to the same text once
/// canonicalized.
pub(crate) fn canonical_value(value: &Value) -> Value {
    match value {
        Value::Number(number) => Value::Number(canonical_number(number)),
        Value::Array(items) => Value::Array(items.iter().map(canonical_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), canonical_value(item)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn canonical_number(number: &Number) -> Number {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() <= MAX_SAFE_INTEGER => {
            Number::from(float as i64)
        }
        _ => number.clone(),
    }
}
