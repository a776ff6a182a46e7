//! Flattening of canonical item trees into linear render lists.

use lattice_items_core::logging::{span_names, targets};

use super::item::CanonicalItem;

/// One entry of a flattened item tree.
///
/// Entries borrow the items they point at and are meant to be consumed
/// straight away by a list renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlatEntry<'a> {
    /// A separator after the preceding entry (and its subtree).
    Divider,
    /// A leaf item.
    Item(&'a CanonicalItem),
    /// An item with children, rendered as a section header.
    Subheader(&'a CanonicalItem),
}

impl<'a> FlatEntry<'a> {
    /// Returns the item this entry refers to, if any.
    pub fn item(&self) -> Option<&'a CanonicalItem> {
        match self {
            Self::Divider => None,
            Self::Item(item) | Self::Subheader(item) => Some(item),
        }
    }

    /// Returns `true` for divider entries.
    pub fn is_divider(&self) -> bool {
        matches!(self, Self::Divider)
    }

    /// Returns `true` for subheader entries.
    pub fn is_subheader(&self) -> bool {
        matches!(self, Self::Subheader(_))
    }
}

/// Flattens an item tree depth-first, in pre-order.
///
/// Items with children become a [`FlatEntry::Subheader`] followed by their
/// flattened subtree; other items become [`FlatEntry::Item`]. An item whose
/// `divider` property is truthy is followed by a [`FlatEntry::Divider`],
/// emitted after its whole subtree.
///
/// # Example
///
/// ```
/// use lattice_items::model::{flatten, normalize_batch, FlatEntry, ItemConfig};
/// use serde_json::json;
///
/// let items = normalize_batch(&ItemConfig::new(), &[json!({
///     "title": "Fruits",
///     "children": [{"title": "Apple"}, {"title": "Pear"}],
///     "props": {"divider": true}
/// })]);
///
/// let entries = flatten(&items);
/// assert_eq!(entries.len(), 4);
/// assert!(entries[0].is_subheader());
/// assert_eq!(entries[3], FlatEntry::Divider);
/// ```
pub fn flatten(items: &[CanonicalItem]) -> Vec<FlatEntry<'_>> {
    let span = tracing::trace_span!(target: targets::FLATTEN, span_names::FLATTEN, roots = items.len());
    let _entered = span.enter();

    let mut entries = Vec::with_capacity(items.len());
    flatten_into(items, &mut entries);
    tracing::trace!(target: targets::FLATTEN, roots = items.len(), entries = entries.len(), "flattened items");
    entries
}

fn flatten_into<'a>(items: &'a [CanonicalItem], entries: &mut Vec<FlatEntry<'a>>) {
    for item in items {
        if item.has_children() {
            entries.push(FlatEntry::Subheader(item));
            flatten_into(item.children(), entries);
        } else {
            entries.push(FlatEntry::Item(item));
        }

        if item.has_divider() {
            entries.push(FlatEntry::Divider);
        }
    }
}
