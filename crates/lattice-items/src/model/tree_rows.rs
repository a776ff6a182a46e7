//! Row projection for tree views.
//!
//! Where [`flatten`](super::flatten) produces a list-style render sequence,
//! [`tree_rows`] keeps the hierarchy information a tree view needs for each
//! row: depth, position among siblings, and the index path from the root.

use super::item::CanonicalItem;
use super::loader::ChildLoadCoordinator;

/// One row of a tree view.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow<'a> {
    /// The item shown on this row.
    pub item: &'a CanonicalItem,
    /// Nesting depth; root items have depth 0.
    pub depth: usize,
    /// Index among the item's siblings.
    pub index: usize,
    /// Sibling indices from the root down to this item.
    pub path: Vec<usize>,
    /// `true` for the first sibling.
    pub is_first: bool,
    /// `true` for the last sibling.
    pub is_last: bool,
    /// `true` if the item has a child list, even an empty one awaiting a load.
    pub is_group: bool,
    /// `true` while the item's children are being loaded.
    pub loading: bool,
}

/// Projects an item tree onto tree rows, depth-first in pre-order.
///
/// Every item produces a row; expansion state is left to the view. When a
/// coordinator is given, rows of items with a load in flight are marked
/// `loading`.
///
/// # Example
///
/// ```
/// use lattice_items::model::{normalize_batch, tree_rows, ItemConfig};
/// use serde_json::json;
///
/// let items = normalize_batch(&ItemConfig::new(), &[
///     json!({"title": "src", "children": ["lib.rs", "main.rs"]}),
///     json!("Cargo.toml"),
/// ]);
///
/// let rows = tree_rows(&items, None);
/// let paths: Vec<_> = rows.iter().map(|row| row.path.clone()).collect();
/// assert_eq!(paths, vec![vec![0], vec![0, 0], vec![0, 1], vec![1]]);
/// assert!(rows[2].is_last);
/// ```
pub fn tree_rows<'a>(
    items: &'a [CanonicalItem],
    loading: Option<&ChildLoadCoordinator>,
) -> Vec<TreeRow<'a>> {
    let mut rows = Vec::with_capacity(items.len());
    let mut path = Vec::new();
    collect_rows(items, loading, &mut path, &mut rows);
    rows
}

fn collect_rows<'a>(
    items: &'a [CanonicalItem],
    loading: Option<&ChildLoadCoordinator>,
    path: &mut Vec<usize>,
    rows: &mut Vec<TreeRow<'a>>,
) {
    let count = items.len();
    for (index, item) in items.iter().enumerate() {
        path.push(index);
        rows.push(TreeRow {
            item,
            depth: path.len() - 1,
            index,
            path: path.clone(),
            is_first: index == 0,
            is_last: index + 1 == count,
            is_group: item.children.is_some(),
            loading: loading.is_some_and(|coordinator| coordinator.is_loading(&item.value)),
        });
        collect_rows(item.children(), loading, path, rows);
        path.pop();
    }
}
