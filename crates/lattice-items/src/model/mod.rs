//! Item normalization and tree flattening.
//!
//! This module turns heterogeneous input records into a canonical item
//! representation that list and tree views can render uniformly:
//!
//! - Records of any JSON shape (objects, primitives, nested arrays)
//! - A declarative field mapping ([`ItemConfig`] of [`FieldSelector`]s)
//! - Recursive child normalization
//! - Model-value round-tripping (external value to item and back)
//! - Flattening of nested trees into linear render lists
//!
//! # Core Types
//!
//! - `FieldSelector`: How one field is extracted from a record
//! - `ItemConfig`: The full field mapping
//! - `CanonicalItem`: The normalized item
//! - `FlatEntry`: One entry of a flattened render list
//! - `ItemsModel`: A live collection of records and their items
//! - `ChildLoadCoordinator`: Per-item lazy child loading
//!
//! # Example
//!
//! ```
//! use lattice_items::model::{flatten, normalize_batch, FlatEntry, ItemConfig};
//! use serde_json::json;
//!
//! let config = ItemConfig::new().with_item_title("name").with_item_value("id");
//! let items = normalize_batch(&config, &[
//!     json!({"name": "Fruits", "id": 1, "children": [{"name": "Apple", "id": 2}]}),
//!     json!({"name": "Bread", "id": 3}),
//! ]);
//!
//! for entry in flatten(&items) {
//!     match entry {
//!         FlatEntry::Subheader(item) => println!("== {} ==", item.title),
//!         FlatEntry::Item(item) => println!("  {}", item.title),
//!         FlatEntry::Divider => println!("  ----"),
//!     }
//! }
//! ```
//!
//! # Data Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌───────────────┐
//! │ Raw records │────>│  normalize  │────>│ CanonicalItem │
//! │ + ItemConfig│     │   (batch)   │     │     tree      │
//! └─────────────┘     └─────────────┘     └───────────────┘
//!                                            │         │
//!                            ┌───────────────┘         └──────────┐
//!                            v                                    v
//!                   ┌─────────────────┐                  ┌─────────────────┐
//!                   │ import/export   │                  │ flatten /       │
//!                   │ model values    │                  │ tree_rows       │
//!                   └─────────────────┘                  └─────────────────┘
//! ```

mod bridge;
mod config;
mod flatten;
mod item;
mod items_model;
mod loader;
mod selector;
mod tree_rows;

pub use bridge::{export_values, import_values, import_values_with, values_equal};
pub use config::{ItemConfig, ItemKind};
pub use flatten::{FlatEntry, flatten};
pub use item::{CanonicalItem, display_string, is_truthy, normalize, normalize_batch};
pub use items_model::ItemsModel;
pub use loader::{ChildLoadCoordinator, ChildLoader, ExpandOutcome, LoadState, load_key};
pub use selector::{FieldSelector, SelectorFn, resolve};
pub use tree_rows::{TreeRow, tree_rows};
