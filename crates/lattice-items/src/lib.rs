//! Lattice Items - canonical items for list and tree views.
//!
//! This is the main crate: it normalizes arbitrary records into canonical
//! items, matches external model values against them, and flattens item
//! trees for rendering. Foundation types from `lattice-items-core` are
//! re-exported.
//!
//! # Example
//!
//! ```
//! use lattice_items::model::{ItemConfig, ItemsModel};
//! use serde_json::json;
//!
//! let model = ItemsModel::with_records(
//!     ItemConfig::new(),
//!     vec![json!("Apple"), json!({"title": "Pear", "value": 2})],
//! );
//! assert_eq!(model.len(), 2);
//! ```

pub mod error;
pub mod model;

pub use error::{ConfigError, LoadError};
pub use lattice_items_core::{
    ConnectionGuard, ConnectionId, DebugTreeNode, ItemTreeDebug, PerfSpan, Signal,
    TreeFormatOptions, TreeStyle, logging,
};
