//! Core systems for Lattice Items.
//!
//! This crate provides the foundational pieces shared by the item engine:
//!
//! - **Signal/Slot System**: Type-safe change notification for models and
//!   loaders
//! - **Logging**: `tracing` targets and span names used across the workspace
//!
//! # Signal/Slot Example
//!
//! ```
//! use lattice_items_core::Signal;
//!
//! // Create a signal that notifies when the item count changes
//! let items_changed = Signal::<usize>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = items_changed.connect(|count| {
//!     println!("Now holding {} items", count);
//! });
//!
//! // Emit the signal
//! items_changed.emit(3);
//!
//! // Disconnect when done
//! items_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::{DebugTreeNode, ItemTreeDebug, PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
