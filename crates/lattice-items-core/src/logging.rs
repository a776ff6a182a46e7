//! Logging and debugging facilities for Lattice Items.
//!
//! This module provides:
//! - Target and span names for the `tracing` instrumentation used across
//!   the workspace
//! - Debug visualization for item trees
//! - A small performance span guard
//!
//! # Tracing Integration
//!
//! The library only emits events; it never installs a subscriber. To see
//! logs, install one in your application or test:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("lattice_items::normalize=trace")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! Any hierarchy implementing [`DebugTreeNode`] can be rendered with
//! [`ItemTreeDebug`]:
//!
//! ```ignore
//! use lattice_items_core::ItemTreeDebug;
//!
//! let debug = ItemTreeDebug::new();
//! println!("{}", debug.format_forest(&items));
//! ```

use std::fmt::Write as FmtWrite;

/// Span names used throughout Lattice Items for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Batch normalization span.
    pub const NORMALIZE: &str = "lattice_items::normalize";
    /// Model value import span.
    pub const IMPORT_VALUES: &str = "lattice_items::import_values";
    /// Tree flattening span.
    pub const FLATTEN: &str = "lattice_items::flatten";
    /// Lazy child load span.
    pub const LOAD_CHILDREN: &str = "lattice_items::load_children";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "lattice_items_core::signal";
    /// Item normalization target.
    pub const NORMALIZE: &str = "lattice_items::normalize";
    /// Model value bridge target.
    pub const BRIDGE: &str = "lattice_items::bridge";
    /// Tree flattener target.
    pub const FLATTEN: &str = "lattice_items::flatten";
    /// Lazy child loader target.
    pub const LOADER: &str = "lattice_items::loader";
    /// Configuration loading target.
    pub const CONFIG: &str = "lattice_items::config";
}

/// A node that can be rendered by [`ItemTreeDebug`].
pub trait DebugTreeNode {
    /// The text shown for this node.
    fn debug_label(&self) -> String;

    /// Optional annotation shown after the label (typically the node's value).
    fn debug_detail(&self) -> Option<String> {
        None
    }

    /// The node's children, if it has any.
    fn debug_children(&self) -> &[Self]
    where
        Self: Sized;
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node details (values).
    pub show_details: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_details: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_details: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing item trees.
#[derive(Debug, Clone, Default)]
pub struct ItemTreeDebug {
    options: TreeFormatOptions,
}

impl ItemTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format a list of root nodes.
    pub fn format_forest<N: DebugTreeNode>(&self, roots: &[N]) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Item Tree ({} roots):", roots.len());

        if roots.is_empty() {
            output.push_str("  (empty)\n");
        } else {
            let count = roots.len();
            for (i, root) in roots.iter().enumerate() {
                self.format_subtree_into(root, &mut Vec::new(), i + 1 == count, &mut output);
            }
        }

        output
    }

    /// Format a single subtree.
    pub fn format_subtree<N: DebugTreeNode>(&self, root: &N) -> String {
        let mut output = String::new();
        self.format_subtree_into(root, &mut Vec::new(), true, &mut output);
        output
    }

    /// `ancestors` holds, for each enclosing level, whether that node was the
    /// last of its siblings.
    fn format_subtree_into<N: DebugTreeNode>(
        &self,
        node: &N,
        ancestors: &mut Vec<bool>,
        is_last: bool,
        output: &mut String,
    ) {
        let depth = ancestors.len();
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        output.push_str(&self.build_prefix(ancestors, is_last));

        let label = node.debug_label();
        output.push_str(if label.is_empty() { "(untitled)" } else { &label });

        if self.options.show_details {
            if let Some(detail) = node.debug_detail() {
                let _ = write!(output, " [{detail}]");
            }
        }

        output.push('\n');

        let children = node.debug_children();
        let child_count = children.len();
        ancestors.push(is_last);
        for (i, child) in children.iter().enumerate() {
            self.format_subtree_into(child, ancestors, i + 1 == child_count, output);
        }
        ancestors.pop();
    }

    fn build_prefix(&self, ancestors: &[bool], is_last: bool) -> String {
        if ancestors.is_empty() {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "- ", "- "),
        };

        let mut prefix = String::new();
        // The root level has no connector column.
        for &ancestor_is_last in &ancestors[1..] {
            if ancestor_is_last {
                prefix.extend(std::iter::repeat_n(' ', branch.chars().count()));
            } else {
                prefix.push_str(branch);
            }
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "lattice_items::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
