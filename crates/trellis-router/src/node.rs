//! Radix tree node implementation.
//!
//! This module provides the core radix tree (compressed trie) data structure
//! used for efficient path matching.

use crate::method_table::MethodTable;
use crate::params::Params;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g., "users", "api")
    Static,
    /// Named parameter (e.g., ":id", ":userId")
    Param(String),
}

/// A node in the radix tree.
///
/// Each node represents a path segment and may have children for
/// sub-paths. Nodes at route boundaries carry a [`MethodTable`] mapping
/// HTTP methods to route identifiers.
#[derive(Debug, Clone)]
pub struct Node {
    /// The path segment this node represents
    pub segment: String,

    /// The kind of segment (static or param)
    pub kind: SegmentKind,

    /// Method table for this node (if it's a route endpoint)
    pub methods: Option<MethodTable>,

    /// Static children, sorted by segment for binary search
    pub static_children: Vec<Node>,

    /// Parameter child (at most one per node)
    pub param_child: Option<Box<Node>>,
}

impl Node {
    /// Creates a new static node.
    #[must_use]
    pub fn new_static(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            kind: SegmentKind::Static,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
        }
    }

    /// Creates a new parameter node.
    #[must_use]
    pub fn new_param(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            segment: format!(":{name}"),
            kind: SegmentKind::Param(name),
            methods: None,
            static_children: Vec::new(),
            param_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new_static("")
    }

    /// Walks (creating as needed) to the node for a path pattern and
    /// returns its method table.
    ///
    /// # Arguments
    ///
    /// * `path` - The path pattern (e.g., "/users/:id")
    pub fn entry(&mut self, path: &str) -> &mut MethodTable {
        let segments = Self::parse_path(path);
        self.entry_segments(&segments)
    }

    /// Parses a path into segments.
    fn parse_path(path: &str) -> Vec<(String, SegmentKind)> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if let Some(name) = s.strip_prefix(':') {
                    (s.to_string(), SegmentKind::Param(name.to_string()))
                } else {
                    (s.to_string(), SegmentKind::Static)
                }
            })
            .collect()
    }

    /// Walks segments recursively, creating missing nodes.
    fn entry_segments(&mut self, segments: &[(String, SegmentKind)]) -> &mut MethodTable {
        if segments.is_empty() {
            return self.methods.get_or_insert_with(MethodTable::new);
        }

        let (segment, kind) = &segments[0];
        let remaining = &segments[1..];

        match kind {
            SegmentKind::Static => {
                // Create the static child if absent, keeping children sorted
                // for binary search
                if !self.static_children.iter().any(|c| c.segment == *segment) {
                    self.static_children.push(Node::new_static(segment));
                    self.static_children
                        .sort_by(|a, b| a.segment.cmp(&b.segment));
                }
                let idx = self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                    .unwrap_or_else(|i| i);
                self.static_children[idx].entry_segments(remaining)
            }
            SegmentKind::Param(name) => {
                self.param_child
                    .get_or_insert_with(|| Box::new(Node::new_param(name.clone())))
                    .entry_segments(remaining)
            }
        }
    }

    /// Matches a path against the tree.
    ///
    /// Returns the method table and extracted parameters if found.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodTable, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        self.match_segments(&segments, &mut params)
    }

    /// Matches segments against the tree recursively.
    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<(&'a MethodTable, Params)> {
        if segments.is_empty() {
            return self.methods.as_ref().map(|m| (m, params.clone()));
        }

        let segment = segments[0];
        let remaining = &segments[1..];

        // Try static match first (highest priority)
        if let Some(child) = self.find_static_child(segment) {
            if let Some(result) = child.match_segments(remaining, params) {
                return Some(result);
            }
        }

        // Try parameter match
        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                params.push(name.clone(), segment.to_string());
                if let Some(result) = child.match_segments(remaining, params) {
                    return Some(result);
                }
                // Backtrack before siblings at shallower depth are tried
                params.pop();
            }
        }

        None
    }

    /// Finds a static child by segment using binary search.
    fn find_static_child(&self, segment: &str) -> Option<&Node> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}
