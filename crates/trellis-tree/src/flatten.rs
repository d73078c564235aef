//! Tree flattener and node limiter.
//!
//! Turns a nested design tree into a depth-first, pre-order sequence of
//! [`RawNode`] records with explicit `parent_id` links, capped at a node budget.
//!
//! Traversal is driven by an explicit stack, so documents nested hundreds of
//! levels deep never touch the call stack. Subtrees are moved out of their
//! parents as they are visited; nothing is cloned.

use crate::raw::RawNode;

/// Result of flattening: the retained prefix plus advisory warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    /// Retained nodes in pre-order, at most `limit` entries.
    pub nodes: Vec<RawNode>,
    /// Number of nodes the full traversal visited.
    pub total: usize,
    pub warnings: Vec<String>,
}

impl Flattened {
    pub fn truncated(&self) -> bool {
        self.total > self.nodes.len()
    }
}

/// Depth-first flattener with a node budget.
///
/// ```
/// use trellis_tree::{Flattener, NodeType, RawNode};
///
/// let root = RawNode::new("1", "Page", NodeType::Frame)
///     .with_children(vec![RawNode::new("2", "Title", NodeType::Text)]);
/// let flat = Flattener::new(10).flatten(root);
/// assert_eq!(flat.nodes.len(), 2);
/// assert_eq!(flat.nodes[1].parent_id.as_deref(), Some("1"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Flattener {
    limit: usize,
    skip_hidden: bool,
}

impl Flattener {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            skip_hidden: false,
        }
    }

    /// Drop nodes with `visible: false` together with their subtrees.
    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Flatten a single nested tree.
    pub fn flatten(&self, root: RawNode) -> Flattened {
        self.flatten_all(vec![root])
    }

    /// Flatten a sequence of roots in order.
    ///
    /// Also accepts an already-flat sequence: nodes without nested children
    /// pass through unchanged, keeping whatever `parent_id` they declare.
    pub fn flatten_all(&self, roots: Vec<RawNode>) -> Flattened {
        // (node, inside a hidden subtree)
        let mut stack: Vec<(RawNode, bool)> = roots.into_iter().rev().map(|n| (n, false)).collect();
        let mut nodes = Vec::with_capacity(self.limit.min(stack.len().max(1) * 8));
        let mut total = 0;
        let mut hidden = 0;

        while let Some((mut node, in_hidden)) = stack.pop() {
            let dropped = in_hidden || (self.skip_hidden && !node.visible);
            let children = std::mem::take(&mut node.children);
            for mut child in children.into_iter().rev() {
                child.parent_id = Some(node.id.clone());
                stack.push((child, dropped));
            }

            if dropped {
                hidden += 1;
                continue;
            }

            total += 1;
            if nodes.len() < self.limit {
                nodes.push(node);
            }
        }

        let mut warnings = Vec::new();
        if hidden > 0 {
            tracing::debug!(hidden, "skipped hidden nodes");
        }
        if total > nodes.len() {
            let message = format!(
                "Design contains {total} nodes; processing only the first {}.",
                nodes.len()
            );
            tracing::warn!("{message}");
            warnings.push(message);
        }
        tracing::debug!(total, kept = nodes.len(), "flattened design tree");

        Flattened {
            nodes,
            total,
            warnings,
        }
    }
}
