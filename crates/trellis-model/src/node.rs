//! Analyzed node arena.
//!
//! Nodes live in one `Vec` owned by [`DesignTree`]; parents own their children
//! through ordered index lists and children point back with a plain index.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use serde::Serialize;
use trellis_tree::{AxisAlign, Constraints, LayoutMode, NodeType, RawNode, Rect};

use crate::classify::WidgetKind;
use crate::layout::{Axis, Layout, Padding};
use crate::style::NodeStyle;

/// Index of a node inside its [`DesignTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// Auto-layout directives a container declared in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AutoLayoutHint {
    pub direction: Axis,
    pub spacing: f64,
    pub primary_align: Option<AxisAlign>,
    pub counter_align: Option<AxisAlign>,
    pub padding: Padding,
}

impl AutoLayoutHint {
    fn from_raw(raw: &RawNode) -> Option<Self> {
        let direction = match raw.layout_mode? {
            LayoutMode::Horizontal => Axis::Row,
            LayoutMode::Vertical => Axis::Column,
            LayoutMode::None | LayoutMode::Other => return None,
        };
        Some(Self {
            direction,
            spacing: raw.item_spacing,
            primary_align: raw.primary_axis_align_items,
            counter_align: raw.counter_axis_align_items,
            padding: Padding {
                top: raw.padding_top,
                right: raw.padding_right,
                bottom: raw.padding_bottom,
                left: raw.padding_left,
            },
        })
    }
}

/// A design node after analysis.
///
/// Identity and geometry are fixed at construction. `layout` and `widget`
/// start at their defaults and are filled in by the analyzer and classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedNode {
    pub id: String,
    /// Sanitized, sibling-unique identifier.
    pub name: String,
    pub raw_name: String,
    pub node_type: NodeType,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub bounds: Rect,
    pub style: NodeStyle,
    pub auto_layout: Option<AutoLayoutHint>,
    pub constraints: Option<Constraints>,
    pub layout: Layout,
    pub widget: WidgetKind,
    pub text: Option<String>,
    pub component_id: Option<String>,
}

impl AnalyzedNode {
    /// Build an unlinked node from its raw record.
    pub fn from_raw(raw: &RawNode) -> Self {
        let widget = if raw.node_type == NodeType::Text {
            WidgetKind::Text
        } else {
            WidgetKind::Container
        };
        let text = match raw.node_type {
            NodeType::Text => Some(raw.characters.clone().unwrap_or_default()),
            _ => None,
        };
        Self {
            id: raw.id.clone(),
            name: String::new(),
            raw_name: raw.name.clone(),
            node_type: raw.node_type.clone(),
            parent: None,
            children: Vec::new(),
            bounds: raw.bounds(),
            style: NodeStyle::from_raw(raw),
            auto_layout: AutoLayoutHint::from_raw(raw),
            constraints: raw.constraints.clone(),
            layout: Layout::Free,
            widget,
            text,
            component_id: raw.component_id.clone(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }
}

/// All analyzed nodes of one conversion request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DesignTree {
    nodes: Vec<AnalyzedNode>,
    roots: Vec<NodeId>,
    #[serde(skip)]
    index: HashMap<String, NodeId>,
}

impl DesignTree {
    pub(crate) fn from_parts(
        nodes: Vec<AnalyzedNode>,
        roots: Vec<NodeId>,
        index: HashMap<String, NodeId>,
    ) -> Self {
        Self {
            nodes,
            roots,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root nodes in source order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Look a node up by its source id.
    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    /// Node ids in construction (flattened sequence) order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn nodes(&self) -> &[AnalyzedNode] {
        &self.nodes
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &AnalyzedNode> {
        self.nodes[id.0].children.iter().map(|c| &self.nodes[c.0])
    }

    /// Depth-first pre-order walk from the roots, yielding `(id, depth)`.
    pub fn walk(&self) -> Vec<(NodeId, usize)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, usize)> = self.roots.iter().rev().map(|r| (*r, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            order.push((id, depth));
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        order
    }

    /// Nodes ordered so every child comes before its parent.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = self.walk().into_iter().map(|(id, _)| id).collect();
        order.reverse();
        order
    }
}

impl Index<NodeId> for DesignTree {
    type Output = AnalyzedNode;

    fn index(&self, id: NodeId) -> &AnalyzedNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for DesignTree {
    fn index_mut(&mut self, id: NodeId) -> &mut AnalyzedNode {
        &mut self.nodes[id.0]
    }
}
