//! Trellis Model
//!
//! Builds the analyzed node tree from a flattened raw sequence and enriches
//! it in place: layout inference first, widget classification second. Also
//! hosts the strategy selector and every tunable heuristic.
//!
//! ```text
//! [RawNode] → TreeBuilder → DesignTree → LayoutAnalyzer → Classifier → DesignTree
//! ```

pub mod builder;
pub mod classify;
pub mod config;
pub mod layout;
pub mod name;
pub mod node;
pub mod strategy;
pub mod style;

pub use builder::{Built, TreeBuilder};
pub use classify::{Classifier, WidgetKind};
pub use config::AnalysisConfig;
pub use layout::{
    Align, ArrangementKind, Axis, FlowLayout, GridLayout, Justify, Layout, LayoutAnalyzer, Padding,
};
pub use node::{AnalyzedNode, AutoLayoutHint, DesignTree, NodeId};
pub use strategy::{prefers_structural, select_strategy, Strategy, StrategySignals};
pub use style::{format_number, Color, NodeStyle, Radius, Shadow, Stroke, TextAlign, TextStyle};

use trellis_tree::RawNode;

/// The node sequence cannot form a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("Structure error: duplicate node id '{id}'")]
    DuplicateId { id: String },
    #[error("Structure error: node at position {position} has an empty id")]
    EmptyId { position: usize },
    #[error("Structure error: node '{id}' declares itself as its parent")]
    SelfParent { id: String },
    #[error("Structure error: node '{id}' is part of a parent cycle")]
    Cycle { id: String },
}

/// Build, lay out and classify a flattened node sequence.
pub fn analyze(nodes: &[RawNode], config: &AnalysisConfig) -> Result<Built, StructureError> {
    let mut built = TreeBuilder::build(nodes)?;
    LayoutAnalyzer::new(config).analyze(&mut built.tree);
    Classifier::new(config).classify_all(&mut built.tree);
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_analyze_login_form() {
        let nodes: Vec<RawNode> = serde_json::from_value(json!([
            { "id": "1", "name": "Login", "type": "FRAME",
              "absoluteBoundingBox": { "x": 0, "y": 0, "width": 360, "height": 240 } },
            { "id": "2", "name": "Title", "type": "TEXT", "parent_id": "1", "characters": "Sign in",
              "absoluteBoundingBox": { "x": 20, "y": 20, "width": 320, "height": 36 },
              "style": { "fontSize": 28, "fontWeight": 700 } },
            { "id": "3", "name": "Email Input", "type": "FRAME", "parent_id": "1",
              "absoluteBoundingBox": { "x": 20, "y": 80, "width": 320, "height": 48 } },
            { "id": "4", "name": "Submit Button", "type": "FRAME", "parent_id": "1",
              "absoluteBoundingBox": { "x": 20, "y": 160, "width": 320, "height": 48 } }
        ]))
        .unwrap();

        let tree = analyze(&nodes, &AnalysisConfig::default()).unwrap().tree;
        let root = tree.roots()[0];
        assert_eq!(tree[root].layout.kind(), ArrangementKind::FlowColumn);
        let widgets: Vec<WidgetKind> = tree.children(root).map(|c| c.widget).collect();
        assert_eq!(
            widgets,
            vec![WidgetKind::Heading1, WidgetKind::FormField, WidgetKind::Button]
        );
    }

    #[test]
    fn test_analyze_rejects_duplicates() {
        let nodes = vec![
            RawNode::new("1", "A", trellis_tree::NodeType::Frame),
            RawNode::new("1", "B", trellis_tree::NodeType::Frame),
        ];
        let err = analyze(&nodes, &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Structure error: duplicate node id '1'");
    }
}
