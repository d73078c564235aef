//! Node model builder.
//!
//! Turns the flattened raw sequence into a linked [`DesignTree`] in three
//! passes: instantiate every node, link children to parents in sequence order,
//! then assign sibling-unique names.

use std::collections::HashMap;

use trellis_tree::RawNode;

use crate::name::NameScope;
use crate::node::{AnalyzedNode, DesignTree, NodeId};
use crate::StructureError;

/// A linked tree plus advisory warnings raised while linking.
#[derive(Debug, Clone)]
pub struct Built {
    pub tree: DesignTree,
    pub warnings: Vec<String>,
}

pub struct TreeBuilder;

impl TreeBuilder {
    /// Build the analyzed tree from a flattened node sequence.
    ///
    /// Nodes whose declared parent is not part of the sequence become roots,
    /// with a warning. Duplicate or empty ids, self-parenting and parent
    /// cycles are rejected.
    pub fn build(raw: &[RawNode]) -> Result<Built, StructureError> {
        let mut nodes = Vec::with_capacity(raw.len());
        let mut index: HashMap<String, NodeId> = HashMap::with_capacity(raw.len());

        for (position, record) in raw.iter().enumerate() {
            if record.id.is_empty() {
                return Err(StructureError::EmptyId { position });
            }
            let id = NodeId(position);
            if index.insert(record.id.clone(), id).is_some() {
                return Err(StructureError::DuplicateId {
                    id: record.id.clone(),
                });
            }
            nodes.push(AnalyzedNode::from_raw(record));
        }

        let mut roots = Vec::new();
        let mut warnings = Vec::new();
        for (position, record) in raw.iter().enumerate() {
            let id = NodeId(position);
            let Some(parent_id) = record.parent_id.as_deref() else {
                roots.push(id);
                continue;
            };
            if parent_id == record.id {
                return Err(StructureError::SelfParent {
                    id: record.id.clone(),
                });
            }
            match index.get(parent_id) {
                Some(&parent) => {
                    nodes[parent.0].children.push(id);
                    nodes[position].parent = Some(parent);
                }
                None => {
                    let message = format!(
                        "Node '{}' references missing parent '{parent_id}'; treating it as a root.",
                        record.id
                    );
                    tracing::warn!("{message}");
                    warnings.push(message);
                    roots.push(id);
                }
            }
        }

        let mut tree = DesignTree::from_parts(nodes, roots, index);
        check_reachable(&tree)?;
        assign_names(&mut tree);

        tracing::debug!(
            nodes = tree.len(),
            roots = tree.roots().len(),
            "built design tree"
        );
        Ok(Built { tree, warnings })
    }
}

/// Every node must hang off a root; anything left over sits on a parent cycle.
fn check_reachable(tree: &DesignTree) -> Result<(), StructureError> {
    let walked = tree.walk();
    if walked.len() == tree.len() {
        return Ok(());
    }
    let mut seen = vec![false; tree.len()];
    for (id, _) in walked {
        seen[id.0] = true;
    }
    let first = seen.iter().position(|s| !s).unwrap_or(0);
    Err(StructureError::Cycle {
        id: tree[NodeId(first)].id.clone(),
    })
}

fn assign_names(tree: &mut DesignTree) {
    let groups: Vec<Vec<NodeId>> = std::iter::once(tree.roots().to_vec())
        .chain(tree.ids().map(|id| tree[id].children.clone()))
        .collect();

    for group in groups {
        let mut scope = NameScope::new();
        for id in group {
            let name = scope.claim(&tree[id].raw_name);
            tree[id].name = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trellis_tree::{Flattener, NodeType};

    fn node(id: &str, name: &str) -> RawNode {
        RawNode::new(id, name, NodeType::Frame)
    }

    // =========================================================================
    // Linking
    // =========================================================================

    #[test]
    fn test_links_in_sequence_order() {
        let built = TreeBuilder::build(&[
            node("1", "Root"),
            node("2", "A").with_parent("1"),
            node("3", "B").with_parent("1"),
            node("4", "A1").with_parent("2"),
        ])
        .unwrap();
        let tree = &built.tree;
        let root = tree.find("1").unwrap();
        let ids: Vec<&str> = tree.children(root).map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(tree.roots(), &[root]);
        assert_eq!(tree[tree.find("4").unwrap()].parent, tree.find("2"));
        assert!(built.warnings.is_empty());
    }

    #[test]
    fn test_child_counts_match_parent_declarations() {
        let root = node("r", "Root").with_children(vec![
            node("a", "A").with_children(vec![node("a1", "x"), node("a2", "y")]),
            node("b", "B"),
            node("c", "C").with_children(vec![node("c1", "z")]),
        ]);
        let flat = Flattener::new(100).flatten(root);
        let tree = TreeBuilder::build(&flat.nodes).unwrap().tree;

        assert_eq!(tree.len(), flat.nodes.len());
        for raw in &flat.nodes {
            let id = tree.find(&raw.id).unwrap();
            let declared = flat
                .nodes
                .iter()
                .filter(|n| n.parent_id.as_deref() == Some(raw.id.as_str()))
                .count();
            assert_eq!(tree[id].children.len(), declared, "node {}", raw.id);
        }
    }

    #[test]
    fn test_walk_reproduces_flattened_order() {
        let root = node("r", "Root").with_children(vec![
            node("a", "A").with_children(vec![node("a1", "x"), node("a2", "y")]),
            node("b", "B"),
        ]);
        let flat = Flattener::new(100).flatten(root);
        let tree = TreeBuilder::build(&flat.nodes).unwrap().tree;
        let walked: Vec<&str> = tree.walk().iter().map(|(id, _)| tree[*id].id.as_str()).collect();
        let source: Vec<&str> = flat.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(walked, source);
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let built = TreeBuilder::build(&[node("1", "A"), node("2", "B").with_parent("ghost")])
            .unwrap();
        assert_eq!(built.tree.roots().len(), 2);
        assert_eq!(built.warnings.len(), 1);
        assert!(built.warnings[0].contains("ghost"));
    }

    // =========================================================================
    // Structure errors
    // =========================================================================

    #[test]
    fn test_duplicate_id_rejected() {
        let err = TreeBuilder::build(&[node("1", "A"), node("1", "B")]).unwrap_err();
        assert_eq!(err, StructureError::DuplicateId { id: "1".into() });
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = TreeBuilder::build(&[node("1", "A"), node("", "B")]).unwrap_err();
        assert_eq!(err, StructureError::EmptyId { position: 1 });
    }

    #[test]
    fn test_self_parent_rejected() {
        let err = TreeBuilder::build(&[node("1", "A").with_parent("1")]).unwrap_err();
        assert_eq!(err, StructureError::SelfParent { id: "1".into() });
    }

    #[test]
    fn test_cycle_rejected() {
        let err = TreeBuilder::build(&[
            node("r", "Root"),
            node("a", "A").with_parent("b"),
            node("b", "B").with_parent("a"),
        ])
        .unwrap_err();
        assert_eq!(err, StructureError::Cycle { id: "a".into() });
    }

    // =========================================================================
    // Names
    // =========================================================================

    #[test]
    fn test_sibling_collision_disambiguated() {
        let tree = TreeBuilder::build(&[
            node("1", "Form"),
            node("2", "Button!").with_parent("1"),
            node("3", "Button!").with_parent("1"),
        ])
        .unwrap()
        .tree;
        let names: Vec<&str> = tree
            .children(tree.find("1").unwrap())
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["button", "button-2"]);
    }

    #[test]
    fn test_names_unique_only_among_siblings() {
        let tree = TreeBuilder::build(&[
            node("1", "Root"),
            node("2", "Row").with_parent("1"),
            node("3", "Row").with_parent("1"),
            node("4", "Label").with_parent("2"),
            node("5", "Label").with_parent("3"),
        ])
        .unwrap()
        .tree;
        assert_eq!(tree[tree.find("4").unwrap()].name, "label");
        assert_eq!(tree[tree.find("5").unwrap()].name, "label");
    }

    #[test]
    fn test_roots_disambiguated() {
        let tree = TreeBuilder::build(&[node("1", "Screen"), node("2", "Screen")])
            .unwrap()
            .tree;
        assert_eq!(tree[NodeId(0)].name, "screen");
        assert_eq!(tree[NodeId(1)].name, "screen-2");
    }
}
