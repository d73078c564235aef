//! Trellis Tree
//!
//! Raw design document model and the first pipeline stage: loading a design
//! document from JSON and flattening its node tree into a bounded, pre-order
//! sequence with explicit parent links.
//!
//! ```text
//! JSON → parse_document() → DesignInput → Flattener → Flattened { nodes, warnings }
//! ```
//!
//! # Example
//!
//! ```
//! use trellis_tree::{parse_document, DesignInput, Flattener};
//!
//! let doc = parse_document(r#"{ "id": "0:1", "type": "FRAME" }"#).unwrap();
//! let DesignInput::Tree(root) = doc.input else { unreachable!() };
//! assert_eq!(Flattener::new(50).flatten(root).nodes.len(), 1);
//! ```

pub mod flatten;
pub mod raw;

pub use flatten::{Flattened, Flattener};
pub use raw::{
    AxisAlign, Constraints, Effect, EffectKind, LayoutMode, NodeType, Paint, PaintKind, RawNode,
    Rect, RgbaColor, TypeStyle, Vector,
};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Hard ceiling on the node budget of a single conversion.
pub const NODE_LIMIT_CEILING: usize = 500;

/// Node budget used when the caller does not pick one.
pub const DEFAULT_NODE_LIMIT: usize = 50;

/// Design document error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Design document error at line {line}, column {column}: {message}")]
pub struct TreeError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

/// The two input shapes the pipeline accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum DesignInput {
    /// A nested tree rooted at one node.
    Tree(RawNode),
    /// A pre-flattened sequence with explicit `parent_id` links.
    Flat(Vec<RawNode>),
}

impl DesignInput {
    /// Flatten either shape with the given flattener.
    pub fn flatten(self, flattener: &Flattener) -> Flattened {
        match self {
            DesignInput::Tree(root) => flattener.flatten(root),
            DesignInput::Flat(nodes) => flattener.flatten_all(nodes),
        }
    }
}

/// A loaded design document.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignDocument {
    /// File name from a file response, if present.
    pub name: Option<String>,
    pub input: DesignInput,
}

/// Parse a design document.
///
/// Accepts a file response (`{ "name": ..., "document": { ... } }`), a bare
/// node object, or a JSON array of pre-flattened nodes. Real documents nest
/// hundreds of levels deep, so the recursion limit is lifted and both
/// deserialization passes run on a stack that grows on demand.
pub fn parse_document(source: &str) -> Result<DesignDocument, TreeError> {
    let mut de = serde_json::Deserializer::from_str(source);
    de.disable_recursion_limit();
    let mut value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    if let Err(err) = de.end() {
        release(value);
        return Err(err.into());
    }

    if value.is_array() {
        let nodes: Vec<RawNode> = from_value(value)?;
        return Ok(DesignDocument {
            name: None,
            input: DesignInput::Flat(nodes),
        });
    }

    if let Some(document) = value.get_mut("document").map(Value::take) {
        let name = value.get("name").and_then(Value::as_str).map(str::to_string);
        release(value);
        let root: RawNode = from_value(document)?;
        return Ok(DesignDocument {
            name,
            input: DesignInput::Tree(root),
        });
    }

    let root: RawNode = from_value(value)?;
    Ok(DesignDocument {
        name: None,
        input: DesignInput::Tree(root),
    })
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    T::deserialize(serde_stacker::Deserializer::new(value))
}

/// Drop a parsed value one level at a time instead of recursively.
fn release(value: Value) {
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(map) => pending.extend(map.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}
