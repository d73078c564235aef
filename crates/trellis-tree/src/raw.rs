//! Raw design node schema.
//!
//! Mirrors the node JSON returned by the design tool's document API. Values are
//! expected to be resolved (style references already expanded by the loader).
//! Everything here is plain data; interpretation happens in `trellis-model`.

use serde::{Deserialize, Serialize};

/// Declared type tag of a design node.
///
/// Known tags get their own variant; anything else is preserved verbatim in
/// `Other` so it can still be emitted as a fallback tag name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    Document,
    Canvas,
    Frame,
    Group,
    Section,
    Component,
    ComponentSet,
    Instance,
    Text,
    Vector,
    Rectangle,
    Ellipse,
    Line,
    Star,
    Polygon,
    BooleanOperation,
    Slice,
    Other(String),
}

impl NodeType {
    /// The tag as it appears in the source document (`FRAME`, `TEXT`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Document => "DOCUMENT",
            NodeType::Canvas => "CANVAS",
            NodeType::Frame => "FRAME",
            NodeType::Group => "GROUP",
            NodeType::Section => "SECTION",
            NodeType::Component => "COMPONENT",
            NodeType::ComponentSet => "COMPONENT_SET",
            NodeType::Instance => "INSTANCE",
            NodeType::Text => "TEXT",
            NodeType::Vector => "VECTOR",
            NodeType::Rectangle => "RECTANGLE",
            NodeType::Ellipse => "ELLIPSE",
            NodeType::Line => "LINE",
            NodeType::Star => "STAR",
            NodeType::Polygon => "REGULAR_POLYGON",
            NodeType::BooleanOperation => "BOOLEAN_OPERATION",
            NodeType::Slice => "SLICE",
            NodeType::Other(tag) => tag,
        }
    }

    /// Node types that group other nodes in the source document.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeType::Document
                | NodeType::Canvas
                | NodeType::Frame
                | NodeType::Group
                | NodeType::Section
                | NodeType::Component
                | NodeType::ComponentSet
                | NodeType::Instance
        )
    }

    /// Primitive vector shapes.
    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            NodeType::Vector
                | NodeType::Rectangle
                | NodeType::Ellipse
                | NodeType::Line
                | NodeType::Star
                | NodeType::Polygon
                | NodeType::BooleanOperation
        )
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "DOCUMENT" => NodeType::Document,
            "CANVAS" => NodeType::Canvas,
            "FRAME" => NodeType::Frame,
            "GROUP" => NodeType::Group,
            "SECTION" => NodeType::Section,
            "COMPONENT" => NodeType::Component,
            "COMPONENT_SET" => NodeType::ComponentSet,
            "INSTANCE" => NodeType::Instance,
            "TEXT" => NodeType::Text,
            "VECTOR" => NodeType::Vector,
            "RECTANGLE" => NodeType::Rectangle,
            "ELLIPSE" => NodeType::Ellipse,
            "LINE" => NodeType::Line,
            "STAR" => NodeType::Star,
            "REGULAR_POLYGON" => NodeType::Polygon,
            "BOOLEAN_OPERATION" => NodeType::BooleanOperation,
            "SLICE" => NodeType::Slice,
            _ => NodeType::Other(tag),
        }
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// Axis-aligned box in absolute design units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbaColor {
    #[serde(default)]
    pub r: f64,
    #[serde(default)]
    pub g: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default = "one")]
    pub a: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintKind {
    Solid,
    Image,
    GradientLinear,
    GradientRadial,
    GradientAngular,
    GradientDiamond,
    #[serde(other)]
    Other,
}

/// A fill or stroke paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paint {
    #[serde(rename = "type")]
    pub kind: PaintKind,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "one")]
    pub opacity: f64,
    pub color: Option<RgbaColor>,
    pub image_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
    LayerBlur,
    BackgroundBlur,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Visual effect (shadows, blurs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    #[serde(default = "yes")]
    pub visible: bool,
    pub color: Option<RgbaColor>,
    #[serde(default)]
    pub offset: Vector,
    #[serde(default)]
    pub radius: f64,
    #[serde(default)]
    pub spread: f64,
}

/// Typography of a text node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<f64>,
    pub line_height_px: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub text_align_horizontal: Option<String>,
    #[serde(default)]
    pub italic: bool,
}

/// Declared auto-layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    None,
    Horizontal,
    Vertical,
    #[serde(other)]
    Other,
}

/// Declared auto-layout alignment along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisAlign {
    Min,
    Center,
    Max,
    SpaceBetween,
    Baseline,
    #[serde(other)]
    Other,
}

/// Resizing constraints relative to the parent frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Constraints {
    pub vertical: Option<String>,
    pub horizontal: Option<String>,
}

impl Constraints {
    /// Pinned to both left and right edges of the parent.
    pub fn stretches_horizontally(&self) -> bool {
        matches!(
            self.horizontal.as_deref(),
            Some("LEFT_RIGHT") | Some("STRETCH")
        )
    }

    /// Pinned to both top and bottom edges of the parent.
    pub fn stretches_vertically(&self) -> bool {
        matches!(
            self.vertical.as_deref(),
            Some("TOP_BOTTOM") | Some("STRETCH")
        )
    }
}

/// A single design node as delivered by the loader.
///
/// Nested documents carry their subtree in `children`; pre-flattened
/// sequences carry an explicit `parent_id` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(
        default,
        rename = "parent_id",
        alias = "parentId",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<String>,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "one")]
    pub opacity: f64,
    pub absolute_bounding_box: Option<Rect>,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    pub stroke_weight: Option<f64>,
    #[serde(default)]
    pub stroke_dashes: Vec<f64>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    pub corner_radius: Option<f64>,
    pub rectangle_corner_radii: Option<Vec<f64>>,
    pub style: Option<TypeStyle>,
    pub characters: Option<String>,
    pub layout_mode: Option<LayoutMode>,
    #[serde(default)]
    pub item_spacing: f64,
    #[serde(default)]
    pub padding_left: f64,
    #[serde(default)]
    pub padding_right: f64,
    #[serde(default)]
    pub padding_top: f64,
    #[serde(default)]
    pub padding_bottom: f64,
    pub primary_axis_align_items: Option<AxisAlign>,
    pub counter_axis_align_items: Option<AxisAlign>,
    pub constraints: Option<Constraints>,
    pub component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawNode>,
}

impl RawNode {
    /// Create a bare node with default style and no geometry.
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type,
            parent_id: None,
            visible: true,
            opacity: 1.0,
            absolute_bounding_box: None,
            fills: Vec::new(),
            strokes: Vec::new(),
            stroke_weight: None,
            stroke_dashes: Vec::new(),
            effects: Vec::new(),
            corner_radius: None,
            rectangle_corner_radii: None,
            style: None,
            characters: None,
            layout_mode: None,
            item_spacing: 0.0,
            padding_left: 0.0,
            padding_right: 0.0,
            padding_top: 0.0,
            padding_bottom: 0.0,
            primary_axis_align_items: None,
            counter_axis_align_items: None,
            constraints: None,
            component_id: None,
            children: Vec::new(),
        }
    }

    pub fn with_bounds(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.absolute_bounding_box = Some(Rect::new(x, y, width, height));
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_children(mut self, children: Vec<RawNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_text(mut self, characters: impl Into<String>, style: TypeStyle) -> Self {
        self.characters = Some(characters.into());
        self.style = Some(style);
        self
    }

    /// Geometry, or an empty box at the origin when the node has none.
    pub fn bounds(&self) -> Rect {
        self.absolute_bounding_box.unwrap_or_default()
    }
}

fn yes() -> bool {
    true
}

fn one() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    // =========================================================================
    // Type tags
    // =========================================================================

    #[test]
    fn test_known_type_roundtrip() {
        let node_type = NodeType::from("BOOLEAN_OPERATION".to_string());
        assert_eq!(node_type, NodeType::BooleanOperation);
        assert_eq!(String::from(node_type), "BOOLEAN_OPERATION");
    }

    #[test]
    fn test_unknown_type_preserved() {
        let node_type = NodeType::from("STICKY".to_string());
        assert_eq!(node_type, NodeType::Other("STICKY".into()));
        assert_eq!(node_type.as_str(), "STICKY");
        assert!(!node_type.is_container());
    }

    // =========================================================================
    // Deserialization
    // =========================================================================

    #[test]
    fn test_minimal_node() {
        let node: RawNode =
            serde_json::from_value(json!({ "id": "1:2", "type": "FRAME" })).unwrap();
        assert_eq!(node.id, "1:2");
        assert_eq!(node.name, "");
        assert!(node.visible);
        assert_eq!(node.opacity, 1.0);
        assert_eq!(node.bounds(), Rect::default());
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_full_text_node() {
        let node: RawNode = serde_json::from_value(json!({
            "id": "3:4",
            "name": "Title",
            "type": "TEXT",
            "absoluteBoundingBox": { "x": 10, "y": 20, "width": 200, "height": 40 },
            "fills": [{ "type": "SOLID", "color": { "r": 1, "g": 0, "b": 0, "a": 1 } }],
            "style": { "fontFamily": "Inter", "fontSize": 32, "fontWeight": 700, "lineHeightPx": 40 },
            "characters": "Welcome"
        }))
        .unwrap();
        assert_eq!(node.node_type, NodeType::Text);
        assert_eq!(node.bounds(), Rect::new(10.0, 20.0, 200.0, 40.0));
        assert_eq!(node.fills[0].kind, PaintKind::Solid);
        let style = node.style.unwrap();
        assert_eq!(style.font_family.as_deref(), Some("Inter"));
        assert_eq!(style.font_size, Some(32.0));
        assert_eq!(node.characters.as_deref(), Some("Welcome"));
    }

    #[test]
    fn test_unknown_paint_and_effect_kinds() {
        let node: RawNode = serde_json::from_value(json!({
            "id": "1",
            "type": "RECTANGLE",
            "fills": [{ "type": "VIDEO" }],
            "effects": [{ "type": "TEXTURE" }]
        }))
        .unwrap();
        assert_eq!(node.fills[0].kind, PaintKind::Other);
        assert_eq!(node.effects[0].kind, EffectKind::Other);
    }

    #[test]
    fn test_auto_layout_fields() {
        let node: RawNode = serde_json::from_value(json!({
            "id": "1",
            "type": "FRAME",
            "layoutMode": "HORIZONTAL",
            "itemSpacing": 12,
            "paddingLeft": 16,
            "primaryAxisAlignItems": "SPACE_BETWEEN",
            "counterAxisAlignItems": "CENTER"
        }))
        .unwrap();
        assert_eq!(node.layout_mode, Some(LayoutMode::Horizontal));
        assert_eq!(node.item_spacing, 12.0);
        assert_eq!(node.padding_left, 16.0);
        assert_eq!(node.primary_axis_align_items, Some(AxisAlign::SpaceBetween));
        assert_eq!(node.counter_axis_align_items, Some(AxisAlign::Center));
    }

    #[test]
    fn test_parent_id_alias() {
        let node: RawNode =
            serde_json::from_value(json!({ "id": "2", "type": "TEXT", "parentId": "1" }))
                .unwrap();
        assert_eq!(node.parent_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_constraints_stretch() {
        let constraints = Constraints {
            vertical: Some("TOP".into()),
            horizontal: Some("LEFT_RIGHT".into()),
        };
        assert!(constraints.stretches_horizontally());
        assert!(!constraints.stretches_vertically());
    }
}
