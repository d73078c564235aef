//! Resolved visual style of an analyzed node.
//!
//! Raw paints, strokes, effects and typography are reduced to the handful of
//! normalized values the emitter needs. Invisible paints and effects are
//! dropped; paint opacity is folded into color alpha.

use serde::Serialize;
use trellis_tree::{EffectKind, Paint, PaintKind, RawNode, RgbaColor, TypeStyle};

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    fn from_raw(color: &RgbaColor, opacity: f64) -> Self {
        Self {
            r: channel(color.r),
            g: channel(color.g),
            b: channel(color.b),
            alpha: (color.a * opacity).clamp(0.0, 1.0),
        }
    }

    /// Normalized `#rrggbb`, ignoring alpha.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }

    /// CSS value: hex when opaque, `rgba(...)` otherwise.
    pub fn to_css(&self) -> String {
        if self.is_opaque() {
            self.hex()
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                format_number(self.alpha)
            )
        }
    }
}

fn channel(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub weight: f64,
    pub dashed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shadow {
    pub color: Color,
    pub x: f64,
    pub y: f64,
    pub blur: f64,
    pub spread: f64,
    pub inset: bool,
}

/// Corner radius: none, uniform, or per corner (tl, tr, br, bl).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum Radius {
    #[default]
    None,
    Uniform(f64),
    Corners([f64; 4]),
}

impl Radius {
    /// The largest corner radius.
    pub fn max(&self) -> f64 {
        match self {
            Radius::None => 0.0,
            Radius::Uniform(r) => *r,
            Radius::Corners(corners) => corners.iter().copied().fold(0.0, f64::max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justified,
}

/// Resolved typography of a text node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: f64,
    pub line_height: Option<f64>,
    pub letter_spacing: f64,
    pub align: TextAlign,
    pub italic: bool,
}

impl TextStyle {
    fn from_raw(style: &TypeStyle) -> Self {
        let align = match style.text_align_horizontal.as_deref() {
            Some("CENTER") => TextAlign::Center,
            Some("RIGHT") => TextAlign::Right,
            Some("JUSTIFIED") => TextAlign::Justified,
            _ => TextAlign::Left,
        };
        Self {
            font_family: style
                .font_family
                .clone()
                .unwrap_or_else(|| "Roboto".to_string()),
            font_size: style.font_size.unwrap_or(14.0),
            font_weight: style.font_weight.unwrap_or(400.0),
            line_height: style.line_height_px,
            letter_spacing: style.letter_spacing.unwrap_or(0.0),
            align,
            italic: style.italic,
        }
    }

    /// Line height, falling back to the usual 1.2 × font size.
    pub fn effective_line_height(&self) -> f64 {
        self.line_height.unwrap_or(self.font_size * 1.2)
    }
}

/// All resolved style of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    pub fills: Vec<Color>,
    pub stroke: Option<Stroke>,
    pub radius: Radius,
    pub shadows: Vec<Shadow>,
    pub opacity: f64,
    pub text: Option<TextStyle>,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            fills: Vec::new(),
            stroke: None,
            radius: Radius::None,
            shadows: Vec::new(),
            opacity: 1.0,
            text: None,
        }
    }
}

impl NodeStyle {
    /// Resolve the style payload of a raw node.
    pub fn from_raw(raw: &RawNode) -> Self {
        let fills = raw.fills.iter().filter_map(solid_color).collect();

        let stroke = raw.strokes.iter().find_map(solid_color).map(|color| Stroke {
            color,
            weight: raw.stroke_weight.unwrap_or(1.0),
            dashed: !raw.stroke_dashes.is_empty(),
        });

        let radius = match (&raw.rectangle_corner_radii, raw.corner_radius) {
            (Some(radii), _) if radii.len() == 4 => {
                if radii.iter().all(|r| *r == radii[0]) {
                    uniform_radius(radii[0])
                } else {
                    Radius::Corners([radii[0], radii[1], radii[2], radii[3]])
                }
            }
            (_, Some(r)) => uniform_radius(r),
            _ => Radius::None,
        };

        let shadows = raw
            .effects
            .iter()
            .filter(|e| e.visible)
            .filter_map(|e| {
                let inset = match e.kind {
                    EffectKind::DropShadow => false,
                    EffectKind::InnerShadow => true,
                    _ => return None,
                };
                let color = e
                    .color
                    .as_ref()
                    .map(|c| Color::from_raw(c, 1.0))
                    .unwrap_or(Color {
                        r: 0,
                        g: 0,
                        b: 0,
                        alpha: 0.25,
                    });
                Some(Shadow {
                    color,
                    x: e.offset.x,
                    y: e.offset.y,
                    blur: e.radius,
                    spread: e.spread,
                    inset,
                })
            })
            .collect();

        Self {
            fills,
            stroke,
            radius,
            shadows,
            opacity: raw.opacity.clamp(0.0, 1.0),
            text: raw.style.as_ref().map(TextStyle::from_raw),
        }
    }

    /// Topmost resolved fill; paints are listed bottom to top.
    pub fn fill(&self) -> Option<&Color> {
        self.fills.last()
    }

    /// Has at least one outer (drop) shadow.
    pub fn has_drop_shadow(&self) -> bool {
        self.shadows.iter().any(|s| !s.inset)
    }
}

fn uniform_radius(r: f64) -> Radius {
    if r > 0.0 {
        Radius::Uniform(r)
    } else {
        Radius::None
    }
}

fn solid_color(paint: &Paint) -> Option<Color> {
    if !paint.visible || paint.kind != PaintKind::Solid {
        return None;
    }
    paint
        .color
        .as_ref()
        .map(|c| Color::from_raw(c, paint.opacity))
}

/// Format a number for generated code: at most two decimals, no trailing zeros.
pub fn format_number(n: f64) -> String {
    let rounded = (n * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 && rounded.is_finite() {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{rounded:.2}");
        s.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawNode {
        serde_json::from_value(value).unwrap()
    }

    // =========================================================================
    // Numbers and colors
    // =========================================================================

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(3.14159), "3.14");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(12.999), "13");
    }

    #[test]
    fn test_color_hex() {
        let color = Color::from_raw(
            &RgbaColor {
                r: 0.1,
                g: 0.45,
                b: 0.91,
                a: 1.0,
            },
            1.0,
        );
        assert_eq!(color.hex(), "#1a73e8");
        assert_eq!(color.to_css(), "#1a73e8");
    }

    #[test]
    fn test_color_alpha_to_rgba() {
        let color = Color::from_raw(
            &RgbaColor {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 0.5,
            },
            0.5,
        );
        assert_eq!(color.to_css(), "rgba(0, 0, 0, 0.25)");
    }

    // =========================================================================
    // Style resolution
    // =========================================================================

    #[test]
    fn test_only_visible_solid_fills() {
        let node = raw(json!({
            "id": "1", "type": "RECTANGLE",
            "fills": [
                { "type": "IMAGE", "imageRef": "abc" },
                { "type": "SOLID", "visible": false, "color": { "r": 1, "g": 0, "b": 0 } },
                { "type": "SOLID", "color": { "r": 1, "g": 1, "b": 1 } }
            ]
        }));
        let style = NodeStyle::from_raw(&node);
        assert_eq!(style.fills, vec![Color::rgb(255, 255, 255)]);
    }

    #[test]
    fn test_stroke_resolution() {
        let node = raw(json!({
            "id": "1", "type": "RECTANGLE",
            "strokes": [{ "type": "SOLID", "color": { "r": 0, "g": 0, "b": 0 } }],
            "strokeWeight": 2,
            "strokeDashes": [4, 2]
        }));
        let stroke = NodeStyle::from_raw(&node).stroke.unwrap();
        assert_eq!(stroke.weight, 2.0);
        assert!(stroke.dashed);
        assert_eq!(stroke.color.hex(), "#000000");
    }

    #[test]
    fn test_radius_variants() {
        let uniform = raw(json!({ "id": "1", "type": "RECTANGLE", "cornerRadius": 8 }));
        assert_eq!(NodeStyle::from_raw(&uniform).radius, Radius::Uniform(8.0));

        let corners = raw(json!({
            "id": "2", "type": "RECTANGLE", "rectangleCornerRadii": [8, 8, 0, 0]
        }));
        let radius = NodeStyle::from_raw(&corners).radius;
        assert_eq!(radius, Radius::Corners([8.0, 8.0, 0.0, 0.0]));
        assert_eq!(radius.max(), 8.0);

        let zero = raw(json!({ "id": "3", "type": "RECTANGLE", "cornerRadius": 0 }));
        assert_eq!(NodeStyle::from_raw(&zero).radius, Radius::None);
    }

    #[test]
    fn test_shadow_resolution() {
        let node = raw(json!({
            "id": "1", "type": "FRAME",
            "effects": [
                { "type": "DROP_SHADOW", "color": { "r": 0, "g": 0, "b": 0, "a": 0.2 },
                  "offset": { "x": 0, "y": 2 }, "radius": 4 },
                { "type": "LAYER_BLUR", "radius": 10 },
                { "type": "DROP_SHADOW", "visible": false, "radius": 1 }
            ]
        }));
        let style = NodeStyle::from_raw(&node);
        assert_eq!(style.shadows.len(), 1);
        assert!(style.has_drop_shadow());
        assert_eq!(style.shadows[0].y, 2.0);
        assert_eq!(style.shadows[0].blur, 4.0);
    }

    #[test]
    fn test_text_style_defaults() {
        let node = raw(json!({
            "id": "1", "type": "TEXT", "style": { "fontSize": 18, "textAlignHorizontal": "CENTER" }
        }));
        let text = NodeStyle::from_raw(&node).text.unwrap();
        assert_eq!(text.font_family, "Roboto");
        assert_eq!(text.font_size, 18.0);
        assert_eq!(text.font_weight, 400.0);
        assert_eq!(text.align, TextAlign::Center);
        assert_eq!(text.effective_line_height(), 18.0 * 1.2);
    }
}
