//! Design token extraction.
//!
//! Every distinct color and text style in the tree becomes a named token, in
//! order of first appearance during a pre-order walk. The stylesheet refers to
//! tokens by name (`$color-1`, `@include font-1`).

use indexmap::IndexMap;
use serde::Serialize;
use trellis_model::{format_number, Color, DesignTree, TextStyle};

/// A named text style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontToken {
    pub name: String,
    pub family: String,
    pub size: f64,
    pub weight: f64,
    pub line_height: Option<f64>,
}

/// Deduplicated colors and text styles of one design.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DesignTokens {
    /// CSS color value → token name.
    pub colors: IndexMap<String, String>,
    /// Text style key → token.
    pub fonts: IndexMap<String, FontToken>,
}

impl DesignTokens {
    pub fn collect(tree: &DesignTree) -> Self {
        let mut tokens = Self::default();
        for (id, _) in tree.walk() {
            let style = &tree[id].style;
            for color in &style.fills {
                tokens.add_color(color);
            }
            if let Some(stroke) = &style.stroke {
                tokens.add_color(&stroke.color);
            }
            if let Some(text) = &style.text {
                tokens.add_font(text);
            }
        }
        tokens
    }

    fn add_color(&mut self, color: &Color) {
        let next = self.colors.len() + 1;
        self.colors
            .entry(color.to_css())
            .or_insert_with(|| format!("color-{next}"));
    }

    fn add_font(&mut self, text: &TextStyle) {
        let next = self.fonts.len() + 1;
        self.fonts.entry(font_key(text)).or_insert_with(|| FontToken {
            name: format!("font-{next}"),
            family: text.font_family.clone(),
            size: text.font_size,
            weight: text.font_weight,
            line_height: text.line_height,
        });
    }

    /// SCSS variable for a color, e.g. `$color-2`.
    pub fn color_var(&self, color: &Color) -> String {
        match self.colors.get(&color.to_css()) {
            Some(name) => format!("${name}"),
            None => color.to_css(),
        }
    }

    /// Mixin name for a text style.
    pub fn font_mixin(&self, text: &TextStyle) -> Option<&str> {
        self.fonts.get(&font_key(text)).map(|f| f.name.as_str())
    }

    /// The token preamble at the top of the stylesheet.
    pub fn preamble(&self) -> String {
        if self.colors.is_empty() && self.fonts.is_empty() {
            return String::new();
        }
        let mut out = String::from("// Design tokens\n");
        if !self.colors.is_empty() {
            out.push_str("// Colors\n");
            for (value, name) in &self.colors {
                out.push_str(&format!("${name}: {value};\n"));
            }
        }
        if !self.fonts.is_empty() {
            out.push_str("// Typography\n");
            for font in self.fonts.values() {
                out.push_str(&format!("@mixin {} {{\n", font.name));
                out.push_str(&format!("  font-family: '{}', sans-serif;\n", font.family));
                out.push_str(&format!("  font-size: {}px;\n", format_number(font.size)));
                out.push_str(&format!("  font-weight: {};\n", format_number(font.weight)));
                if let Some(lh) = font.line_height {
                    out.push_str(&format!("  line-height: {}px;\n", format_number(lh)));
                }
                out.push_str("}\n");
            }
        }
        out.push('\n');
        out
    }
}

fn font_key(text: &TextStyle) -> String {
    format!(
        "{}/{}/{}/{}",
        text.font_family,
        format_number(text.font_size),
        format_number(text.font_weight),
        text.line_height.map(format_number).unwrap_or_default()
    )
}
