//! Component classifier.
//!
//! Maps every node to exactly one [`WidgetKind`]. Rules are tried in a fixed
//! order and the first one that answers wins:
//!
//! 1. layer name keywords
//! 2. text appearance (size, weight, length)
//! 3. shape appearance (radius, shadow, proportions, label)
//! 4. declared node type
//!
//! The last rule always answers, so classification never fails.

use std::collections::BTreeMap;

use serde::Serialize;
use trellis_tree::NodeType;

use crate::config::AnalysisConfig;
use crate::node::{AnalyzedNode, DesignTree, NodeId};

/// Target widget role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Container,
    Text,
    Button,
    RaisedButton,
    Card,
    FormField,
    Checkbox,
    Select,
    Radio,
    Toolbar,
    Icon,
    Chip,
    ProgressBar,
    ProgressSpinner,
    Heading1,
    Heading2,
    Heading3,
    Emphasis,
    Paragraph,
    /// Vector primitive rendered under its own type tag.
    Shape,
}

impl WidgetKind {
    /// Widgets that collect user input.
    pub fn is_form_control(&self) -> bool {
        matches!(
            self,
            WidgetKind::FormField | WidgetKind::Checkbox | WidgetKind::Select | WidgetKind::Radio
        )
    }

    /// Widgets whose markup carries the node's text directly.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            WidgetKind::Text
                | WidgetKind::Heading1
                | WidgetKind::Heading2
                | WidgetKind::Heading3
                | WidgetKind::Emphasis
                | WidgetKind::Paragraph
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum NameMatch {
    Contains(&'static str),
    EndsWith(&'static str),
    /// A whole word of the name, split on non-alphanumerics.
    Word(&'static str),
}

impl NameMatch {
    fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Contains(k) => name.contains(k),
            NameMatch::EndsWith(k) => name.trim_end().ends_with(k),
            NameMatch::Word(k) => name
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|word| word == *k),
        }
    }
}

/// Keyword table, matched against the lower-cased layer name in order.
const NAME_RULES: &[(NameMatch, WidgetKind)] = &[
    (NameMatch::Contains("button"), WidgetKind::Button),
    (NameMatch::EndsWith("btn"), WidgetKind::Button),
    (NameMatch::Contains("checkbox"), WidgetKind::Checkbox),
    (NameMatch::Contains("radio"), WidgetKind::Radio),
    (NameMatch::Contains("select"), WidgetKind::Select),
    (NameMatch::Contains("dropdown"), WidgetKind::Select),
    (NameMatch::Contains("input"), WidgetKind::FormField),
    (NameMatch::Contains("field"), WidgetKind::FormField),
    (NameMatch::Contains("card"), WidgetKind::Card),
    (NameMatch::Contains("toolbar"), WidgetKind::Toolbar),
    (NameMatch::Contains("icon"), WidgetKind::Icon),
    (NameMatch::Contains("chip"), WidgetKind::Chip),
    (NameMatch::Word("tag"), WidgetKind::Chip),
    (NameMatch::Contains("spinner"), WidgetKind::ProgressSpinner),
    (NameMatch::Contains("progress"), WidgetKind::ProgressBar),
];

type Rule = fn(&AnalysisConfig, &DesignTree, NodeId) -> Option<WidgetKind>;

/// Rule order is precedence order.
const RULES: &[(&str, Rule)] = &[
    ("name", by_name),
    ("text", by_text),
    ("shape", by_shape),
    ("type", by_type),
];

pub struct Classifier<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Classify every node in the tree.
    pub fn classify_all(&self, tree: &mut DesignTree) {
        let mut counts: BTreeMap<WidgetKind, usize> = BTreeMap::new();
        for id in tree.ids().collect::<Vec<_>>() {
            let widget = self.classify(tree, id);
            *counts.entry(widget).or_default() += 1;
            tree[id].widget = widget;
        }
        tracing::debug!(?counts, "classified widgets");
    }

    /// Classify one node.
    pub fn classify(&self, tree: &DesignTree, id: NodeId) -> WidgetKind {
        for (rule, check) in RULES {
            if let Some(widget) = check(self.config, tree, id) {
                tracing::trace!(id = %tree[id].id, rule, ?widget, "classified node");
                return widget;
            }
        }
        WidgetKind::Container
    }
}

/// Text layers take their role from typography, not from their name.
fn by_name(config: &AnalysisConfig, tree: &DesignTree, id: NodeId) -> Option<WidgetKind> {
    let node = &tree[id];
    if node.is_text() {
        return None;
    }
    let name = node.raw_name.to_lowercase();
    let (_, widget) = NAME_RULES.iter().find(|(rule, _)| rule.matches(&name))?;
    Some(match widget {
        WidgetKind::Button => refine_button(config, node),
        WidgetKind::ProgressBar if name.contains("circular") => WidgetKind::ProgressSpinner,
        other => *other,
    })
}

fn by_text(config: &AnalysisConfig, tree: &DesignTree, id: NodeId) -> Option<WidgetKind> {
    let node = &tree[id];
    if !node.is_text() {
        return None;
    }
    let style = node.style.text.as_ref()?;

    if style.font_size > config.heading1_size {
        return Some(WidgetKind::Heading1);
    }
    if style.font_size > config.heading2_size {
        return Some(WidgetKind::Heading2);
    }
    if style.font_size > config.heading3_size {
        return Some(WidgetKind::Heading3);
    }
    if style.font_weight > config.emphasis_weight {
        return Some(WidgetKind::Emphasis);
    }

    let content = node.text.as_deref().unwrap_or_default();
    let wraps = node.bounds.height > style.effective_line_height() * 1.5;
    if content.chars().count() >= config.paragraph_min_chars || content.contains('\n') || wraps {
        return Some(WidgetKind::Paragraph);
    }
    None
}

fn by_shape(config: &AnalysisConfig, tree: &DesignTree, id: NodeId) -> Option<WidgetKind> {
    let node = &tree[id];
    if node.is_text() {
        return None;
    }
    let style = &node.style;

    if style.radius.max() >= config.card_radius && style.has_drop_shadow() {
        return Some(WidgetKind::Card);
    }

    // A painted, button-proportioned box around one short centered label.
    let bounds = node.bounds;
    if bounds.height <= 0.0 || node.children.len() != 1 {
        return None;
    }
    let label = tree.children(id).next()?;
    let short_label = label.is_text()
        && label
            .text
            .as_deref()
            .map(|t| t.chars().count())
            .is_some_and(|n| n > 0 && n <= config.button_label_max_chars);
    let centered = (label.bounds.center_x() - bounds.center_x()).abs()
        <= config.label_center_tolerance
        && (label.bounds.center_y() - bounds.center_y()).abs() <= config.label_center_tolerance;
    let aspect = bounds.width / bounds.height;
    let proportioned = (config.button_min_aspect..=config.button_max_aspect).contains(&aspect)
        && bounds.height <= config.button_max_height;
    let painted = !style.fills.is_empty() || style.stroke.is_some();

    if short_label && centered && proportioned && painted {
        return Some(refine_button(config, node));
    }
    None
}

fn by_type(_config: &AnalysisConfig, tree: &DesignTree, id: NodeId) -> Option<WidgetKind> {
    Some(match tree[id].node_type {
        NodeType::Text => WidgetKind::Text,
        ref t if t.is_shape() => WidgetKind::Shape,
        _ => WidgetKind::Container,
    })
}

fn refine_button(config: &AnalysisConfig, node: &AnalyzedNode) -> WidgetKind {
    if node.style.has_drop_shadow() || node.style.radius.max() >= config.elevated_radius {
        WidgetKind::RaisedButton
    } else {
        WidgetKind::Button
    }
}
