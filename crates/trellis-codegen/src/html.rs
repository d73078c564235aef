//! Template generator.
//!
//! Walks the analyzed tree and writes one element per node, nested in child
//! order and indented two spaces per level. Every element carries the node's
//! sanitized name as its class and the source id as `data-node-id`. Modules
//! the chosen widgets need are recorded on the context for the behavior stub.

use std::borrow::Cow;

use trellis_model::{NodeId, WidgetKind};

use crate::widgets::{
    child_wrapper, icon_ligature, nested_text_tag, tag_name, widget_spec, RADIO_GROUP,
};
use crate::EmitContext;

/// Generate the component template.
///
/// The tree is walked with an explicit stack so deep designs cannot exhaust
/// the call stack.
pub fn generate(ctx: &mut EmitContext) -> String {
    let mut out = String::new();
    let roots = ctx.tree.roots().to_vec();
    let mut stack: Vec<Step> = Vec::new();

    let depth = if roots.len() > 1 {
        out.push_str(&format!("<div class=\"{}\">\n", ctx.names.container));
        stack.push(Step::Write("</div>\n".to_string()));
        1
    } else {
        0
    };
    stack.extend(roots.iter().rev().map(|&id| Step::Open {
        id,
        depth,
        role: None,
    }));

    while let Some(step) = stack.pop() {
        match step {
            Step::Write(text) => out.push_str(&text),
            Step::Open { id, depth, role } => {
                let rest = open_node(ctx, id, depth, role, &mut out);
                stack.extend(rest.into_iter().rev());
            }
        }
    }

    out
}

/// Pending template work.
enum Step {
    Open {
        id: NodeId,
        depth: usize,
        role: Option<&'static str>,
    },
    Write(String),
}

/// Extra lines a widget writes inside its element, and an optional inner
/// element its children go into.
#[derive(Default)]
struct Inner {
    prelude: Vec<String>,
    wrapper: Option<(String, String)>,
}

/// Write the opening of a node and return what remains to be written for
/// it, in document order.
fn open_node(
    ctx: &mut EmitContext,
    id: NodeId,
    depth: usize,
    role: Option<&'static str>,
    out: &mut String,
) -> Vec<Step> {
    let tree = ctx.tree;
    let node = &tree[id];
    let library = ctx.options.use_widget_library;
    let indent = "  ".repeat(depth);

    if library && role.is_none() {
        ctx.imports
            .extend(widget_spec(node.widget).modules.iter().copied());
    }
    if node.widget == WidgetKind::Shape {
        ctx.needs_schema = true;
    }

    let tag: Cow<str> = match role {
        Some(tag) => Cow::Borrowed(tag),
        None => tag_name(node.widget, &node.node_type, library),
    };

    let mut attributes: Vec<String> = Vec::new();
    if role.is_none() && node.widget != WidgetKind::Shape {
        let spec = widget_spec(node.widget);
        let flavor = if library { spec.material } else { spec.plain };
        attributes.extend(flavor.attributes.iter().map(|a| a.to_string()));
    }
    attributes.extend(dynamic_attributes(ctx, id, role));
    attributes.push(format!("class=\"{}\"", node.name));
    attributes.push(format!("data-node-id=\"{}\"", escape_attr(&node.id)));

    out.push_str(&format!("{indent}<{tag} {}>", attributes.join(" ")));

    let inner = if role.is_none() {
        inner_content(ctx, id)
    } else {
        Inner::default()
    };
    let fallback_label = match node.widget {
        WidgetKind::Button
        | WidgetKind::RaisedButton
        | WidgetKind::Checkbox
        | WidgetKind::Radio
        | WidgetKind::Chip
            if node.children.is_empty() =>
        {
            Some(escape_text(&node.raw_name))
        }
        _ => None,
    };

    if node.children.is_empty() && inner.prelude.is_empty() && inner.wrapper.is_none() {
        if let Some(text) = &node.text {
            out.push_str(&escape_text(text));
        } else if let Some(label) = &fallback_label {
            out.push_str(label);
        }
        out.push_str(&format!("</{tag}>\n"));
        return Vec::new();
    }

    out.push('\n');
    let inner_indent = "  ".repeat(depth + 1);
    for line in &inner.prelude {
        out.push_str(&format!("{inner_indent}{line}\n"));
    }
    if let Some(label) = &fallback_label {
        out.push_str(&format!("{inner_indent}{label}\n"));
    }

    let child_depth = match &inner.wrapper {
        Some((open, _)) => {
            out.push_str(&format!("{inner_indent}{open}\n"));
            depth + 2
        }
        None => depth + 1,
    };

    let mut rest = Vec::with_capacity(node.children.len() + 2);
    let mut seen_text = false;
    let mut group: Option<String> = None;
    for &child in &node.children {
        let grouped = library && tree[child].widget == WidgetKind::Radio;
        if !grouped {
            if let Some(close) = group.take() {
                rest.push(Step::Write(close));
            }
        } else if group.is_none() {
            // Material radios only bind through their group.
            let group_indent = "  ".repeat(child_depth);
            let model = ctx
                .binding(child)
                .map(|b| model_attributes(&b.key).join(" "))
                .unwrap_or_default();
            rest.push(Step::Write(format!(
                "{group_indent}<{RADIO_GROUP} {model}>\n"
            )));
            group = Some(format!("{group_indent}</{RADIO_GROUP}>\n"));
        }

        let role = if tree[child].is_text() {
            let first = !seen_text;
            seen_text = true;
            nested_text_tag(node.widget, first, library)
        } else {
            None
        };
        rest.push(Step::Open {
            id: child,
            depth: child_depth + usize::from(group.is_some()),
            role,
        });
    }
    if let Some(close) = group {
        rest.push(Step::Write(close));
    }

    if let Some((_, close)) = inner.wrapper {
        rest.push(Step::Write(format!("{inner_indent}{close}\n")));
    }
    rest.push(Step::Write(format!("{indent}</{tag}>\n")));
    rest
}

/// Attributes that depend on the node rather than on the widget kind.
fn dynamic_attributes(ctx: &EmitContext, id: NodeId, role: Option<&'static str>) -> Vec<String> {
    let node = &ctx.tree[id];
    let library = ctx.options.use_widget_library;

    if let Some(role) = role {
        if matches!(role, "mat-option" | "option") {
            let value = trellis_model::name::sanitize(node.text.as_deref().unwrap_or_default());
            return vec![format!("value=\"{value}\"")];
        }
        return Vec::new();
    }

    match (node.widget, library) {
        (WidgetKind::Icon, true) => {
            vec![format!("fontIcon=\"{}\"", icon_ligature(&node.raw_name))]
        }
        (WidgetKind::Icon, false) => {
            vec![format!("aria-label=\"{}\"", icon_ligature(&node.raw_name))]
        }
        (WidgetKind::Checkbox, true) => ctx
            .binding(id)
            .map(|b| model_attributes(&b.key))
            .unwrap_or_default(),
        (WidgetKind::Radio, true) => vec![format!("value=\"{}\"", node.name)],
        (WidgetKind::ProgressSpinner, true) => {
            let diameter = node.bounds.width.min(node.bounds.height);
            if diameter > 0.0 {
                vec![format!(
                    "diameter=\"{}\"",
                    trellis_model::format_number(diameter)
                )]
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

fn model_attributes(key: &str) -> Vec<String> {
    vec![
        format!("name=\"{key}\""),
        format!("[(ngModel)]=\"formData.{key}\""),
    ]
}

/// Generated label and control lines of form widgets.
fn inner_content(ctx: &EmitContext, id: NodeId) -> Inner {
    let node = &ctx.tree[id];
    let library = ctx.options.use_widget_library;
    let Some(binding) = ctx.binding(id) else {
        return Inner::default();
    };
    let model = model_attributes(&binding.key).join(" ");
    let label = escape_text(&node.raw_name);
    let has_text_child = ctx.tree.children(id).any(|c| c.is_text());

    match (node.widget, library) {
        (WidgetKind::FormField, true) => {
            let mut prelude = Vec::new();
            if !has_text_child {
                prelude.push(format!("<mat-label>{label}</mat-label>"));
            }
            prelude.push(format!("<input matInput {model}>"));
            Inner {
                prelude,
                wrapper: None,
            }
        }
        (WidgetKind::FormField, false) => {
            let mut prelude = Vec::new();
            if !has_text_child {
                prelude.push(format!("<span>{label}</span>"));
            }
            prelude.push(format!("<input type=\"text\" {model}>"));
            Inner {
                prelude,
                wrapper: None,
            }
        }
        (WidgetKind::Select, _) => {
            let prelude = if library {
                format!("<mat-label>{label}</mat-label>")
            } else {
                format!("<span>{label}</span>")
            };
            let wrapper = child_wrapper(node.widget, library)
                .map(|tag| (format!("<{tag} {model}>"), format!("</{tag}>")));
            Inner {
                prelude: vec![prelude],
                wrapper,
            }
        }
        (WidgetKind::Checkbox, false) => Inner {
            prelude: vec![format!("<input type=\"checkbox\" {model}>")],
            wrapper: None,
        },
        (WidgetKind::Radio, false) => Inner {
            prelude: vec![format!(
                "<input type=\"radio\" value=\"{}\" {model}>",
                node.name
            )],
            wrapper: None,
        },
        _ => Inner::default(),
    }
}

/// Escape text content for an Angular template.
///
/// Braces are escaped too so design copy is never read as interpolation or
/// ICU syntax. Line breaks become `<br>`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            '\n' => out.push_str("<br>"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
