//! Stylesheet generator.
//!
//! One nested SCSS block per node, mirroring the template: the root block is
//! selected by class, descendants by `> .name` inside their parent's block,
//! with any generated wrapper element spelled out in the path. Children a
//! Material component projects into its own markup use a descendant
//! selector; options rendered in an overlay are styled at the top level by
//! node id. Nodes with nothing to declare get no block. Colors and text
//! styles refer to the design tokens emitted in the preamble.

use trellis_model::{
    format_number, Align, AnalyzedNode, Axis, FlowLayout, GridLayout, Justify, Layout, NodeId,
    Radius, TextAlign, WidgetKind,
};

use crate::widgets::{child_placement, ChildPlacement, RADIO_GROUP};
use crate::EmitContext;

/// Breakpoint below which rows stack and grids collapse to one column.
pub const MOBILE_BREAKPOINT: u32 = 768;

/// Generate the component stylesheet.
pub fn generate(ctx: &EmitContext) -> String {
    let tree = ctx.tree;
    let mut out = ctx.tokens.preamble();
    let roots = tree.roots();
    let blocks = Blocks::collect(ctx);
    let mut stack: Vec<Step> = Vec::new();

    // Children rendered in an overlay are styled from the top level.
    for (id, _) in tree.walk().into_iter().rev() {
        let node = &tree[id];
        if blocks.detached[id.0] {
            stack.push(Step::Open {
                id,
                depth: 0,
                selector: format!(".{}[data-node-id=\"{}\"]", node.name, escape_string(&node.id)),
            });
        }
    }

    let depth = if roots.len() > 1 {
        stack.push(Step::Close(0));
        1
    } else {
        0
    };
    for &root in roots.iter().rev() {
        let name = &tree[root].name;
        let selector = if depth == 0 {
            format!(".{name}")
        } else {
            format!("> .{name}")
        };
        stack.push(Step::Open {
            id: root,
            depth,
            selector,
        });
    }

    if roots.len() > 1 {
        out.push_str(&format!(".{} {{\n", ctx.names.container));
        out.push_str("  position: relative;\n");
        if ctx.options.responsive {
            let nodes = roots.iter().map(|&r| &tree[r]);
            let left = nodes.clone().map(|n| n.bounds.x).fold(f64::INFINITY, f64::min);
            let right = nodes.map(|n| n.bounds.right()).fold(f64::NEG_INFINITY, f64::max);
            out.push_str("  width: 100%;\n");
            if right > left {
                out.push_str(&format!("  max-width: {};\n", px(right - left)));
            }
            out.push_str("  margin: 0 auto;\n");
        }
    }

    while let Some(step) = stack.pop() {
        match step {
            Step::Close(depth) => out.push_str(&format!("{}}}\n", "  ".repeat(depth))),
            Step::Open {
                id,
                depth,
                selector,
            } => {
                if !blocks.has_content[id.0] {
                    continue;
                }
                let indent = "  ".repeat(depth);
                out.push_str(&format!("{indent}{selector} {{\n"));
                for declaration in &blocks.declarations[id.0] {
                    out.push_str(&format!("{indent}  {declaration}\n"));
                }
                if let Some(rule) = blocks.media[id.0] {
                    out.push_str(&format!(
                        "{indent}  @media (max-width: {MOBILE_BREAKPOINT}px) {{\n{indent}    {rule}\n{indent}  }}\n"
                    ));
                }
                stack.push(Step::Close(depth));
                let node = &tree[id];
                let placement = child_placement(node.widget, ctx.options.use_widget_library);
                for &child in node.children.iter().rev() {
                    if blocks.detached[child.0] {
                        continue;
                    }
                    stack.push(Step::Open {
                        id: child,
                        depth: depth + 1,
                        selector: child_selector(ctx, placement, child),
                    });
                }
            }
        }
    }

    out
}

/// Pending stylesheet work.
enum Step {
    Open {
        id: NodeId,
        depth: usize,
        selector: String,
    },
    Close(usize),
}

/// Per-node block contents, indexed by node id.
struct Blocks {
    declarations: Vec<Vec<String>>,
    media: Vec<Option<&'static str>>,
    /// The block or one of its nested blocks has something to say.
    has_content: Vec<bool>,
    /// Styled from the top level instead of inside the parent block.
    detached: Vec<bool>,
}

impl Blocks {
    fn collect(ctx: &EmitContext) -> Self {
        let tree = ctx.tree;
        let library = ctx.options.use_widget_library;
        let len = tree.len();
        let mut blocks = Blocks {
            declarations: vec![Vec::new(); len],
            media: vec![None; len],
            has_content: vec![false; len],
            detached: vec![false; len],
        };

        let order: Vec<NodeId> = tree.walk().into_iter().map(|(id, _)| id).collect();
        for &id in &order {
            let node = &tree[id];
            let arranges = child_placement(node.widget, library) == ChildPlacement::Direct;
            blocks.declarations[id.0] = declarations(ctx, node, arranges);
            if ctx.options.responsive && arranges {
                blocks.media[id.0] = mobile_override(&node.layout);
            }
            blocks.detached[id.0] = node
                .parent
                .is_some_and(|p| child_placement(tree[p].widget, library) == ChildPlacement::Overlay);
        }
        // Children before parents.
        for &id in order.iter().rev() {
            let i = id.0;
            let nested = tree[id]
                .children
                .iter()
                .any(|c| !blocks.detached[c.0] && blocks.has_content[c.0]);
            blocks.has_content[i] =
                nested || !blocks.declarations[i].is_empty() || blocks.media[i].is_some();
        }
        blocks
    }
}

/// Selector of a child block nested in its parent's block, following where
/// the template puts the child element.
fn child_selector(ctx: &EmitContext, placement: ChildPlacement, child: NodeId) -> String {
    let node = &ctx.tree[child];
    let class = if ctx.options.use_widget_library && node.widget == WidgetKind::Radio {
        format!("{RADIO_GROUP} > .{}", node.name)
    } else {
        format!(".{}", node.name)
    };
    match placement {
        ChildPlacement::Direct => format!("> {class}"),
        ChildPlacement::Wrapped(tag) => format!("> {tag} > {class}"),
        ChildPlacement::Projected | ChildPlacement::Overlay => class,
    }
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn mobile_override(layout: &Layout) -> Option<&'static str> {
    match layout {
        Layout::Flow(FlowLayout {
            direction: Axis::Row,
            ..
        }) => Some("flex-direction: column;"),
        Layout::Grid(_) => Some("grid-template-columns: minmax(0, 1fr);"),
        _ => None,
    }
}

/// Declarations of one node. `arranges` is false when the node's children
/// are not its direct DOM children, so flow and grid rules would not reach
/// them.
fn declarations(ctx: &EmitContext, node: &AnalyzedNode, arranges: bool) -> Vec<String> {
    let tree = ctx.tree;
    let library = ctx.options.use_widget_library;
    let responsive = ctx.options.responsive;
    let parent = node.parent.map(|p| &tree[p]);
    let absolute = parent.is_some_and(|p| {
        p.layout == Layout::Free
            && child_placement(p.widget, library) == ChildPlacement::Direct
    });
    let stretch_x = absolute
        && node
            .constraints
            .as_ref()
            .is_some_and(|c| c.stretches_horizontally());
    let stretch_y = absolute
        && node
            .constraints
            .as_ref()
            .is_some_and(|c| c.stretches_vertically());

    let mut out = Vec::new();

    // Position
    match parent {
        Some(parent) if absolute => {
            let (pb, b) = (parent.bounds, node.bounds);
            out.push("position: absolute;".to_string());
            out.push(format!("left: {};", length(b.x - pb.x, pb.width, responsive)));
            out.push(format!("top: {};", length(b.y - pb.y, pb.height, responsive)));
            if stretch_x {
                out.push(format!(
                    "right: {};",
                    length(pb.right() - b.right(), pb.width, responsive)
                ));
            }
            if stretch_y {
                out.push(format!(
                    "bottom: {};",
                    length(pb.bottom() - b.bottom(), pb.height, responsive)
                ));
            }
        }
        _ if parent.is_none() || !node.children.is_empty() => {
            out.push("position: relative;".to_string());
        }
        _ => {}
    }

    // Size
    let bounds = node.bounds;
    let in_grid = parent.is_some_and(|p| matches!(p.layout, Layout::Grid(_)));
    if bounds.width > 0.0 && !stretch_x {
        match parent {
            None if responsive => {
                out.push("width: 100%;".to_string());
                out.push(format!("max-width: {};", px(bounds.width)));
            }
            None => out.push(format!("width: {};", px(bounds.width))),
            Some(_) if node.is_text() && !absolute => {}
            Some(_) if in_grid && responsive => {}
            Some(parent) => out.push(format!(
                "width: {};",
                length(bounds.width, parent.bounds.width, responsive)
            )),
        }
    }
    if bounds.height > 0.0 && !stretch_y && !node.is_text() {
        if responsive {
            out.push(format!("min-height: {};", px(bounds.height)));
        } else {
            out.push(format!("height: {};", px(bounds.height)));
        }
    }

    // Arrangement
    match &node.layout {
        Layout::Flow(flow) if arranges => flow_declarations(flow, &mut out),
        Layout::Grid(grid) if arranges => grid_declarations(grid, &mut out),
        _ => {}
    }
    if node.widget == WidgetKind::Shape {
        out.push("display: block;".to_string());
    }

    // Paint
    let style = &node.style;
    if let Some(fill) = style.fill() {
        let property = if node.is_text() { "color" } else { "background-color" };
        out.push(format!("{property}: {};", ctx.tokens.color_var(fill)));
    }
    if let Some(stroke) = &style.stroke {
        out.push(format!(
            "border: {} {} {};",
            px(stroke.weight),
            if stroke.dashed { "dashed" } else { "solid" },
            ctx.tokens.color_var(&stroke.color)
        ));
    }
    match style.radius {
        Radius::None => {}
        Radius::Uniform(r) => out.push(format!("border-radius: {};", px(r))),
        Radius::Corners(c) => out.push(format!(
            "border-radius: {} {} {} {};",
            px(c[0]),
            px(c[1]),
            px(c[2]),
            px(c[3])
        )),
    }
    if !style.shadows.is_empty() {
        let shadows: Vec<String> = style
            .shadows
            .iter()
            .map(|s| {
                format!(
                    "{}{} {} {} {} {}",
                    if s.inset { "inset " } else { "" },
                    px(s.x),
                    px(s.y),
                    px(s.blur),
                    px(s.spread),
                    s.color.to_css()
                )
            })
            .collect();
        out.push(format!("box-shadow: {};", shadows.join(", ")));
    }
    if style.opacity < 1.0 {
        out.push(format!("opacity: {};", format_number(style.opacity)));
    }

    // Typography
    if let Some(text) = &style.text {
        if let Some(mixin) = ctx.tokens.font_mixin(text) {
            out.push(format!("@include {mixin};"));
        }
        if text.letter_spacing != 0.0 {
            out.push(format!("letter-spacing: {};", px(text.letter_spacing)));
        }
        match text.align {
            TextAlign::Left => {}
            TextAlign::Center => out.push("text-align: center;".to_string()),
            TextAlign::Right => out.push("text-align: right;".to_string()),
            TextAlign::Justified => out.push("text-align: justify;".to_string()),
        }
        if text.italic {
            out.push("font-style: italic;".to_string());
        }
    }

    out
}

fn flow_declarations(flow: &FlowLayout, out: &mut Vec<String>) {
    out.push("display: flex;".to_string());
    out.push(format!(
        "flex-direction: {};",
        match flow.direction {
            Axis::Row => "row",
            Axis::Column => "column",
        }
    ));
    if flow.gap > 0.0 {
        out.push(format!("gap: {};", px(flow.gap)));
    }
    let justify = match flow.justify {
        Justify::Start => None,
        Justify::Center => Some("center"),
        Justify::End => Some("flex-end"),
        Justify::SpaceBetween => Some("space-between"),
    };
    if let Some(justify) = justify {
        out.push(format!("justify-content: {justify};"));
    }
    out.push(format!(
        "align-items: {};",
        match flow.align {
            Align::Start => "flex-start",
            Align::Center => "center",
            Align::End => "flex-end",
        }
    ));
    let p = flow.padding;
    if !p.is_zero() {
        out.push(format!(
            "padding: {} {} {} {};",
            px(p.top),
            px(p.right),
            px(p.bottom),
            px(p.left)
        ));
    }
}

fn grid_declarations(grid: &GridLayout, out: &mut Vec<String>) {
    out.push("display: grid;".to_string());
    out.push(format!(
        "grid-template-columns: repeat({}, minmax(0, 1fr));",
        grid.columns
    ));
    out.push(format!("grid-template-rows: repeat({}, auto);", grid.rows));
    if grid.column_gap > 0.0 {
        out.push(format!("column-gap: {};", px(grid.column_gap)));
    }
    if grid.row_gap > 0.0 {
        out.push(format!("row-gap: {};", px(grid.row_gap)));
    }
}

fn px(n: f64) -> String {
    let formatted = format_number(n);
    if formatted == "0" {
        formatted
    } else {
        format!("{formatted}px")
    }
}

/// A length relative to the parent extent when responsive, in pixels otherwise.
fn length(value: f64, extent: f64, responsive: bool) -> String {
    if responsive && extent > 0.0 {
        format!("{}%", format_number(value / extent * 100.0))
    } else {
        px(value)
    }
}
