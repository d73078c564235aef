//! Trellis Code Generator
//!
//! Emits an Angular standalone component from an analyzed design tree:
//! an HTML template, an SCSS stylesheet and a TypeScript class, plus the
//! design tokens the stylesheet refers to. Also hosts [`convert`], the
//! pipeline entry point that runs every stage end to end.
//!
//! ```text
//! DesignInput → flatten → analyze → emit() → CompilerOutput { markup, stylesheet, behavior }
//! ```

pub mod html;
pub mod scss;
pub mod tokens;
pub mod ts;
pub mod widgets;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};

use convert_case::{Case, Casing};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trellis_model::{AnalysisConfig, DesignTree, NodeId, StructureError, WidgetKind};
use trellis_tree::{
    parse_document, DesignInput, Flattener, TreeError, DEFAULT_NODE_LIMIT, NODE_LIMIT_CEILING,
};

pub use tokens::{DesignTokens, FontToken};
use widgets::Module;

/// Caller-facing knobs of one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Maximum number of nodes to analyze, at most [`NODE_LIMIT_CEILING`].
    pub node_limit: usize,
    /// Emit relative units and a mobile breakpoint.
    pub responsive: bool,
    /// Render widgets as Angular Material components.
    pub use_widget_library: bool,
    pub component_name: String,
    /// Drop invisible layers before analysis.
    pub skip_hidden: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            node_limit: DEFAULT_NODE_LIMIT,
            responsive: true,
            use_widget_library: true,
            component_name: "figma-component".to_string(),
            skip_hidden: false,
        }
    }
}

impl ConvertOptions {
    /// Validate the options and return the node limit to apply.
    ///
    /// Limits above the ceiling are clamped with a warning; a zero limit or a
    /// blank component name is rejected. Names with no ASCII letters or
    /// digits fall back to the `node` stem.
    pub fn effective_node_limit(&self, warnings: &mut Vec<String>) -> Result<usize, ConvertError> {
        if self.node_limit == 0 {
            return Err(ConvertError::InvalidOptions(
                "node_limit must be a positive integer".to_string(),
            ));
        }
        if self.component_name.trim().is_empty() {
            return Err(ConvertError::InvalidOptions(
                "component name must not be empty".to_string(),
            ));
        }
        if self.node_limit > NODE_LIMIT_CEILING {
            let message = format!(
                "Node limit {} exceeds the maximum of {NODE_LIMIT_CEILING}; using {NODE_LIMIT_CEILING}.",
                self.node_limit
            );
            tracing::warn!("{message}");
            warnings.push(message);
            return Ok(NODE_LIMIT_CEILING);
        }
        Ok(self.node_limit)
    }
}

/// The generated component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompilerOutput {
    pub markup: String,
    pub stylesheet: String,
    pub behavior: String,
    pub warnings: Vec<String>,
    pub tokens: DesignTokens,
}

/// Why a conversion produced no output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Input(#[from] TreeError),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    #[error("Conversion ran out of resources ({message}); retry with a lower node limit")]
    ResourceExhaustion { message: String },
}

/// Names derived from the component name.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNames {
    /// `login-form`
    pub file_stem: String,
    /// `LoginFormComponent`
    pub class_name: String,
    /// `app-login-form`
    pub selector: String,
    /// Wrapper class when the design has several roots.
    pub container: String,
}

impl ComponentNames {
    pub fn new(component_name: &str) -> Self {
        let file_stem = trellis_model::name::sanitize(component_name);
        let class_name = format!("{}Component", file_stem.to_case(Case::Pascal));
        Self {
            selector: format!("app-{file_stem}"),
            container: format!("{file_stem}-container"),
            class_name,
            file_stem,
        }
    }
}

/// A form control's binding into the component's `formData` model.
#[derive(Debug, Clone, PartialEq)]
pub struct FormBinding {
    pub key: String,
    /// TypeScript initializer.
    pub initial: &'static str,
}

/// Request-scoped state shared by the three emitters.
///
/// Built once per emission; the template pass records which modules and
/// schemas the behavior stub has to declare.
pub struct EmitContext<'a> {
    pub tree: &'a DesignTree,
    pub options: &'a ConvertOptions,
    pub names: ComponentNames,
    pub tokens: DesignTokens,
    pub bindings: IndexMap<NodeId, FormBinding>,
    pub imports: BTreeSet<Module>,
    pub needs_schema: bool,
}

impl<'a> EmitContext<'a> {
    pub fn new(tree: &'a DesignTree, options: &'a ConvertOptions) -> Self {
        let bindings = collect_bindings(tree);
        let mut imports = BTreeSet::new();
        if !bindings.is_empty() {
            imports.insert(widgets::FORMS);
        }
        Self {
            tree,
            options,
            names: ComponentNames::new(&options.component_name),
            tokens: DesignTokens::collect(tree),
            bindings,
            imports,
            needs_schema: false,
        }
    }

    pub fn binding(&self, id: NodeId) -> Option<&FormBinding> {
        self.bindings.get(&id)
    }

    pub fn has_form(&self) -> bool {
        !self.bindings.is_empty()
    }
}

/// Assign a `formData` key to every form control, in pre-order.
///
/// Radio buttons share one key per parent so they act as a group.
fn collect_bindings(tree: &DesignTree) -> IndexMap<NodeId, FormBinding> {
    let mut bindings = IndexMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut radio_groups: HashMap<Option<NodeId>, String> = HashMap::new();

    for (id, _) in tree.walk() {
        let node = &tree[id];
        if !node.widget.is_form_control() {
            continue;
        }
        let binding = match node.widget {
            WidgetKind::Radio => {
                let key = radio_groups
                    .entry(node.parent)
                    .or_insert_with(|| {
                        let group = node.parent.map(|p| tree[p].raw_name.as_str());
                        unique_key(group.unwrap_or("choice"), &mut taken)
                    })
                    .clone();
                FormBinding { key, initial: "''" }
            }
            WidgetKind::Checkbox => FormBinding {
                key: unique_key(&node.raw_name, &mut taken),
                initial: "false",
            },
            _ => FormBinding {
                key: unique_key(&node.raw_name, &mut taken),
                initial: "''",
            },
        };
        bindings.insert(id, binding);
    }
    bindings
}

fn unique_key(raw_name: &str, taken: &mut HashSet<String>) -> String {
    let mut base: String = raw_name
        .to_case(Case::Camel)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    if base.is_empty() || base.starts_with(|c: char| c.is_ascii_digit()) {
        base.insert_str(0, "field");
    }
    if taken.insert(base.clone()) {
        return base;
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}{counter}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Emit markup, stylesheet and behavior for an analyzed tree.
///
/// Pure: the same tree and options always yield byte-identical output.
pub fn emit(tree: &DesignTree, options: &ConvertOptions) -> CompilerOutput {
    let mut ctx = EmitContext::new(tree, options);
    let markup = html::generate(&mut ctx);
    let stylesheet = scss::generate(&ctx);
    let behavior = ts::generate(&ctx);
    tracing::debug!(
        nodes = tree.len(),
        imports = ctx.imports.len(),
        colors = ctx.tokens.colors.len(),
        "emitted component"
    );
    CompilerOutput {
        markup,
        stylesheet,
        behavior,
        warnings: Vec::new(),
        tokens: ctx.tokens,
    }
}

/// Run the whole pipeline on a loaded design.
///
/// Structure errors abort with no output. A panic anywhere inside the
/// pipeline is caught here and reported as [`ConvertError::ResourceExhaustion`].
pub fn convert(
    input: DesignInput,
    options: &ConvertOptions,
    config: &AnalysisConfig,
) -> Result<CompilerOutput, ConvertError> {
    let mut warnings = Vec::new();
    let limit = options.effective_node_limit(&mut warnings)?;

    let run = move || -> Result<CompilerOutput, ConvertError> {
        let flattener = Flattener::new(limit).skip_hidden(options.skip_hidden);
        let flattened = input.flatten(&flattener);
        warnings.extend(flattened.warnings);
        if flattened.nodes.is_empty() {
            let message = "Design contains no nodes.".to_string();
            tracing::warn!("{message}");
            warnings.push(message);
        }

        let built = trellis_model::analyze(&flattened.nodes, config)?;
        warnings.extend(built.warnings);

        let mut output = emit(&built.tree, options);
        output.warnings = warnings;
        Ok(output)
    };

    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "analysis aborted".to_string());
            tracing::error!(%message, "conversion aborted");
            Err(ConvertError::ResourceExhaustion { message })
        }
    }
}

/// Parse a JSON design document and convert it.
pub fn convert_source(
    source: &str,
    options: &ConvertOptions,
    config: &AnalysisConfig,
) -> Result<CompilerOutput, ConvertError> {
    let document = parse_document(source)?;
    convert(document.input, options, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use trellis_tree::{NodeType, RawNode};

    fn options(name: &str) -> ConvertOptions {
        ConvertOptions {
            component_name: name.to_string(),
            ..ConvertOptions::default()
        }
    }

    fn login_form() -> String {
        json!({
            "name": "Login",
            "document": {
                "id": "1:1", "name": "Login Card", "type": "FRAME",
                "absoluteBoundingBox": { "x": 0, "y": 0, "width": 360, "height": 300 },
                "cornerRadius": 8,
                "effects": [{ "type": "DROP_SHADOW", "offset": { "x": 0, "y": 2 }, "radius": 4 }],
                "fills": [{ "type": "SOLID", "color": { "r": 1, "g": 1, "b": 1 } }],
                "children": [
                    { "id": "1:2", "name": "Title", "type": "TEXT", "characters": "Sign in",
                      "absoluteBoundingBox": { "x": 20, "y": 20, "width": 320, "height": 36 },
                      "style": { "fontFamily": "Roboto", "fontSize": 28, "fontWeight": 700 } },
                    { "id": "1:3", "name": "Email Input", "type": "FRAME",
                      "absoluteBoundingBox": { "x": 20, "y": 80, "width": 320, "height": 48 } },
                    { "id": "1:4", "name": "Remember checkbox", "type": "FRAME",
                      "absoluteBoundingBox": { "x": 20, "y": 150, "width": 320, "height": 24 } },
                    { "id": "1:5", "name": "Submit Button", "type": "FRAME",
                      "absoluteBoundingBox": { "x": 20, "y": 232, "width": 320, "height": 48 } }
                ]
            }
        })
        .to_string()
    }

    // =========================================================================
    // Options
    // =========================================================================

    #[test]
    fn test_options_defaults_from_json() {
        let options: ConvertOptions = serde_json::from_str(r#"{ "node_limit": 120 }"#).unwrap();
        assert_eq!(options.node_limit, 120);
        assert!(options.responsive);
        assert!(options.use_widget_library);
        assert_eq!(options.component_name, "figma-component");
    }

    #[test]
    fn test_node_limit_clamped() {
        let mut warnings = Vec::new();
        let opts = ConvertOptions {
            node_limit: 2000,
            ..ConvertOptions::default()
        };
        assert_eq!(opts.effective_node_limit(&mut warnings).unwrap(), 500);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let zero = ConvertOptions {
            node_limit: 0,
            ..ConvertOptions::default()
        };
        assert!(matches!(
            zero.effective_node_limit(&mut Vec::new()),
            Err(ConvertError::InvalidOptions(_))
        ));
        assert!(matches!(
            options("  ").effective_node_limit(&mut Vec::new()),
            Err(ConvertError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_non_ascii_component_name_accepted() {
        let opts = options("日本");
        assert_eq!(opts.effective_node_limit(&mut Vec::new()).unwrap(), DEFAULT_NODE_LIMIT);

        let names = ComponentNames::new("日本");
        assert_eq!(names.file_stem, "node");
        assert_eq!(names.class_name, "NodeComponent");
        assert_eq!(names.selector, "app-node");

        let output = convert_source(
            r#"[{ "id": "1", "name": "Hero", "type": "FRAME" }]"#,
            &opts,
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert!(output.behavior.contains("export class NodeComponent {}"));
    }

    #[test]
    fn test_component_names() {
        let names = ComponentNames::new("Login Form");
        assert_eq!(names.file_stem, "login-form");
        assert_eq!(names.class_name, "LoginFormComponent");
        assert_eq!(names.selector, "app-login-form");
        assert_eq!(names.container, "login-form-container");
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    #[test]
    fn test_convert_login_form() {
        let output =
            convert_source(&login_form(), &options("login"), &AnalysisConfig::default()).unwrap();
        assert!(output.warnings.is_empty());
        assert!(output.markup.starts_with("<mat-card class=\"login-card\" data-node-id=\"1:1\">"));
        assert!(output.markup.contains("<h1 class=\"title\" data-node-id=\"1:2\">Sign in</h1>"));
        assert!(output.markup.contains("[(ngModel)]=\"formData.emailInput\""));
        assert!(output.behavior.contains("export class LoginComponent {"));
        assert!(output.behavior.contains("rememberCheckbox: false,"));
        assert!(output.stylesheet.contains("flex-direction: column;"));
    }

    #[test]
    fn test_idempotent() {
        let config = AnalysisConfig::default();
        let first = convert_source(&login_form(), &options("login"), &config).unwrap();
        let second = convert_source(&login_form(), &options("login"), &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_emit_twice_from_same_tree() {
        let raw: Vec<RawNode> = serde_json::from_value(json!([
            { "id": "1", "name": "Row", "type": "FRAME" },
            { "id": "2", "name": "A", "type": "RECTANGLE", "parent_id": "1",
              "absoluteBoundingBox": { "x": 0, "y": 0, "width": 50, "height": 50 } },
            { "id": "3", "name": "B", "type": "RECTANGLE", "parent_id": "1",
              "absoluteBoundingBox": { "x": 100, "y": 0, "width": 50, "height": 50 } }
        ]))
        .unwrap();
        let tree = trellis_model::analyze(&raw, &AnalysisConfig::default())
            .unwrap()
            .tree;
        let opts = options("row");
        assert_eq!(emit(&tree, &opts), emit(&tree, &opts));
    }

    #[test]
    fn test_truncation_warning_surfaces() {
        let children: Vec<RawNode> = (1..1000)
            .map(|i| RawNode::new(format!("n{i}"), "Dot", NodeType::Ellipse))
            .collect();
        let root = RawNode::new("root", "Canvas", NodeType::Frame).with_children(children);
        let opts = ConvertOptions {
            node_limit: 500,
            ..options("dots")
        };
        let output = convert(DesignInput::Tree(root), &opts, &AnalysisConfig::default()).unwrap();
        assert_eq!(output.markup.matches("data-node-id=").count(), 500);
        assert!(!output.warnings.is_empty());
        assert!(output.warnings[0].contains("1000"));
    }

    #[test]
    fn test_duplicate_id_produces_no_output() {
        let source = r#"[
            { "id": "1", "type": "FRAME" },
            { "id": "1", "type": "TEXT", "parent_id": "1" }
        ]"#;
        let err = convert_source(source, &options("dup"), &AnalysisConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ConvertError::Structure(StructureError::DuplicateId { id: "1".into() })
        );
    }

    #[test]
    fn test_markup_order_matches_flattening() {
        let root = RawNode::new("r", "Root", NodeType::Frame).with_children(vec![
            RawNode::new("a", "A", NodeType::Frame).with_children(vec![
                RawNode::new("a1", "A1", NodeType::Rectangle),
                RawNode::new("a2", "A2", NodeType::Rectangle),
            ]),
            RawNode::new("b", "B", NodeType::Frame)
                .with_children(vec![RawNode::new("b1", "B1", NodeType::Text)]),
        ]);
        let flattened = Flattener::new(100).flatten(root.clone());
        let expected: Vec<&str> = flattened.nodes.iter().map(|n| n.id.as_str()).collect();

        let output =
            convert(DesignInput::Tree(root), &options("order"), &AnalysisConfig::default())
                .unwrap();
        let emitted: Vec<&str> = output
            .markup
            .split("data-node-id=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .collect();
        assert_eq!(emitted, expected);
    }

    #[test]
    fn test_missing_parent_is_warning() {
        let source = r#"[
            { "id": "1", "name": "A", "type": "FRAME" },
            { "id": "2", "name": "B", "type": "FRAME", "parent_id": "404" }
        ]"#;
        let output = convert_source(source, &options("orphans"), &AnalysisConfig::default()).unwrap();
        assert_eq!(output.warnings.len(), 1);
        assert!(output.markup.starts_with("<div class=\"orphans-container\">"));
    }

    #[test]
    fn test_invalid_json_is_input_error() {
        let err = convert_source("{", &options("x"), &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Input(_)));
    }

    #[test]
    fn test_empty_design_warns() {
        let output = convert_source("[]", &options("empty"), &AnalysisConfig::default()).unwrap();
        assert_eq!(output.markup, "");
        assert_eq!(output.warnings, vec!["Design contains no nodes.".to_string()]);
    }

    #[test]
    fn test_resource_exhaustion_message() {
        let err = ConvertError::ResourceExhaustion {
            message: "capacity overflow".into(),
        };
        assert!(err.to_string().contains("lower node limit"));
    }

    #[test]
    fn test_thousand_level_document_converts() {
        let depth = 1000;
        let mut source = String::new();
        for i in 0..depth {
            source.push_str(&format!(
                r#"{{ "id": "{i}", "name": "Level", "type": "FRAME", "children": ["#
            ));
        }
        source.push_str(r#"{ "id": "leaf", "name": "Leaf", "type": "TEXT", "characters": "end" }"#);
        for _ in 0..depth {
            source.push_str("] }");
        }

        let opts = ConvertOptions {
            node_limit: NODE_LIMIT_CEILING,
            ..options("deep")
        };
        let output = convert_source(&source, &opts, &AnalysisConfig::default()).unwrap();
        assert_eq!(output.markup.matches("data-node-id=").count(), NODE_LIMIT_CEILING);
        assert_eq!(
            output.warnings,
            vec![format!(
                "Design contains {} nodes; processing only the first {NODE_LIMIT_CEILING}.",
                depth + 1
            )]
        );
    }

    #[test]
    fn test_form_keys_unique() {
        let mut taken = HashSet::new();
        assert_eq!(unique_key("Email Input", &mut taken), "emailInput");
        assert_eq!(unique_key("email input", &mut taken), "emailInput2");
        assert_eq!(unique_key("!!!", &mut taken), "field");
    }
}
