//! Behavior stub generator.
//!
//! Writes a standalone Angular component class. Imports are whatever the
//! template pass recorded; a `formData` model and an `onSubmit` handler are
//! added when the design contains form controls.

use std::collections::BTreeMap;

use crate::EmitContext;

/// Generate the component class.
pub fn generate(ctx: &EmitContext) -> String {
    let names = &ctx.names;
    let mut out = String::new();

    if ctx.needs_schema {
        out.push_str("import { Component, NO_ERRORS_SCHEMA } from '@angular/core';\n");
    } else {
        out.push_str("import { Component } from '@angular/core';\n");
    }
    let mut by_path: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for module in &ctx.imports {
        by_path.entry(module.path).or_default().push(module.symbol);
    }
    for (path, mut symbols) in by_path {
        symbols.sort_unstable();
        out.push_str(&format!(
            "import {{ {} }} from '{path}';\n",
            symbols.join(", ")
        ));
    }
    out.push('\n');

    out.push_str("@Component({\n");
    out.push_str(&format!("  selector: '{}',\n", names.selector));
    out.push_str("  standalone: true,\n");
    if !ctx.imports.is_empty() {
        let symbols: Vec<&str> = ctx.imports.iter().map(|m| m.symbol).collect();
        out.push_str(&format!("  imports: [{}],\n", symbols.join(", ")));
    }
    out.push_str(&format!("  templateUrl: './{}.component.html',\n", names.file_stem));
    out.push_str(&format!("  styleUrls: ['./{}.component.scss'],\n", names.file_stem));
    if ctx.needs_schema {
        out.push_str("  schemas: [NO_ERRORS_SCHEMA],\n");
    }
    out.push_str("})\n");

    if !ctx.has_form() {
        out.push_str(&format!("export class {} {{}}\n", names.class_name));
        return out;
    }

    out.push_str(&format!("export class {} {{\n", names.class_name));
    out.push_str("  formData = {\n");
    let mut seen = Vec::new();
    for binding in ctx.bindings.values() {
        // Radio groups share a key.
        if seen.contains(&binding.key.as_str()) {
            continue;
        }
        seen.push(binding.key.as_str());
        out.push_str(&format!("    {}: {},\n", binding.key, binding.initial));
    }
    out.push_str("  };\n\n");
    out.push_str("  onSubmit(): void {\n");
    out.push_str("    console.log('Form submitted:', this.formData);\n");
    out.push_str("  }\n");
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{html, ConvertOptions};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use trellis_model::{AnalysisConfig, DesignTree};
    use trellis_tree::RawNode;

    fn tree(nodes: serde_json::Value) -> DesignTree {
        let raw: Vec<RawNode> = serde_json::from_value(nodes).unwrap();
        trellis_model::analyze(&raw, &AnalysisConfig::default())
            .unwrap()
            .tree
    }

    fn render(tree: &DesignTree, options: &ConvertOptions) -> String {
        let mut ctx = EmitContext::new(tree, options);
        html::generate(&mut ctx);
        generate(&ctx)
    }

    fn named(name: &str) -> ConvertOptions {
        ConvertOptions {
            component_name: name.to_string(),
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn test_plain_component() {
        let tree = tree(json!([{ "id": "1", "name": "Hero", "type": "FRAME" }]));
        assert_eq!(
            render(&tree, &named("Landing Page")),
            "import { Component } from '@angular/core';\n\
             \n\
             @Component({\n  \
               selector: 'app-landing-page',\n  \
               standalone: true,\n  \
               templateUrl: './landing-page.component.html',\n  \
               styleUrls: ['./landing-page.component.scss'],\n\
             })\n\
             export class LandingPageComponent {}\n"
        );
    }

    #[test]
    fn test_form_component() {
        let tree = tree(json!([
            { "id": "1", "name": "Signup", "type": "FRAME" },
            { "id": "2", "name": "Name Input", "type": "FRAME", "parent_id": "1" },
            { "id": "3", "name": "Newsletter checkbox", "type": "FRAME", "parent_id": "1" }
        ]));
        assert_eq!(
            render(&tree, &named("signup")),
            "import { Component } from '@angular/core';\n\
             import { FormsModule } from '@angular/forms';\n\
             import { MatCheckboxModule } from '@angular/material/checkbox';\n\
             import { MatFormFieldModule } from '@angular/material/form-field';\n\
             import { MatInputModule } from '@angular/material/input';\n\
             \n\
             @Component({\n  \
               selector: 'app-signup',\n  \
               standalone: true,\n  \
               imports: [FormsModule, MatCheckboxModule, MatFormFieldModule, MatInputModule],\n  \
               templateUrl: './signup.component.html',\n  \
               styleUrls: ['./signup.component.scss'],\n\
             })\n\
             export class SignupComponent {\n  \
               formData = {\n    \
                 nameInput: '',\n    \
                 newsletterCheckbox: false,\n  \
               };\n\
             \n  \
               onSubmit(): void {\n    \
                 console.log('Form submitted:', this.formData);\n  \
               }\n\
             }\n"
        );
    }

    #[test]
    fn test_radio_group_shares_key() {
        let tree = tree(json!([
            { "id": "1", "name": "Plan", "type": "FRAME" },
            { "id": "2", "name": "Monthly radio", "type": "FRAME", "parent_id": "1" },
            { "id": "3", "name": "Yearly radio", "type": "FRAME", "parent_id": "1" }
        ]));
        let behavior = render(&tree, &named("plan"));
        assert_eq!(behavior.matches("plan: '',").count(), 1);
    }

    #[test]
    fn test_shapes_need_schema() {
        let tree = tree(json!([
            { "id": "1", "name": "Logo", "type": "FRAME" },
            { "id": "2", "name": "Mark", "type": "STAR", "parent_id": "1" }
        ]));
        let behavior = render(&tree, &named("logo"));
        assert!(behavior.starts_with("import { Component, NO_ERRORS_SCHEMA } from '@angular/core';"));
        assert!(behavior.contains("  schemas: [NO_ERRORS_SCHEMA],\n"));
    }

    #[test]
    fn test_plain_html_has_no_material_imports() {
        let tree = tree(json!([
            { "id": "1", "name": "Form", "type": "FRAME" },
            { "id": "2", "name": "Email Input", "type": "FRAME", "parent_id": "1" }
        ]));
        let options = ConvertOptions {
            use_widget_library: false,
            ..named("form")
        };
        let behavior = render(&tree, &options);
        assert!(behavior.contains("  imports: [FormsModule],\n"));
        assert!(!behavior.contains("@angular/material"));
    }
}
