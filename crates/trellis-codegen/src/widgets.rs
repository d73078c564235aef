//! Widget vocabulary of the target framework.
//!
//! Maps each [`WidgetKind`] to the element that opens it in the template, in
//! two flavors: Angular Material and plain HTML. Material widgets also name
//! the NgModules the component has to import.

use std::borrow::Cow;

use trellis_model::WidgetKind;
use trellis_tree::NodeType;

/// An importable Angular module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Module {
    pub symbol: &'static str,
    pub path: &'static str,
}

const fn module(symbol: &'static str, path: &'static str) -> Module {
    Module { symbol, path }
}

pub const FORMS: Module = module("FormsModule", "@angular/forms");
const BUTTON: Module = module("MatButtonModule", "@angular/material/button");
const CARD: Module = module("MatCardModule", "@angular/material/card");
const FORM_FIELD: Module = module("MatFormFieldModule", "@angular/material/form-field");
const INPUT: Module = module("MatInputModule", "@angular/material/input");
const SELECT: Module = module("MatSelectModule", "@angular/material/select");
const CHECKBOX: Module = module("MatCheckboxModule", "@angular/material/checkbox");
const RADIO: Module = module("MatRadioModule", "@angular/material/radio");
const TOOLBAR: Module = module("MatToolbarModule", "@angular/material/toolbar");
const ICON: Module = module("MatIconModule", "@angular/material/icon");
const CHIPS: Module = module("MatChipsModule", "@angular/material/chips");
const PROGRESS_BAR: Module = module("MatProgressBarModule", "@angular/material/progress-bar");
const PROGRESS_SPINNER: Module =
    module("MatProgressSpinnerModule", "@angular/material/progress-spinner");

/// Opening element of one widget flavor: tag plus fixed attributes.
#[derive(Debug, Clone, Copy)]
pub struct ElementSpec {
    pub tag: &'static str,
    pub attributes: &'static [&'static str],
}

const fn el(tag: &'static str, attributes: &'static [&'static str]) -> ElementSpec {
    ElementSpec { tag, attributes }
}

/// Both flavors of a widget and the modules the Material flavor needs.
#[derive(Debug, Clone, Copy)]
pub struct WidgetSpec {
    pub material: ElementSpec,
    pub plain: ElementSpec,
    pub modules: &'static [Module],
}

const fn spec(material: ElementSpec, plain: ElementSpec, modules: &'static [Module]) -> WidgetSpec {
    WidgetSpec {
        material,
        plain,
        modules,
    }
}

pub fn widget_spec(widget: WidgetKind) -> WidgetSpec {
    const BUTTON_TYPE: &[&str] = &["type=\"button\""];
    match widget {
        WidgetKind::Container | WidgetKind::Shape => spec(el("div", &[]), el("div", &[]), &[]),
        WidgetKind::Text => spec(el("span", &[]), el("span", &[]), &[]),
        WidgetKind::Heading1 => spec(el("h1", &[]), el("h1", &[]), &[]),
        WidgetKind::Heading2 => spec(el("h2", &[]), el("h2", &[]), &[]),
        WidgetKind::Heading3 => spec(el("h3", &[]), el("h3", &[]), &[]),
        WidgetKind::Emphasis => spec(el("strong", &[]), el("strong", &[]), &[]),
        WidgetKind::Paragraph => spec(el("p", &[]), el("p", &[]), &[]),
        WidgetKind::Button => spec(
            el("button", &["mat-button", "type=\"button\""]),
            el("button", BUTTON_TYPE),
            &[BUTTON],
        ),
        WidgetKind::RaisedButton => spec(
            el(
                "button",
                &["mat-raised-button", "color=\"primary\"", "type=\"button\""],
            ),
            el("button", BUTTON_TYPE),
            &[BUTTON],
        ),
        WidgetKind::Card => spec(el("mat-card", &[]), el("article", &[]), &[CARD]),
        WidgetKind::FormField => spec(
            el("mat-form-field", &["appearance=\"outline\""]),
            el("label", &[]),
            &[FORM_FIELD, INPUT],
        ),
        WidgetKind::Select => spec(
            el("mat-form-field", &["appearance=\"outline\""]),
            el("label", &[]),
            &[FORM_FIELD, SELECT],
        ),
        WidgetKind::Checkbox => spec(el("mat-checkbox", &[]), el("label", &[]), &[CHECKBOX]),
        WidgetKind::Radio => spec(el("mat-radio-button", &[]), el("label", &[]), &[RADIO]),
        WidgetKind::Toolbar => spec(el("mat-toolbar", &[]), el("nav", &[]), &[TOOLBAR]),
        WidgetKind::Icon => spec(el("mat-icon", &[]), el("span", &["role=\"img\""]), &[ICON]),
        WidgetKind::Chip => spec(el("mat-chip", &[]), el("span", &[]), &[CHIPS]),
        WidgetKind::ProgressBar => spec(
            el("mat-progress-bar", &["mode=\"indeterminate\""]),
            el("progress", &[]),
            &[PROGRESS_BAR],
        ),
        WidgetKind::ProgressSpinner => spec(
            el("mat-progress-spinner", &["mode=\"indeterminate\""]),
            el("div", &["role=\"progressbar\""]),
            &[PROGRESS_SPINNER],
        ),
    }
}

/// Tag for a widget, honoring the raw type fallback for vector shapes.
pub fn tag_name(widget: WidgetKind, node_type: &NodeType, use_library: bool) -> Cow<'static, str> {
    if widget == WidgetKind::Shape {
        return Cow::Owned(node_type.as_str().to_lowercase().replace('_', "-"));
    }
    let spec = widget_spec(widget);
    Cow::Borrowed(if use_library {
        spec.material.tag
    } else {
        spec.plain.tag
    })
}

/// Tag of a text element placed directly inside a widget that gives its
/// text children a role of their own (select options, field labels).
pub fn nested_text_tag(parent: WidgetKind, first_text: bool, use_library: bool) -> Option<&'static str> {
    match (parent, use_library) {
        (WidgetKind::Select, true) => Some("mat-option"),
        (WidgetKind::Select, false) => Some("option"),
        (WidgetKind::FormField, true) if first_text => Some("mat-label"),
        (WidgetKind::FormField, true) => Some("mat-hint"),
        _ => None,
    }
}

/// Element generated around the children of a widget, if any.
pub fn child_wrapper(widget: WidgetKind, use_library: bool) -> Option<&'static str> {
    match (widget, use_library) {
        (WidgetKind::Select, true) => Some("mat-select"),
        (WidgetKind::Select, false) => Some("select"),
        _ => None,
    }
}

/// Group element Material radio buttons are wrapped in.
pub const RADIO_GROUP: &str = "mat-radio-group";

/// Where a widget's children end up in the rendered DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPlacement {
    /// Direct element children of the widget.
    Direct,
    /// Direct children of a generated wrapper element.
    Wrapped(&'static str),
    /// Projected by the component into its own internal elements.
    Projected,
    /// Rendered by the component in an overlay outside its host.
    Overlay,
}

pub fn child_placement(widget: WidgetKind, use_library: bool) -> ChildPlacement {
    match (widget, use_library) {
        (WidgetKind::Select, true) => ChildPlacement::Overlay,
        (
            WidgetKind::Button
            | WidgetKind::RaisedButton
            | WidgetKind::FormField
            | WidgetKind::Checkbox
            | WidgetKind::Radio
            | WidgetKind::Chip,
            true,
        ) => ChildPlacement::Projected,
        _ => match child_wrapper(widget, use_library) {
            Some(tag) => ChildPlacement::Wrapped(tag),
            None => ChildPlacement::Direct,
        },
    }
}

/// Material icon ligature from a layer name: `Search Icon` → `search`.
pub fn icon_ligature(raw_name: &str) -> String {
    let words: Vec<String> = raw_name
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty() && *w != "icon" && *w != "ic")
        .map(str::to_string)
        .collect();
    if words.is_empty() {
        "image".to_string()
    } else {
        words.join("_")
    }
}
