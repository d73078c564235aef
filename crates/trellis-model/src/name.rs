//! Identifier sanitization for node names.

use std::collections::HashSet;

/// Fallback identifier for names with no usable characters.
pub const FALLBACK_NAME: &str = "node";

/// Turn a free-form layer name into a kebab-case identifier.
///
/// Lower-cases, collapses every run of non-alphanumeric characters into one
/// `-`, trims separators, and falls back to `node` when nothing is left.
/// Names starting with a digit get a `node-` prefix so they stay valid CSS
/// class names.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(c);
        } else {
            pending_sep = true;
        }
    }

    if out.is_empty() {
        return FALLBACK_NAME.to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "node-");
    }
    out
}

/// Hands out sibling-unique names within one parent.
///
/// The first occurrence keeps its sanitized base; later ones get `-2`, `-3`,
/// and so on, skipping any suffix already taken.
#[derive(Debug, Default)]
pub struct NameScope {
    taken: HashSet<String>,
}

impl NameScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, raw_name: &str) -> String {
        let base = sanitize(raw_name);
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{base}-{counter}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}
