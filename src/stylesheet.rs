//! Expands style trees into CSS text and runs the result through lightningcss.

use std::fmt::Write as _;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

use crate::error::GridInnerError;
use crate::tree::{StyleBlock, StyleEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub name: String,
    pub min_width_px: u32,
}

impl Breakpoint {
    pub fn new(name: impl Into<String>, min_width_px: u32) -> Self {
        Self {
            name: name.into(),
            min_width_px,
        }
    }

    pub fn media_query(&self) -> String {
        format!("(min-width: {}px)", self.min_width_px)
    }
}

pub fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint::new("sm", 640),
        Breakpoint::new("md", 768),
        Breakpoint::new("lg", 1024),
        Breakpoint::new("xl", 1280),
        Breakpoint::new("2xl", 1536),
    ]
}

/// One flat rule: a fully resolved selector and its declarations in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    pub declarations: Vec<(String, String)>,
}

/// Flattens nesting depth-first. A rule precedes the rules nested inside it.
pub fn flatten(tree: &StyleBlock, selector: &str) -> Vec<CssRule> {
    let mut rules = Vec::new();
    flatten_into(tree, selector, &mut rules);
    rules
}

fn flatten_into(block: &StyleBlock, selector: &str, rules: &mut Vec<CssRule>) {
    let declarations: Vec<(String, String)> = block
        .declarations()
        .map(|(property, value)| (property_name(property), value.to_string()))
        .collect();
    if !declarations.is_empty() {
        rules.push(CssRule {
            selector: selector.to_string(),
            declarations,
        });
    }
    for (key, entry) in block.iter() {
        if let StyleEntry::Block(nested) = entry {
            flatten_into(nested, &resolve_nested(selector, key), rules);
        }
    }
}

pub fn resolve_nested(parent: &str, key: &str) -> String {
    if key.contains('&') {
        key.replace('&', parent)
    } else {
        format!("{parent} {key}")
    }
}

/// `borderTopWidth` -> `border-top-width`; custom properties pass through.
pub fn property_name(key: &str) -> String {
    if key.starts_with("--") {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Class selector for a raw class name, escaping characters such as `:`.
pub fn class_selector(class_name: &str) -> String {
    let mut out = String::from(".");
    for (idx, ch) in class_name.chars().enumerate() {
        if idx == 0 && ch.is_ascii_digit() {
            let _ = write!(out, "\\{:x} ", u32::from(ch));
        } else if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii() {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}

pub fn render_rules(rules: &[CssRule], breakpoint: Option<&Breakpoint>) -> String {
    let indent = if breakpoint.is_some() { "  " } else { "" };
    let mut out = String::new();
    if let Some(breakpoint) = breakpoint {
        let _ = writeln!(out, "@media {} {{", breakpoint.media_query());
    }
    for rule in rules {
        let _ = writeln!(out, "{indent}{} {{", rule.selector);
        for (property, value) in &rule.declarations {
            let _ = writeln!(out, "{indent}  {property}: {value};");
        }
        let _ = writeln!(out, "{indent}}}");
    }
    if breakpoint.is_some() {
        out.push_str("}\n");
    }
    out
}

/// Parses `css` with lightningcss and prints it back, minified if requested.
pub fn finish(css: &str, minify: bool) -> Result<String, GridInnerError> {
    let sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|err| GridInnerError::Css(err.to_string()))?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify,
            ..PrinterOptions::default()
        })
        .map_err(|err| GridInnerError::Css(err.to_string()))?;
    Ok(printed.code)
}
