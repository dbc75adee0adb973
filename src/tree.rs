//! The nested style tree for one `grid-inner` value.
//!
//! Top-level entries style the grid wrapper; `& > ...` entries style its
//! items; `&::after` entries style the decorative pseudo-element that doubles
//! a half-border where a neighbouring cell is missing.

use serde_json::{Map, Value};

use crate::equalize::{EqualizedSelectorSet, Equalizer};
use crate::selectors::{SelectorRole, derive_selectors};
use crate::value::{BorderWidth, ColumnCount, GridValue};

pub const BORDER_CUSTOM_VAR: &str = "--tw-grid-inner-border-custom";
pub const BORDER_VAR: &str = "--tw-grid-inner-border";
pub const DEFAULT_BORDER_WIDTH: &str = "2px";
pub const AFTER: &str = "&::after";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleEntry {
    Value(String),
    Block(StyleBlock),
}

/// Ordered entries; later entries win and duplicate keys are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleBlock {
    entries: Vec<(String, StyleEntry)>,
}

pub type StyleTree = StyleBlock;

impl StyleBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decl(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_value(property, value);
        self
    }

    pub fn nest(mut self, key: impl Into<String>, block: StyleBlock) -> Self {
        self.push_block(key, block);
        self
    }

    pub fn push_value(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.entries
            .push((property.into(), StyleEntry::Value(value.into())));
    }

    pub fn push_block(&mut self, key: impl Into<String>, block: StyleBlock) {
        self.entries.push((key.into(), StyleEntry::Block(block)));
    }

    pub fn get(&self, key: &str) -> Option<&StyleEntry> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, entry)| entry)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            StyleEntry::Value(value) => Some(value),
            StyleEntry::Block(_) => None,
        }
    }

    pub fn block(&self, key: &str) -> Option<&StyleBlock> {
        match self.get(key)? {
            StyleEntry::Block(block) => Some(block),
            StyleEntry::Value(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter_map(|(key, entry)| match entry {
            StyleEntry::Value(value) => Some((key, value.as_str())),
            StyleEntry::Block(_) => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = (&str, &StyleBlock)> {
        self.iter().filter_map(|(key, entry)| match entry {
            StyleEntry::Block(block) => Some((key, block)),
            StyleEntry::Value(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// CSS-in-JS shaped JSON. Duplicate keys collapse to the last entry.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, entry) in &self.entries {
            let value = match entry {
                StyleEntry::Value(value) => Value::String(value.clone()),
                StyleEntry::Block(block) => block.to_json(),
            };
            map.insert(key.clone(), value);
        }
        Value::Object(map)
    }
}

pub fn item_key(selector: &str) -> String {
    format!("& > {selector}")
}

fn half_border() -> String {
    format!("calc(var({BORDER_VAR}) / 2)")
}

fn negative_half_border() -> String {
    format!("calc(var({BORDER_VAR}) / -2)")
}

fn beyond_edge() -> String {
    format!("calc(100% + var({BORDER_VAR}) / 2)")
}

fn hidden_after() -> StyleBlock {
    StyleBlock::new().decl("display", "none")
}

pub fn build_style(raw: &str, equalizer: &Equalizer) -> StyleTree {
    match GridValue::parse(raw) {
        GridValue::None => build_reset(equalizer),
        GridValue::Grid { cols, border } => {
            let selectors = equalizer.equalize(&derive_selectors(cols));
            build_grid(&selectors, border)
        }
    }
}

/// Cancels an earlier breakpoint's grid borders through the same equalized
/// all-items selector, so it wins by source order.
pub fn build_reset(equalizer: &Equalizer) -> StyleTree {
    let all_items = equalizer.apply(derive_selectors(ColumnCount::MIN).get(SelectorRole::AllItems));
    StyleBlock::new()
        .decl("marginLeft", "0px")
        .decl("marginRight", "0px")
        .nest(
            item_key(&all_items.selector),
            StyleBlock::new()
                .decl("margin", "0px")
                .decl("borderWidth", "0px")
                .decl("borderColor", "currentcolor")
                .decl("borderStyle", "solid")
                .decl("gridColumn", "auto")
                .decl("position", "static")
                .nest(AFTER, hidden_after()),
        )
}

pub fn build_grid(selectors: &EqualizedSelectorSet, border: Option<BorderWidth>) -> StyleTree {
    let cols = selectors.cols();
    let key = |role| item_key(selectors.get(role));

    let mut tree = StyleBlock::new();
    if let Some(border) = border {
        tree.push_value(BORDER_CUSTOM_VAR, border.to_css());
    }
    tree.push_value(
        BORDER_VAR,
        format!("var({BORDER_CUSTOM_VAR}, {DEFAULT_BORDER_WIDTH})"),
    );
    tree.push_value("display", "grid");
    tree.push_value("gap", "0px");
    tree.push_value("gridTemplateColumns", format!("repeat({cols},minmax(0,1fr))"));
    tree.push_value("marginLeft", format!("calc(var({BORDER_VAR})/-2)"));
    tree.push_value("marginRight", format!("calc(var({BORDER_VAR})/-2)"));

    // Order matters: every key has the same specificity.
    tree.push_block(
        key(SelectorRole::AllItems),
        StyleBlock::new()
            .decl("margin", "0px")
            .decl("borderWidth", half_border())
            .decl("borderColor", "inherit")
            .decl("borderStyle", "inherit")
            .decl("gridColumn", "span 1 / span 1")
            .decl("position", "static")
            .nest(AFTER, hidden_after()),
    );
    tree.push_block(
        key(SelectorRole::FirstRow),
        StyleBlock::new().decl("borderTopWidth", "0px"),
    );
    tree.push_block(
        key(SelectorRole::FirstInLastRow),
        StyleBlock::new().decl("borderBottomWidth", "0px"),
    );
    tree.push_block(
        key(SelectorRole::OthersInLastRow),
        StyleBlock::new().decl("borderBottomWidth", "0px"),
    );
    tree.push_block(
        key(SelectorRole::FirstCol),
        StyleBlock::new()
            .decl("borderLeftWidth", "0px")
            .decl("marginLeft", format!("calc(var({BORDER_VAR})/2)")),
    );
    tree.push_block(
        key(SelectorRole::LastCol),
        StyleBlock::new()
            .decl("borderRightWidth", "0px")
            .decl("marginRight", format!("calc(var({BORDER_VAR})/2)")),
    );
    tree.push_block(
        key(SelectorRole::LastIfNotLastCol),
        StyleBlock::new().decl("position", "relative").nest(
            AFTER,
            StyleBlock::new()
                .decl("content", "''")
                .decl("borderLeftWidth", half_border())
                .decl("borderLeftStyle", "inherit")
                .decl("borderLeftColor", "inherit")
                .decl("display", "block")
                .decl("position", "absolute")
                .decl("left", beyond_edge())
                .decl("top", negative_half_border())
                .decl("bottom", "0"),
        ),
    );
    tree.push_block(
        key(SelectorRole::PenultimateRowOverhangs),
        StyleBlock::new().decl("position", "relative").nest(
            AFTER,
            StyleBlock::new()
                .decl("content", "''")
                .decl("borderTopWidth", half_border())
                .decl("borderTopStyle", "inherit")
                .decl("borderTopColor", "inherit")
                .decl("display", "block")
                .decl("position", "absolute")
                .decl("left", negative_half_border())
                .decl("right", negative_half_border())
                .decl("top", beyond_edge()),
        ),
    );
    tree.push_block(
        key(SelectorRole::PenultimateRowOverhangLastCol),
        StyleBlock::new().nest(AFTER, StyleBlock::new().decl("right", "0")),
    );
    tree
}
