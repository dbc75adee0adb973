mod debug;
mod equalize;
mod error;
mod matching;
mod parse;
mod selectors;
mod specificity;
mod stylesheet;
mod tree;
mod value;

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use serde_json::{Value, json};

use debug::DebugLogger;
pub use equalize::{
    EqualizedSelector, EqualizedSelectorSet, Equalizer, Target, legacy_max_specificity,
};
pub use error::GridInnerError;
pub use matching::{SiblingPosition, matching_indices};
pub use parse::{SelectorList, parse_selector_list};
pub use selectors::{ALL_ITEMS, NamedSelector, Selector, SelectorRole, SelectorSet, derive_selectors};
pub use specificity::{Specificity, calculate, compare_descending};
pub use stylesheet::{
    Breakpoint, CssRule, class_selector, default_breakpoints, flatten, property_name,
    render_rules,
};
pub use tree::{BORDER_CUSTOM_VAR, BORDER_VAR, StyleBlock, StyleEntry, StyleTree, build_style};
pub use value::{BorderWidth, ColumnCount, GridValue, NONE_VALUE, default_values};

pub const DEFAULT_PREFIX: &str = "grid-inner";

/// The `grid-inner` utility for one plugin configuration.
pub struct GridInner {
    equalizer: Equalizer,
    prefix: String,
    breakpoints: Vec<Breakpoint>,
    minify: bool,
    debug: Option<Arc<DebugLogger>>,
}

#[derive(Clone)]
pub struct GridInnerBuilder {
    target: Target,
    prefix: String,
    breakpoints: Vec<Breakpoint>,
    minify: bool,
    debug_path: Option<PathBuf>,
}

/// A utility to emit: a raw value, optionally under a named breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityRequest {
    pub value: String,
    pub breakpoint: Option<String>,
}

impl UtilityRequest {
    pub fn base(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            breakpoint: None,
        }
    }

    pub fn at(breakpoint: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            breakpoint: Some(breakpoint.into()),
        }
    }
}

impl GridInner {
    pub fn builder() -> GridInnerBuilder {
        GridInnerBuilder::new()
    }

    pub fn target(&self) -> Target {
        self.equalizer.target()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn selectors(&self, cols: ColumnCount) -> EqualizedSelectorSet {
        self.equalizer.equalize(&derive_selectors(cols))
    }

    pub fn style(&self, value: &str) -> StyleTree {
        let tree = build_style(value, &self.equalizer);
        tracing::debug!(
            value,
            mode = self.target().as_str(),
            rules = tree.blocks().count(),
            "built grid-inner style"
        );
        if let Some(logger) = &self.debug {
            logger.log_event(&json!({
                "type": "grid.value",
                "value": value,
                "parsed": describe_value(&GridValue::parse(value)),
                "target": self.target().as_str(),
            }));
            for (selector, _) in tree.blocks() {
                logger.log_event(&json!({"type": "grid.rule", "selector": selector}));
            }
            logger.increment("grid.values", 1);
            logger.increment("grid.rules", tree.blocks().count() as u64);
        }
        tree
    }

    pub fn class_name(&self, value: &str, breakpoint: Option<&str>) -> String {
        match breakpoint {
            Some(name) => format!("{name}:{}-{value}", self.prefix),
            None => format!("{}-{value}", self.prefix),
        }
    }

    fn breakpoint(&self, name: &str) -> Result<&Breakpoint, GridInnerError> {
        self.breakpoints
            .iter()
            .find(|bp| bp.name == name)
            .ok_or_else(|| {
                GridInnerError::InvalidConfiguration(format!("unknown breakpoint {name:?}"))
            })
    }

    // Unknown names sort last; `utility_css` rejects them.
    fn breakpoint_rank(&self, request: &UtilityRequest) -> usize {
        match request.breakpoint.as_deref() {
            None => 0,
            Some(name) => self
                .breakpoints
                .iter()
                .position(|bp| bp.name == name)
                .map_or(usize::MAX, |idx| idx + 1),
        }
    }

    /// Unvalidated CSS for a single utility class.
    pub fn utility_css(&self, request: &UtilityRequest) -> Result<String, GridInnerError> {
        let breakpoint = request
            .breakpoint
            .as_deref()
            .map(|name| self.breakpoint(name))
            .transpose()?;
        let class = self.class_name(&request.value, request.breakpoint.as_deref());
        let rules = flatten(&self.style(&request.value), &class_selector(&class));
        Ok(render_rules(&rules, breakpoint))
    }

    /// Renders unprefixed requests first, then each breakpoint from narrowest
    /// to widest, keeping request order within a group. The whole sheet is
    /// validated (and optionally minified) with lightningcss.
    pub fn stylesheet(&self, requests: &[UtilityRequest]) -> Result<String, GridInnerError> {
        let mut ordered: Vec<&UtilityRequest> = requests.iter().collect();
        ordered.sort_by_key(|request| self.breakpoint_rank(request));
        let chunks = ordered
            .par_iter()
            .map(|request| self.utility_css(request))
            .collect::<Result<Vec<String>, GridInnerError>>()?;
        let css = chunks.concat();
        let result = stylesheet::finish(&css, self.minify);
        if let Some(logger) = &self.debug {
            logger.log_event(&json!({
                "type": "css.render",
                "utilities": requests.len(),
                "bytes": css.len(),
                "ok": result.is_ok(),
            }));
        }
        tracing::debug!(
            utilities = requests.len(),
            bytes = css.len(),
            ok = result.is_ok(),
            "rendered grid-inner stylesheet"
        );
        result
    }

    /// Every default value, unprefixed first and then under each breakpoint.
    pub fn default_stylesheet(&self) -> Result<String, GridInnerError> {
        let values = default_values();
        let mut requests: Vec<UtilityRequest> = values
            .iter()
            .map(|(_, value)| UtilityRequest::base(value.as_str()))
            .collect();
        for breakpoint in &self.breakpoints {
            requests.extend(
                values
                    .iter()
                    .map(|(_, value)| UtilityRequest::at(breakpoint.name.as_str(), value.as_str())),
            );
        }
        self.stylesheet(&requests)
    }

    pub fn emit_debug_summary(&self) {
        if let Some(logger) = &self.debug {
            logger.emit_summary("grid-inner");
            logger.flush();
        }
    }
}

fn describe_value(value: &GridValue) -> Value {
    match value {
        GridValue::None => json!(NONE_VALUE),
        GridValue::Grid { cols, border } => json!({
            "cols": cols.get(),
            "border_px": border.map(BorderWidth::px),
        }),
    }
}

impl GridInnerBuilder {
    pub fn new() -> Self {
        Self {
            target: Target::default(),
            prefix: DEFAULT_PREFIX.to_string(),
            breakpoints: default_breakpoints(),
            minify: false,
            debug_path: None,
        }
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    // Replaces a breakpoint of the same name, otherwise appends it.
    pub fn breakpoint(mut self, name: impl Into<String>, min_width_px: u32) -> Self {
        let breakpoint = Breakpoint::new(name, min_width_px);
        match self.breakpoints.iter_mut().find(|bp| bp.name == breakpoint.name) {
            Some(existing) => *existing = breakpoint,
            None => self.breakpoints.push(breakpoint),
        }
        self
    }

    pub fn clear_breakpoints(mut self) -> Self {
        self.breakpoints.clear();
        self
    }

    pub fn minify(mut self, enabled: bool) -> Self {
        self.minify = enabled;
        self
    }

    // Enable debug logging to a JSONL file for rule inspection.
    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    /// Applies a JSON options object: `target`, `prefix`, `minify`, `screens`.
    pub fn options_json(mut self, options: &str) -> Result<Self, GridInnerError> {
        let parsed: Value = serde_json::from_str(options)
            .map_err(|err| GridInnerError::InvalidConfiguration(err.to_string()))?;
        let Some(object) = parsed.as_object() else {
            return Err(GridInnerError::InvalidConfiguration(
                "options must be a JSON object".to_string(),
            ));
        };
        for (key, value) in object {
            match key.as_str() {
                "target" => {
                    let target = value.as_str().ok_or_else(|| invalid_option(key, "a string"))?;
                    self.target = target.parse()?;
                }
                "prefix" => {
                    let prefix = value.as_str().ok_or_else(|| invalid_option(key, "a string"))?;
                    self.prefix = prefix.to_string();
                }
                "minify" => {
                    self.minify = value.as_bool().ok_or_else(|| invalid_option(key, "a boolean"))?;
                }
                "screens" => {
                    let screens = value
                        .as_object()
                        .ok_or_else(|| invalid_option(key, "an object"))?;
                    self.breakpoints.clear();
                    for (name, width) in screens {
                        let width = width
                            .as_u64()
                            .and_then(|w| u32::try_from(w).ok())
                            .ok_or_else(|| invalid_option(name, "a pixel width"))?;
                        self = self.breakpoint(name.as_str(), width);
                    }
                }
                other => tracing::debug!(option = other, "ignoring unknown grid-inner option"),
            }
        }
        Ok(self)
    }

    /// Validates the configuration. Breakpoints are ordered by ascending min
    /// width so wider media blocks always come later in the sheet.
    pub fn build(mut self) -> Result<GridInner, GridInnerError> {
        if self.prefix.trim().is_empty() {
            return Err(GridInnerError::InvalidConfiguration(
                "prefix must not be empty".to_string(),
            ));
        }
        if let Some(bp) = self.breakpoints.iter().find(|bp| bp.min_width_px == 0) {
            return Err(GridInnerError::InvalidConfiguration(format!(
                "breakpoint {:?} needs a non-zero min width",
                bp.name
            )));
        }
        if let Some(bp) = self.breakpoints.iter().find(|bp| bp.name.trim().is_empty()) {
            return Err(GridInnerError::InvalidConfiguration(format!(
                "breakpoint at {}px needs a name",
                bp.min_width_px
            )));
        }
        self.breakpoints.sort_by_key(|bp| bp.min_width_px);
        let debug = match self.debug_path {
            Some(path) => Some(Arc::new(DebugLogger::new(path)?)),
            None => None,
        };
        Ok(GridInner {
            equalizer: Equalizer::for_target(self.target),
            prefix: self.prefix,
            breakpoints: self.breakpoints,
            minify: self.minify,
            debug,
        })
    }
}

impl Default for GridInnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_option(key: &str, expected: &str) -> GridInnerError {
    GridInnerError::InvalidConfiguration(format!("option {key:?} must be {expected}"))
}
