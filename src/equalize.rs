//! Rewrites role selectors so every grid rule lands at the same specificity.
//!
//! Responsive variants re-classify items between breakpoints, so a later
//! rule must always beat an earlier one for the same element. With equal
//! specificity, source order alone decides.

use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::GridInnerError;
use crate::selectors::{ALL_ITEMS, NamedSelector, SelectorRole, SelectorSet, derive_selectors};
use crate::specificity::Specificity;
use crate::value::ColumnCount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Wrap in `:where()`, which contributes no specificity.
    #[default]
    Modern,
    /// Pad with `:nth-child(n)` up to a shared maximum, for engines without `:where()`.
    Legacy,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Modern => "modern",
            Target::Legacy => "legacy",
        }
    }
}

impl FromStr for Target {
    type Err = GridInnerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "modern" => Ok(Target::Modern),
            "legacy" => Ok(Target::Legacy),
            other => Err(GridInnerError::InvalidConfiguration(format!(
                "unknown target {other:?} (expected \"modern\" or \"legacy\")"
            ))),
        }
    }
}

static LEGACY_MAX_SPECIFICITY: OnceLock<Specificity> = OnceLock::new();

/// Highest raw role specificity. Selector shapes do not vary with the column
/// count, so the one-column derivation stands in for all of them.
pub fn legacy_max_specificity() -> Specificity {
    *LEGACY_MAX_SPECIFICITY.get_or_init(|| derive_selectors(ColumnCount::MIN).max_specificity())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equalizer {
    Modern,
    Legacy { max: Specificity },
}

impl Equalizer {
    pub fn for_target(target: Target) -> Self {
        match target {
            Target::Modern => Equalizer::Modern,
            Target::Legacy => Equalizer::Legacy {
                max: legacy_max_specificity(),
            },
        }
    }

    pub fn target(&self) -> Target {
        match self {
            Equalizer::Modern => Target::Modern,
            Equalizer::Legacy { .. } => Target::Legacy,
        }
    }

    pub fn apply(&self, named: &NamedSelector) -> EqualizedSelector {
        let (selector, specificity) = match *self {
            Equalizer::Modern => (format!(":where({})", named.as_str()), Specificity::ZERO),
            Equalizer::Legacy { max } => {
                let raw = named.specificity();
                let padding = max.classes().saturating_sub(raw.classes());
                let selector = format!("{}{}", ALL_ITEMS.repeat(usize::from(padding)), named.as_str());
                (selector, raw + Specificity(0, padding, 0))
            }
        };
        EqualizedSelector {
            role: named.role,
            selector,
            specificity,
        }
    }

    pub fn equalize(&self, set: &SelectorSet) -> EqualizedSelectorSet {
        let entries = SelectorRole::ALL.map(|role| self.apply(set.get(role)));
        tracing::trace!(
            mode = self.target().as_str(),
            cols = set.cols().get(),
            "equalized grid selectors"
        );
        EqualizedSelectorSet {
            cols: set.cols(),
            entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualizedSelector {
    pub role: SelectorRole,
    pub selector: String,
    pub specificity: Specificity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualizedSelectorSet {
    cols: ColumnCount,
    entries: [EqualizedSelector; 9],
}

impl EqualizedSelectorSet {
    pub fn cols(&self) -> ColumnCount {
        self.cols
    }

    pub fn get(&self, role: SelectorRole) -> &str {
        &self.entries[role as usize].selector
    }

    pub fn entry(&self, role: SelectorRole) -> &EqualizedSelector {
        &self.entries[role as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &EqualizedSelector> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::matching_indices;
    use crate::specificity::calculate;

    fn set(n: u32) -> SelectorSet {
        derive_selectors(ColumnCount::new(n).expect("non-zero"))
    }

    #[test]
    fn target_parses_case_insensitively() {
        assert_eq!("modern".parse::<Target>().unwrap(), Target::Modern);
        assert_eq!(" Legacy ".parse::<Target>().unwrap(), Target::Legacy);
        assert!(matches!(
            "retro".parse::<Target>(),
            Err(GridInnerError::InvalidConfiguration(_))
        ));
        assert_eq!(Target::default(), Target::Modern);
    }

    #[test]
    fn legacy_max_is_six_pseudo_classes() {
        assert_eq!(legacy_max_specificity(), Specificity(0, 6, 0));
        assert_eq!(
            Equalizer::for_target(Target::Legacy),
            Equalizer::Legacy {
                max: Specificity(0, 6, 0)
            }
        );
    }

    #[test]
    fn modern_wraps_in_where() {
        let eq = Equalizer::Modern.equalize(&set(3));
        assert_eq!(eq.get(SelectorRole::AllItems), ":where(:nth-child(n))");
        assert_eq!(eq.get(SelectorRole::LastCol), ":where(:nth-child(3n+3))");
    }

    #[test]
    fn every_strategy_produces_uniform_specificity() {
        for target in [Target::Modern, Target::Legacy] {
            let equalizer = Equalizer::for_target(target);
            for n in 1..=12 {
                let eq = equalizer.equalize(&set(n));
                let parsed: Vec<Specificity> = eq
                    .iter()
                    .map(|entry| calculate(&entry.selector).expect("equalized selector parses"))
                    .collect();
                assert!(
                    parsed.windows(2).all(|w| w[0] == w[1]),
                    "{target:?} at {n} columns: {parsed:?}"
                );
                for entry in eq.iter() {
                    assert_eq!(calculate(&entry.selector).unwrap(), entry.specificity);
                }
            }
        }
    }

    #[test]
    fn legacy_prepends_padding_for_two_columns() {
        let raw = set(2);
        let eq = Equalizer::for_target(Target::Legacy).equalize(&raw);
        for role in SelectorRole::ALL {
            let named = raw.get(role);
            let k = 6 - usize::from(named.specificity().classes());
            assert_eq!(
                eq.get(role),
                format!("{}{}", ":nth-child(n)".repeat(k), named.as_str())
            );
            assert_eq!(eq.entry(role).specificity, Specificity(0, 6, 0));
        }
        assert_eq!(
            eq.get(SelectorRole::PenultimateRowOverhangLastCol),
            raw.get(SelectorRole::PenultimateRowOverhangLastCol).as_str()
        );
    }

    #[test]
    fn equalization_never_changes_matched_items() {
        let raw = set(4);
        for target in [Target::Modern, Target::Legacy] {
            let eq = Equalizer::for_target(target).equalize(&raw);
            for role in SelectorRole::ALL {
                for count in 1..=13 {
                    assert_eq!(
                        matching_indices(eq.get(role), count).unwrap(),
                        matching_indices(raw.get(role).as_str(), count).unwrap(),
                        "{role} {target:?} {count}"
                    );
                }
            }
        }
    }
}
