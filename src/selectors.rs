//! Structural selectors for every geometric edge case of an `N`-column grid.
//!
//! The total number of items is unknown when these are built, so every role
//! is expressed purely with `nth-child` arithmetic, sibling combinators and
//! negation.

use std::fmt;

use crate::specificity::Specificity;
use crate::value::ColumnCount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectorRole {
    AllItems,
    FirstCol,
    LastCol,
    FirstRow,
    FirstInLastRow,
    OthersInLastRow,
    LastIfNotLastCol,
    PenultimateRowOverhangs,
    PenultimateRowOverhangLastCol,
}

impl SelectorRole {
    pub const ALL: [SelectorRole; 9] = [
        SelectorRole::AllItems,
        SelectorRole::FirstCol,
        SelectorRole::LastCol,
        SelectorRole::FirstRow,
        SelectorRole::FirstInLastRow,
        SelectorRole::OthersInLastRow,
        SelectorRole::LastIfNotLastCol,
        SelectorRole::PenultimateRowOverhangs,
        SelectorRole::PenultimateRowOverhangLastCol,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SelectorRole::AllItems => "allItems",
            SelectorRole::FirstCol => "firstCol",
            SelectorRole::LastCol => "lastCol",
            SelectorRole::FirstRow => "firstRow",
            SelectorRole::FirstInLastRow => "firstInLastRow",
            SelectorRole::OthersInLastRow => "othersInLastRow",
            SelectorRole::LastIfNotLastCol => "lastIfNotLastCol",
            SelectorRole::PenultimateRowOverhangs => "penultimateRowOverhangs",
            SelectorRole::PenultimateRowOverhangLastCol => "penultimateRowOverhangLastCol",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SelectorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A selector under construction. Tracks its own specificity so composition
/// never has to re-parse text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    text: String,
    specificity: Specificity,
    compound: bool,
}

impl Selector {
    /// A single pseudo-class such as `:last-child`. The text is trusted to
    /// carry one class-level specificity.
    fn pseudo(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            specificity: Specificity::CLASS,
            compound: true,
        }
    }

    pub fn all_items() -> Self {
        Self::pseudo(ALL_ITEMS)
    }

    pub fn last_child() -> Self {
        Self::pseudo(":last-child")
    }

    pub fn nth_child(formula: &str) -> Self {
        Self::pseudo(format!(":nth-child({formula})"))
    }

    pub fn nth_last_child(formula: &str) -> Self {
        Self::pseudo(format!(":nth-last-child({formula})"))
    }

    /// Both selectors must match the same element.
    pub fn and(&self, other: &Selector) -> Selector {
        let other_text = if other.compound {
            other.text.clone()
        } else {
            format!(":is({})", other.text)
        };
        Selector {
            text: format!("{}{}", self.text, other_text),
            specificity: self.specificity + other.specificity,
            compound: self.compound,
        }
    }

    pub fn and_not(&self, other: &Selector) -> Selector {
        Selector {
            text: format!("{}:not({})", self.text, other.text),
            specificity: self.specificity + other.specificity,
            compound: self.compound,
        }
    }

    /// Every element that follows a match of `self` among its siblings.
    pub fn later_siblings(&self) -> Selector {
        Selector {
            text: format!("{} ~ *", self.text),
            specificity: self.specificity,
            compound: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSelector {
    pub role: SelectorRole,
    pub selector: Selector,
}

impl NamedSelector {
    pub fn as_str(&self) -> &str {
        self.selector.as_str()
    }

    pub fn specificity(&self) -> Specificity {
        self.selector.specificity()
    }
}

/// The nine role selectors for one column count, indexed by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    cols: ColumnCount,
    entries: [NamedSelector; 9],
}

impl SelectorSet {
    pub fn cols(&self) -> ColumnCount {
        self.cols
    }

    pub fn get(&self, role: SelectorRole) -> &NamedSelector {
        &self.entries[role.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedSelector> {
        self.entries.iter()
    }

    pub fn max_specificity(&self) -> Specificity {
        self.iter()
            .map(NamedSelector::specificity)
            .max()
            .unwrap_or_default()
    }
}

/// Matches every item; also the padding term for legacy equalization.
pub const ALL_ITEMS: &str = ":nth-child(n)";

pub fn derive_selectors(cols: ColumnCount) -> SelectorSet {
    let n = cols.get();

    let all_items = Selector::all_items();
    let last_x_in_grid = Selector::nth_last_child(&format!("-n + {n}"));
    let first_col = Selector::nth_child(&format!("{n}n + 1"));
    // No spaces: keeps the text distinct from `first_col` when n == 1.
    let last_col = Selector::nth_child(&format!("{n}n+{n}"));
    let first_row = Selector::nth_child(&format!("-n + {n}"));

    let first_in_last_row = first_col.and(&last_x_in_grid);
    let others_in_last_row = first_in_last_row.later_siblings();
    let last_if_not_last_col = Selector::last_child().and_not(&last_col);
    let penultimate_row_overhangs = last_x_in_grid
        .and_not(&first_in_last_row)
        .and_not(&others_in_last_row);
    let penultimate_row_overhang_last_col = penultimate_row_overhangs.and(&last_col);

    let named = |role, selector| NamedSelector { role, selector };
    SelectorSet {
        cols,
        entries: [
            named(SelectorRole::AllItems, all_items),
            named(SelectorRole::FirstCol, first_col),
            named(SelectorRole::LastCol, last_col),
            named(SelectorRole::FirstRow, first_row),
            named(SelectorRole::FirstInLastRow, first_in_last_row),
            named(SelectorRole::OthersInLastRow, others_in_last_row),
            named(SelectorRole::LastIfNotLastCol, last_if_not_last_col),
            named(SelectorRole::PenultimateRowOverhangs, penultimate_row_overhangs),
            named(
                SelectorRole::PenultimateRowOverhangLastCol,
                penultimate_row_overhang_last_col,
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::matching_indices;
    use crate::specificity::calculate;

    fn cols(n: u32) -> ColumnCount {
        ColumnCount::new(n).expect("non-zero")
    }

    #[test]
    fn builder_specificity_agrees_with_parsed_text() {
        let last_col = Selector::nth_child("4n+4");
        let built = [
            Selector::all_items(),
            Selector::last_child(),
            Selector::nth_last_child("-n + 4"),
            Selector::last_child().and_not(&last_col),
            Selector::nth_child("4n + 1")
                .and(&Selector::nth_last_child("-n + 4"))
                .later_siblings(),
            Selector::all_items().and(&last_col.later_siblings()),
        ];
        for selector in built {
            assert_eq!(
                calculate(selector.as_str()).expect("parses"),
                selector.specificity(),
                "{selector}"
            );
        }
    }

    fn matched(set: &SelectorSet, role: SelectorRole, count: usize) -> Vec<usize> {
        matching_indices(set.get(role).as_str(), count).expect("derived selector parses")
    }

    #[test]
    fn three_columns_text() {
        let set = derive_selectors(cols(3));
        let text = |role| set.get(role).as_str().to_string();
        assert_eq!(text(SelectorRole::AllItems), ":nth-child(n)");
        assert_eq!(text(SelectorRole::FirstCol), ":nth-child(3n + 1)");
        assert_eq!(text(SelectorRole::LastCol), ":nth-child(3n+3)");
        assert_eq!(text(SelectorRole::FirstRow), ":nth-child(-n + 3)");
        assert_eq!(
            text(SelectorRole::FirstInLastRow),
            ":nth-child(3n + 1):nth-last-child(-n + 3)"
        );
        assert_eq!(
            text(SelectorRole::OthersInLastRow),
            ":nth-child(3n + 1):nth-last-child(-n + 3) ~ *"
        );
        assert_eq!(
            text(SelectorRole::LastIfNotLastCol),
            ":last-child:not(:nth-child(3n+3))"
        );
        assert_eq!(
            text(SelectorRole::PenultimateRowOverhangs),
            ":nth-last-child(-n + 3):not(:nth-child(3n + 1):nth-last-child(-n + 3)):not(:nth-child(3n + 1):nth-last-child(-n + 3) ~ *)"
        );
        assert_eq!(
            text(SelectorRole::PenultimateRowOverhangLastCol),
            format!("{}:nth-child(3n+3)", text(SelectorRole::PenultimateRowOverhangs))
        );
    }

    #[test]
    fn tracked_specificity_agrees_with_parsed() {
        for n in 1..=12 {
            let set = derive_selectors(cols(n));
            for entry in set.iter() {
                assert_eq!(
                    calculate(entry.as_str()).unwrap(),
                    entry.specificity(),
                    "{} at {n} columns",
                    entry.role
                );
            }
        }
    }

    #[test]
    fn raw_specificity_is_independent_of_column_count() {
        let expected = [1, 1, 1, 1, 2, 2, 2, 5, 6];
        for n in [1, 2, 5, 12] {
            let set = derive_selectors(cols(n));
            let classes: Vec<u16> = set.iter().map(|s| s.specificity().classes()).collect();
            assert_eq!(classes, expected);
            assert_eq!(set.max_specificity(), Specificity(0, 6, 0));
        }
    }

    #[test]
    fn eight_items_in_three_columns() {
        let set = derive_selectors(cols(3));
        assert_eq!(matched(&set, SelectorRole::AllItems, 8), (1..=8).collect::<Vec<_>>());
        assert_eq!(matched(&set, SelectorRole::FirstCol, 8), vec![1, 4, 7]);
        assert_eq!(matched(&set, SelectorRole::LastCol, 8), vec![3, 6]);
        assert_eq!(matched(&set, SelectorRole::FirstRow, 8), vec![1, 2, 3]);
        assert_eq!(matched(&set, SelectorRole::FirstInLastRow, 8), vec![7]);
        assert_eq!(matched(&set, SelectorRole::OthersInLastRow, 8), vec![8]);
        assert_eq!(matched(&set, SelectorRole::LastIfNotLastCol, 8), vec![8]);
        assert_eq!(matched(&set, SelectorRole::PenultimateRowOverhangs, 8), vec![6]);
        assert_eq!(
            matched(&set, SelectorRole::PenultimateRowOverhangLastCol, 8),
            vec![6]
        );
    }

    #[test]
    fn seven_items_in_three_columns() {
        let set = derive_selectors(cols(3));
        assert_eq!(matched(&set, SelectorRole::FirstInLastRow, 7), vec![7]);
        assert!(matched(&set, SelectorRole::OthersInLastRow, 7).is_empty());
        assert_eq!(matched(&set, SelectorRole::LastIfNotLastCol, 7), vec![7]);
        assert_eq!(matched(&set, SelectorRole::PenultimateRowOverhangs, 7), vec![5, 6]);
        assert_eq!(
            matched(&set, SelectorRole::PenultimateRowOverhangLastCol, 7),
            vec![6]
        );
    }

    #[test]
    fn full_grid_has_no_overhangs() {
        let set = derive_selectors(cols(3));
        assert_eq!(matched(&set, SelectorRole::FirstInLastRow, 9), vec![7]);
        assert_eq!(matched(&set, SelectorRole::OthersInLastRow, 9), vec![8, 9]);
        assert!(matched(&set, SelectorRole::LastIfNotLastCol, 9).is_empty());
        assert!(matched(&set, SelectorRole::PenultimateRowOverhangs, 9).is_empty());
        assert!(matched(&set, SelectorRole::PenultimateRowOverhangLastCol, 9).is_empty());
    }

    #[test]
    fn single_short_row() {
        let set = derive_selectors(cols(3));
        assert_eq!(matched(&set, SelectorRole::FirstRow, 2), vec![1, 2]);
        assert_eq!(matched(&set, SelectorRole::FirstInLastRow, 2), vec![1]);
        assert_eq!(matched(&set, SelectorRole::OthersInLastRow, 2), vec![2]);
        assert_eq!(matched(&set, SelectorRole::LastIfNotLastCol, 2), vec![2]);
        assert!(matched(&set, SelectorRole::PenultimateRowOverhangs, 2).is_empty());
    }

    #[test]
    fn one_column_roles_coincide_without_collapsing() {
        let set = derive_selectors(cols(1));
        assert_ne!(
            set.get(SelectorRole::FirstCol).as_str(),
            set.get(SelectorRole::LastCol).as_str()
        );
        for count in 1..=6 {
            let all: Vec<usize> = (1..=count).collect();
            assert_eq!(matched(&set, SelectorRole::FirstCol, count), all);
            assert_eq!(matched(&set, SelectorRole::LastCol, count), all);
            assert_eq!(matched(&set, SelectorRole::FirstInLastRow, count), vec![count]);
            assert!(matched(&set, SelectorRole::OthersInLastRow, count).is_empty());
            assert!(matched(&set, SelectorRole::LastIfNotLastCol, count).is_empty());
            assert!(matched(&set, SelectorRole::PenultimateRowOverhangs, count).is_empty());
            assert!(
                matched(&set, SelectorRole::PenultimateRowOverhangLastCol, count).is_empty()
            );
        }
    }

    #[test]
    fn overhangs_are_exactly_cells_without_a_cell_below() {
        for n in 1..=6usize {
            let set = derive_selectors(cols(n as u32));
            for count in 1..=20usize {
                let last_row_start = (count - 1) / n * n + 1;
                let expected: Vec<usize> = (1..=count)
                    .filter(|&i| i < last_row_start && i + n > count)
                    .collect();
                assert_eq!(
                    matched(&set, SelectorRole::PenultimateRowOverhangs, count),
                    expected,
                    "{n} columns, {count} items"
                );
                let expected_last_col: Vec<usize> =
                    expected.iter().copied().filter(|i| i % n == 0).collect();
                assert_eq!(
                    matched(&set, SelectorRole::PenultimateRowOverhangLastCol, count),
                    expected_last_col,
                    "{n} columns, {count} items"
                );
            }
        }
    }

    #[test]
    fn selector_role_names() {
        let names: Vec<&str> = SelectorRole::ALL.iter().map(|r| r.name()).collect();
        assert_eq!(names[0], "allItems");
        assert_eq!(names[8], "penultimateRowOverhangLastCol");
        assert_eq!(SelectorRole::ALL.len(), 9);
    }
}
