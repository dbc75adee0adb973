use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

use crate::error::GridInnerError;
use crate::parse::{
    ComplexSelector, CompoundSelector, PseudoClass, SelectorList, SimpleSelector,
    parse_selector_list,
};

/// `(ids, classes/attributes/pseudo-classes, types/pseudo-elements)`, compared lexicographically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u16, pub u16, pub u16);

impl Specificity {
    pub const ZERO: Specificity = Specificity(0, 0, 0);
    pub const CLASS: Specificity = Specificity(0, 1, 0);

    pub fn ids(self) -> u16 {
        self.0
    }

    pub fn classes(self) -> u16 {
        self.1
    }

    pub fn types(self) -> u16 {
        self.2
    }
}

impl Add for Specificity {
    type Output = Specificity;

    fn add(self, rhs: Self) -> Self {
        Specificity(
            self.0.saturating_add(rhs.0),
            self.1.saturating_add(rhs.1),
            self.2.saturating_add(rhs.2),
        )
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.0, self.1, self.2)
    }
}

/// Specificity of a selector list: the highest of its members.
pub fn calculate(selector: &str) -> Result<Specificity, GridInnerError> {
    Ok(parse_selector_list(selector)?.specificity())
}

/// Orders higher specificity first.
pub fn compare_descending(a: &Specificity, b: &Specificity) -> Ordering {
    b.cmp(a)
}

impl SelectorList {
    pub fn specificity(&self) -> Specificity {
        self.0
            .iter()
            .map(ComplexSelector::specificity)
            .max()
            .unwrap_or_default()
    }
}

impl ComplexSelector {
    pub fn specificity(&self) -> Specificity {
        self.compounds
            .iter()
            .fold(Specificity::ZERO, |acc, compound| acc + compound.specificity())
    }
}

impl CompoundSelector {
    pub fn specificity(&self) -> Specificity {
        self.simples
            .iter()
            .fold(Specificity::ZERO, |acc, simple| acc + simple.specificity())
    }
}

impl SimpleSelector {
    fn specificity(&self) -> Specificity {
        match self {
            SimpleSelector::Universal | SimpleSelector::Nesting => Specificity::ZERO,
            SimpleSelector::Id(_) => Specificity(1, 0, 0),
            SimpleSelector::Class(_) | SimpleSelector::Attribute(_) => Specificity::CLASS,
            SimpleSelector::Type(_) | SimpleSelector::PseudoElement(_) => Specificity(0, 0, 1),
            SimpleSelector::Pseudo(pseudo) => match pseudo {
                PseudoClass::Not(list) | PseudoClass::Is(list) => list.specificity(),
                PseudoClass::Where(_) => Specificity::ZERO,
                _ => Specificity::CLASS,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_structural_pseudo_classes() {
        assert_eq!(calculate(":nth-child(n)").unwrap(), Specificity(0, 1, 0));
        assert_eq!(
            calculate(":nth-child(3n + 1):nth-last-child(-n + 3)").unwrap(),
            Specificity(0, 2, 0)
        );
        assert_eq!(
            calculate(":nth-child(3n + 1):nth-last-child(-n + 3) ~ *").unwrap(),
            Specificity(0, 2, 0)
        );
        assert_eq!(
            calculate(":last-child:not(:nth-child(3n+3))").unwrap(),
            Specificity(0, 2, 0)
        );
    }

    #[test]
    fn not_and_is_take_their_most_specific_argument() {
        assert_eq!(calculate(":not(.a, #b)").unwrap(), Specificity(1, 0, 0));
        assert_eq!(calculate(":is(p, .a.b)").unwrap(), Specificity(0, 2, 0));
    }

    #[test]
    fn where_contributes_nothing() {
        assert_eq!(
            calculate(":where(:nth-child(3n + 1):nth-last-child(-n + 3) ~ *)").unwrap(),
            Specificity::ZERO
        );
        assert_eq!(
            calculate("& > :where(:last-child)::after").unwrap(),
            Specificity(0, 0, 1)
        );
    }

    #[test]
    fn mixed_selector_weights() {
        assert_eq!(calculate("div#main > p.note[title]").unwrap(), Specificity(1, 2, 2));
        assert_eq!(calculate("*").unwrap(), Specificity::ZERO);
        assert_eq!(calculate("a, .b, #c").unwrap(), Specificity(1, 0, 0));
    }

    #[test]
    fn compare_descending_puts_highest_first() {
        let mut specs = vec![
            Specificity(0, 1, 0),
            Specificity(1, 0, 0),
            Specificity(0, 6, 0),
            Specificity(0, 0, 3),
        ];
        specs.sort_by(compare_descending);
        assert_eq!(
            specs,
            vec![
                Specificity(1, 0, 0),
                Specificity(0, 6, 0),
                Specificity(0, 1, 0),
                Specificity(0, 0, 3),
            ]
        );
    }

    #[test]
    fn invalid_selector_is_an_error() {
        assert!(matches!(
            calculate(":nth-child(x)"),
            Err(GridInnerError::Selector(_))
        ));
    }
}
