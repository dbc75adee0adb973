//! Evaluates structural selectors against a position in a list of siblings.
//!
//! Grid items carry no tag, class or attributes here, so only the
//! position-based vocabulary can match; ancestor combinators never do.

use crate::error::GridInnerError;
use crate::parse::{
    Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorList, SimpleSelector,
    parse_selector_list,
};

/// 1-based `index` among `count` element siblings; `1 <= index <= count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiblingPosition {
    index: usize,
    count: usize,
}

impl SiblingPosition {
    /// Returns `None` unless `index` names one of the `count` siblings.
    pub fn new(index: usize, count: usize) -> Option<Self> {
        if index == 0 || index > count {
            None
        } else {
            Some(Self { index, count })
        }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn count(self) -> usize {
        self.count
    }

    fn index_from_end(self) -> usize {
        self.count + 1 - self.index
    }

    fn previous(self) -> Option<Self> {
        Self::new(self.index - 1, self.count)
    }
}

impl SelectorList {
    pub fn matches(&self, position: SiblingPosition) -> bool {
        self.0.iter().any(|complex| complex.matches(position))
    }
}

impl ComplexSelector {
    pub fn matches(&self, position: SiblingPosition) -> bool {
        match self.compounds.len() {
            0 => false,
            len => self.matches_from(len - 1, position),
        }
    }

    fn matches_from(&self, compound: usize, position: SiblingPosition) -> bool {
        if !self.compounds[compound].matches(position) {
            return false;
        }
        if compound == 0 {
            return true;
        }
        match self.combinators[compound - 1] {
            Combinator::NextSibling => position
                .previous()
                .is_some_and(|previous| self.matches_from(compound - 1, previous)),
            Combinator::SubsequentSibling => (1..position.index)
                .rev()
                .filter_map(|index| SiblingPosition::new(index, position.count))
                .any(|earlier| self.matches_from(compound - 1, earlier)),
            Combinator::Child | Combinator::Descendant => false,
        }
    }
}

impl CompoundSelector {
    fn matches(&self, position: SiblingPosition) -> bool {
        self.simples.iter().all(|simple| simple.matches(position))
    }
}

impl SimpleSelector {
    fn matches(&self, position: SiblingPosition) -> bool {
        match self {
            SimpleSelector::Universal => true,
            SimpleSelector::Pseudo(pseudo) => pseudo.matches(position),
            _ => false,
        }
    }
}

impl PseudoClass {
    fn matches(&self, position: SiblingPosition) -> bool {
        match self {
            PseudoClass::NthChild(nth) => nth.matches(position.index as i64),
            PseudoClass::NthLastChild(nth) => nth.matches(position.index_from_end() as i64),
            PseudoClass::FirstChild => position.index == 1,
            PseudoClass::LastChild => position.index == position.count,
            PseudoClass::OnlyChild => position.count == 1,
            PseudoClass::Not(list) => !list.matches(position),
            PseudoClass::Is(list) | PseudoClass::Where(list) => list.matches(position),
            PseudoClass::Other(_) => false,
        }
    }
}

/// 1-based indices of the children, out of `count`, that `selector` matches.
pub fn matching_indices(selector: &str, count: usize) -> Result<Vec<usize>, GridInnerError> {
    let list = parse_selector_list(selector)?;
    Ok((1..=count)
        .filter_map(|index| SiblingPosition::new(index, count))
        .filter(|&position| list.matches(position))
        .map(SiblingPosition::index)
        .collect())
}
