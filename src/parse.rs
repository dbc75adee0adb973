//! A small selector parser covering the structural vocabulary the grid rules use.

use crate::error::GridInnerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

/// `compounds[i]` and `compounds[i + 1]` are joined by `combinators[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Nesting,
    Type(String),
    Class(String),
    Id(String),
    Attribute(String),
    Pseudo(PseudoClass),
    PseudoElement(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    NthChild(Nth),
    NthLastChild(Nth),
    FirstChild,
    LastChild,
    OnlyChild,
    Not(SelectorList),
    Is(SelectorList),
    Where(SelectorList),
    Other(String),
}

/// The `An+B` microsyntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    pub a: i32,
    pub b: i32,
}

impl Nth {
    pub fn parse(raw: &str) -> Option<Nth> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "odd" => return Some(Nth { a: 2, b: 1 }),
            "even" => return Some(Nth { a: 2, b: 0 }),
            "" => return None,
            _ => {}
        }
        let Some((a_part, b_part)) = compact.split_once('n') else {
            return compact.parse().ok().map(|b| Nth { a: 0, b });
        };
        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            other => other.parse().ok()?,
        };
        let b = match b_part {
            "" => 0,
            other if other.starts_with('+') || other.starts_with('-') => other.parse().ok()?,
            _ => return None,
        };
        Some(Nth { a, b })
    }

    /// Whether some `n >= 0` satisfies `a*n + b == index`.
    pub fn matches(self, index: i64) -> bool {
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            return index == b;
        }
        let diff = index - b;
        diff % a == 0 && diff / a >= 0
    }
}

pub fn parse_selector_list(selector: &str) -> Result<SelectorList, GridInnerError> {
    let mut parser = Parser {
        chars: selector.chars().collect(),
        pos: 0,
    };
    let list = parser.list()?;
    parser.skip_whitespace();
    if parser.pos != parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(list)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn error(&self, message: &str) -> GridInnerError {
        let text: String = self.chars.iter().collect();
        GridInnerError::Selector(format!("{message} at offset {} in {text:?}", self.pos))
    }

    fn expect(&mut self, ch: char) -> Result<(), GridInnerError> {
        if self.bump() == Some(ch) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{ch}'")))
        }
    }

    fn list(&mut self) -> Result<SelectorList, GridInnerError> {
        let mut selectors = vec![self.complex()?];
        while self.peek() == Some(',') {
            self.pos += 1;
            selectors.push(self.complex()?);
        }
        Ok(SelectorList(selectors))
    }

    fn complex(&mut self) -> Result<ComplexSelector, GridInnerError> {
        self.skip_whitespace();
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.error("expected combinator")),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<CompoundSelector, GridInnerError> {
        let mut simples = Vec::new();
        while let Some(ch) = self.peek() {
            let simple = match ch {
                '*' => {
                    self.pos += 1;
                    SimpleSelector::Universal
                }
                '&' => {
                    self.pos += 1;
                    SimpleSelector::Nesting
                }
                '.' => {
                    self.pos += 1;
                    SimpleSelector::Class(self.ident()?)
                }
                '#' => {
                    self.pos += 1;
                    SimpleSelector::Id(self.ident()?)
                }
                '[' => SimpleSelector::Attribute(self.attribute()?),
                ':' if self.peek_at(1) == Some(':') => {
                    self.pos += 2;
                    SimpleSelector::PseudoElement(self.ident()?.to_ascii_lowercase())
                }
                ':' => {
                    self.pos += 1;
                    SimpleSelector::Pseudo(self.pseudo_class()?)
                }
                c if simples.is_empty() && is_ident_start(c) => {
                    SimpleSelector::Type(self.ident()?)
                }
                _ => break,
            };
            simples.push(simple);
        }
        if simples.is_empty() {
            return Err(self.error("expected selector"));
        }
        Ok(CompoundSelector { simples })
    }

    fn ident(&mut self) -> Result<String, GridInnerError> {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.error("dangling escape")),
                }
            } else if is_ident_char(ch) {
                out.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(out)
    }

    fn attribute(&mut self) -> Result<String, GridInnerError> {
        self.expect('[')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(']') => return Ok(out.trim().to_string()),
                Some(ch) => out.push(ch),
                None => return Err(self.error("unterminated attribute selector")),
            }
        }
    }

    fn pseudo_class(&mut self) -> Result<PseudoClass, GridInnerError> {
        let name = self.ident()?.to_ascii_lowercase();
        if self.peek() != Some('(') {
            return Ok(match name.as_str() {
                "first-child" => PseudoClass::FirstChild,
                "last-child" => PseudoClass::LastChild,
                "only-child" => PseudoClass::OnlyChild,
                _ => PseudoClass::Other(name),
            });
        }
        self.pos += 1;
        let pseudo = match name.as_str() {
            "not" | "is" | "where" => {
                let list = self.list()?;
                self.skip_whitespace();
                match name.as_str() {
                    "not" => PseudoClass::Not(list),
                    "is" => PseudoClass::Is(list),
                    _ => PseudoClass::Where(list),
                }
            }
            "nth-child" | "nth-last-child" => {
                let raw = self.balanced_argument()?;
                let nth = Nth::parse(&raw)
                    .ok_or_else(|| self.error(&format!("invalid An+B expression {raw:?}")))?;
                if name == "nth-child" {
                    PseudoClass::NthChild(nth)
                } else {
                    PseudoClass::NthLastChild(nth)
                }
            }
            _ => {
                self.balanced_argument()?;
                PseudoClass::Other(name)
            }
        };
        self.expect(')')?;
        Ok(pseudo)
    }

    /// Consumes up to (not including) the `)` closing the current function.
    fn balanced_argument(&mut self) -> Result<String, GridInnerError> {
        let mut depth = 0usize;
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            match ch {
                '(' => depth += 1,
                ')' if depth == 0 => return Ok(out),
                ')' => depth -= 1,
                _ => {}
            }
            out.push(ch);
            self.pos += 1;
        }
        Err(self.error("unterminated function"))
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '-' || !ch.is_ascii()
}

fn is_ident_char(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}
