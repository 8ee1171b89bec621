//! Selectors
//!
//! The subset of CSS selectors the behavior layer queries with: type, `#id`,
//! `.class`, `[attr]`, `[attr=value]`, `[attr^=prefix]`, the descendant
//! combinator and comma-separated lists.

use crate::{DomError, DomTree, NodeId};

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

/// Compound selectors joined by descendant combinators (left to right)
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl Selector {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let invalid = || DomError::InvalidSelector(input.to_string());

        let mut alternatives = Vec::new();
        for alternative in input.split(',') {
            let mut parts = Vec::new();
            for compound in alternative.split_whitespace() {
                parts.push(Compound::parse(compound).ok_or_else(invalid)?);
            }
            if parts.is_empty() {
                return Err(invalid());
            }
            alternatives.push(Complex { parts });
        }
        Ok(Self { alternatives })
    }

    /// Check whether the element `id` matches any alternative
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(tree, id))
    }
}

impl Complex {
    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some((last, rest)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(tree, id) {
            return false;
        }

        // Greedy right-to-left walk is exact for descendant-only chains.
        let mut remaining = rest.iter().rev().peekable();
        for ancestor in tree.ancestors(id) {
            match remaining.peek() {
                Some(part) if part.matches(tree, ancestor) => {
                    remaining.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        remaining.peek().is_none()
    }
}

impl Compound {
    fn parse(s: &str) -> Option<Self> {
        let mut compound = Compound::default();
        let chars: Vec<char> = s.chars().collect();
        let mut i = 0;

        let read_ident = |i: &mut usize| -> Option<String> {
            let start = *i;
            while *i < chars.len() && is_ident_char(chars[*i]) {
                *i += 1;
            }
            (*i > start).then(|| chars[start..*i].iter().collect())
        };

        if i < chars.len() && chars[i] == '*' {
            i += 1;
        } else if i < chars.len() && is_ident_char(chars[i]) {
            compound.tag = Some(read_ident(&mut i)?.to_ascii_lowercase());
        }

        while i < chars.len() {
            match chars[i] {
                '#' => {
                    i += 1;
                    compound.id = Some(read_ident(&mut i)?);
                }
                '.' => {
                    i += 1;
                    compound.classes.push(read_ident(&mut i)?);
                }
                '[' => {
                    i += 1;
                    let close = chars[i..].iter().position(|&c| c == ']')? + i;
                    let body: String = chars[i..close].iter().collect();
                    compound.attrs.push(AttrSelector::parse(&body)?);
                    i = close + 1;
                }
                _ => return None,
            }
        }
        Some(compound)
    }

    fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(elem) = tree.get(id).and_then(|n| n.as_element()) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if &elem.tag != tag {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if elem.id() != Some(want.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| elem.classes.contains(c)) {
            return false;
        }
        self.attrs.iter().all(|attr| {
            let value = if attr.name == "class" {
                (!elem.classes.is_empty()).then(|| elem.classes.value())
            } else {
                elem.attr(&attr.name).map(str::to_string)
            };
            match (&attr.op, value) {
                (_, None) => false,
                (AttrOp::Exists, Some(_)) => true,
                (AttrOp::Equals(want), Some(v)) => &v == want,
                (AttrOp::Prefix(want), Some(v)) => v.starts_with(want.as_str()),
            }
        })
    }
}

impl AttrSelector {
    fn parse(body: &str) -> Option<Self> {
        let unquote = |v: &str| -> String {
            let v = v.trim();
            v.strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| v.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(v)
                .to_string()
        };
        let valid_name = |n: &str| !n.is_empty() && n.chars().all(is_ident_char);

        if let Some((name, value)) = body.split_once("^=") {
            let name = name.trim();
            return valid_name(name).then(|| Self {
                name: name.to_string(),
                op: AttrOp::Prefix(unquote(value)),
            });
        }
        if let Some((name, value)) = body.split_once('=') {
            let name = name.trim();
            return valid_name(name).then(|| Self {
                name: name.to_string(),
                op: AttrOp::Equals(unquote(value)),
            });
        }
        let name = body.trim();
        valid_name(name).then(|| Self {
            name: name.to_string(),
            op: AttrOp::Exists,
        })
    }
}
