//! CSS selector subset for the in-memory document.
//!
//! Supported: selector lists, descendant and child combinators, type and
//! universal selectors, `#id`, `.class` and attribute selectors with the
//! `=`, `~=`, `^=`, `$=`, `*=` operators. Pseudo-classes are rejected.

use crate::error::AdapterError;

/// Read access the matcher needs from a tree.
pub(crate) trait SelectorTree {
    fn tag_of(&self, node: usize) -> &str;
    fn attr_of(&self, node: usize, name: &str) -> Option<&str>;
    fn parent_of(&self, node: usize) -> Option<usize>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SelectorList(Vec<ComplexSelector>);

#[derive(Clone, Debug, PartialEq, Eq)]
struct ComplexSelector {
    /// Rightmost compound first; each carries the combinator linking it to the next one.
    parts: Vec<(Compound, Combinator)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    /// Rightmost compound, nothing to its left.
    None,
    Descendant,
    Child,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    op: AttrOp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Includes(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

impl SelectorList {
    pub(crate) fn parse(selector: &str) -> Result<Self, AdapterError> {
        let groups = split_groups(selector)?;
        let mut complexes = Vec::with_capacity(groups.len());
        for group in groups {
            complexes.push(parse_complex(selector, group)?);
        }
        Ok(SelectorList(complexes))
    }

    pub(crate) fn matches<T: SelectorTree + ?Sized>(&self, tree: &T, node: usize) -> bool {
        self.0.iter().any(|complex| complex.matches(tree, node))
    }
}

impl ComplexSelector {
    fn matches<T: SelectorTree + ?Sized>(&self, tree: &T, node: usize) -> bool {
        match_from(tree, &self.parts, node)
    }
}

fn match_from<T: SelectorTree + ?Sized>(
    tree: &T,
    parts: &[(Compound, Combinator)],
    node: usize,
) -> bool {
    let Some(((compound, combinator), rest)) = parts.split_first() else {
        return true;
    };
    if !compound.matches(tree, node) {
        return false;
    }
    match combinator {
        Combinator::None => true,
        Combinator::Child => match tree.parent_of(node) {
            Some(parent) => match_from(tree, rest, parent),
            None => false,
        },
        Combinator::Descendant => {
            let mut cursor = tree.parent_of(node);
            while let Some(ancestor) = cursor {
                if match_from(tree, rest, ancestor) {
                    return true;
                }
                cursor = tree.parent_of(ancestor);
            }
            false
        }
    }
}

impl Compound {
    fn matches<T: SelectorTree + ?Sized>(&self, tree: &T, node: usize) -> bool {
        if let Some(tag) = &self.tag {
            if !tree.tag_of(node).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if tree.attr_of(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = tree.attr_of(node, "class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_ascii_whitespace().collect();
            if !self
                .classes
                .iter()
                .all(|class| present.contains(&class.as_str()))
            {
                return false;
            }
        }
        self.attrs.iter().all(|cond| cond.matches(tree, node))
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }
}

impl AttrCondition {
    fn matches<T: SelectorTree + ?Sized>(&self, tree: &T, node: usize) -> bool {
        let Some(actual) = tree.attr_of(node, &self.name) else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(expected) => actual == expected,
            AttrOp::Includes(expected) => actual.split_ascii_whitespace().any(|w| w == expected),
            AttrOp::Prefix(expected) => !expected.is_empty() && actual.starts_with(expected.as_str()),
            AttrOp::Suffix(expected) => !expected.is_empty() && actual.ends_with(expected.as_str()),
            AttrOp::Substring(expected) => !expected.is_empty() && actual.contains(expected.as_str()),
        }
    }
}

/// Splits on top-level commas, ignoring commas inside brackets or quotes.
fn split_groups(selector: &str) -> Result<Vec<&str>, AdapterError> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (idx, ch) in selector.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                groups.push(&selector[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(AdapterError::invalid_selector(selector, "unterminated string"));
    }
    groups.push(&selector[start..]);
    if groups.iter().any(|g| g.trim().is_empty()) {
        return Err(AdapterError::invalid_selector(selector, "empty selector in list"));
    }
    Ok(groups)
}

fn parse_complex(full: &str, group: &str) -> Result<ComplexSelector, AdapterError> {
    let chars: Vec<char> = group.trim().chars().collect();
    let mut pos = 0usize;
    let mut sequence: Vec<(Compound, Combinator)> = Vec::new();
    let mut pending = Combinator::None;

    while pos < chars.len() {
        let mut saw_space = false;
        while pos < chars.len() && chars[pos].is_whitespace() {
            pos += 1;
            saw_space = true;
        }
        if pos >= chars.len() {
            break;
        }
        if chars[pos] == '>' {
            if sequence.is_empty() || pending == Combinator::Child {
                return Err(AdapterError::invalid_selector(full, "dangling '>'"));
            }
            pending = Combinator::Child;
            pos += 1;
            continue;
        }
        if !sequence.is_empty() && pending == Combinator::None && saw_space {
            pending = Combinator::Descendant;
        }
        let compound = parse_compound(full, &chars, &mut pos)?;
        if !sequence.is_empty() && pending == Combinator::None {
            return Err(AdapterError::invalid_selector(full, "missing combinator"));
        }
        sequence.push((compound, pending));
        pending = Combinator::None;
    }

    if sequence.is_empty() || pending != Combinator::None {
        return Err(AdapterError::invalid_selector(full, "incomplete selector"));
    }

    // Each compound already carries the link to its left neighbour; match right-to-left.
    let parts = sequence.into_iter().rev().collect();
    Ok(ComplexSelector { parts })
}

fn parse_compound(full: &str, chars: &[char], pos: &mut usize) -> Result<Compound, AdapterError> {
    let mut compound = Compound::default();
    let mut universal = false;

    if *pos < chars.len() && chars[*pos] == '*' {
        *pos += 1;
        universal = true;
    } else if *pos < chars.len() && is_ident_char(chars[*pos]) {
        compound.tag = Some(read_ident(chars, pos).to_ascii_lowercase());
    }

    while *pos < chars.len() {
        match chars[*pos] {
            '#' => {
                *pos += 1;
                let ident = read_ident(chars, pos);
                if ident.is_empty() {
                    return Err(AdapterError::invalid_selector(full, "empty id"));
                }
                compound.id = Some(ident);
            }
            '.' => {
                *pos += 1;
                let ident = read_ident(chars, pos);
                if ident.is_empty() {
                    return Err(AdapterError::invalid_selector(full, "empty class"));
                }
                compound.classes.push(ident);
            }
            '[' => {
                *pos += 1;
                compound.attrs.push(parse_attr(full, chars, pos)?);
            }
            ':' => {
                return Err(AdapterError::invalid_selector(
                    full,
                    "pseudo-classes are not supported",
                ))
            }
            c if c.is_whitespace() || c == '>' => break,
            other => {
                return Err(AdapterError::invalid_selector(
                    full,
                    format!("unexpected character '{}'", other),
                ))
            }
        }
    }

    if compound.is_empty() && !universal {
        return Err(AdapterError::invalid_selector(full, "empty compound"));
    }
    Ok(compound)
}

fn parse_attr(full: &str, chars: &[char], pos: &mut usize) -> Result<AttrCondition, AdapterError> {
    skip_ws(chars, pos);
    let name = read_ident(chars, pos).to_ascii_lowercase();
    if name.is_empty() {
        return Err(AdapterError::invalid_selector(full, "empty attribute name"));
    }
    skip_ws(chars, pos);
    let Some(&ch) = chars.get(*pos) else {
        return Err(AdapterError::invalid_selector(full, "unterminated attribute"));
    };
    if ch == ']' {
        *pos += 1;
        return Ok(AttrCondition {
            name,
            op: AttrOp::Exists,
        });
    }

    let op_char = if ch == '=' {
        None
    } else {
        *pos += 1;
        Some(ch)
    };
    if chars.get(*pos) != Some(&'=') {
        return Err(AdapterError::invalid_selector(full, "expected '='"));
    }
    *pos += 1;
    skip_ws(chars, pos);
    let value = read_attr_value(full, chars, pos)?;
    skip_ws(chars, pos);
    if chars.get(*pos) != Some(&']') {
        return Err(AdapterError::invalid_selector(full, "unterminated attribute"));
    }
    *pos += 1;

    let op = match op_char {
        None => AttrOp::Equals(value),
        Some('~') => AttrOp::Includes(value),
        Some('^') => AttrOp::Prefix(value),
        Some('$') => AttrOp::Suffix(value),
        Some('*') => AttrOp::Substring(value),
        Some(other) => {
            return Err(AdapterError::invalid_selector(
                full,
                format!("unsupported attribute operator '{}='", other),
            ))
        }
    };
    Ok(AttrCondition { name, op })
}

fn read_attr_value(full: &str, chars: &[char], pos: &mut usize) -> Result<String, AdapterError> {
    match chars.get(*pos) {
        Some(&q) if q == '"' || q == '\'' => {
            *pos += 1;
            let mut value = String::new();
            while let Some(&c) = chars.get(*pos) {
                *pos += 1;
                if c == q {
                    return Ok(value);
                }
                if c == '\\' {
                    if let Some(&escaped) = chars.get(*pos) {
                        value.push(escaped);
                        *pos += 1;
                    }
                    continue;
                }
                value.push(c);
            }
            Err(AdapterError::invalid_selector(full, "unterminated string"))
        }
        Some(_) => {
            let ident = read_ident(chars, pos);
            if ident.is_empty() {
                Err(AdapterError::invalid_selector(full, "empty attribute value"))
            } else {
                Ok(ident)
            }
        }
        None => Err(AdapterError::invalid_selector(full, "unterminated attribute")),
    }
}

fn read_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn skip_ws(chars: &[char], pos: &mut usize) {
    while *pos < chars.len() && chars[*pos].is_whitespace() {
        *pos += 1;
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
