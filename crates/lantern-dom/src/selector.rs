//! Selector matching
//!
//! Supports the selector subset the enhancement passes use: type, `*`,
//! `#id`, `.class`, attribute selectors with `= ~= |= ^= $= *=`, `:not()`,
//! the descendant and child combinators, and comma-separated lists.

use crate::{DomError, DomTree, ElementData, NodeId};

/// A parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<ComplexSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    /// Compounds left to right; `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    compounds: Vec<Vec<SelectorComponent>>,
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq)]
enum SelectorComponent {
    Universal,
    Type(String),
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    /// `:not(compound)`
    Not(Vec<SelectorComponent>),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value]
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value]
    Prefix(String),
    /// [attr$=value]
    Suffix(String),
    /// [attr*=value]
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(val)) = (&self.matcher, value) else {
            return self.matcher.is_none() && value.is_some();
        };
        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let val = fold(val);
        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                val.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{expected}-"))
            }
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && val.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && val.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && val.contains(&fold(expected))
            }
        }
    }
}

impl SelectorComponent {
    fn matches(&self, el: &ElementData) -> bool {
        match self {
            SelectorComponent::Universal => true,
            SelectorComponent::Type(tag) => el.tag() == tag,
            SelectorComponent::Id(id) => el.id() == Some(id.as_str()),
            SelectorComponent::Class(class) => el.has_class(class),
            SelectorComponent::Attribute(sel) => sel.matches(el.attr(&sel.name)),
            SelectorComponent::Not(inner) => !inner.iter().all(|c| c.matches(el)),
        }
    }
}

impl Selector {
    /// Parse a selector list
    pub fn parse(source: &str) -> Result<Self, DomError> {
        let mut parser = Parser {
            source,
            chars: source.chars().collect(),
            pos: 0,
        };
        let alternatives = parser.parse_list()?;
        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Does the element `id` match any alternative?
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.alternatives.iter().any(|complex| {
            let last = complex.compounds.len() - 1;
            match_from(tree, complex, last, id)
        })
    }
}

fn compound_matches(tree: &DomTree, compound: &[SelectorComponent], id: NodeId) -> bool {
    match tree.get(id).and_then(|n| n.as_element()) {
        Some(el) => compound.iter().all(|c| c.matches(el)),
        None => false,
    }
}

/// Match right to left, backtracking over ancestors for descendant combinators
fn match_from(tree: &DomTree, complex: &ComplexSelector, index: usize, id: NodeId) -> bool {
    if !compound_matches(tree, &complex.compounds[index], id) {
        return false;
    }
    if index == 0 {
        return true;
    }
    match complex.combinators[index - 1] {
        Combinator::Child => tree
            .parent(id)
            .is_some_and(|parent| match_from(tree, complex, index - 1, parent)),
        Combinator::Descendant => {
            let mut ancestor = tree.parent(id);
            while let Some(a) = ancestor {
                if match_from(tree, complex, index - 1, a) {
                    return true;
                }
                ancestor = tree.parent(a);
            }
            false
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> DomError {
        DomError::InvalidSelector {
            selector: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn expect(&mut self, expected: char) -> Result<(), DomError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected `{expected}`, found `{c}`"))),
            None => Err(self.error(format!("expected `{expected}`, found end of input"))),
        }
    }

    /// Skip whitespace, reporting whether any was present
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos != start
    }

    fn parse_list(&mut self) -> Result<Vec<ComplexSelector>, DomError> {
        let mut list = Vec::new();
        loop {
            self.skip_ws();
            list.push(self.parse_complex()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                None => return Ok(list),
                Some(c) => return Err(self.error(format!("unexpected `{c}`"))),
            }
        }
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, DomError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                None | Some(',') => break,
                Some(_) if had_ws => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected `{c}`"))),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Vec<SelectorComponent>, DomError> {
        let mut components = Vec::new();
        while let Some(c) = self.peek() {
            let component = match c {
                '*' => {
                    self.pos += 1;
                    SelectorComponent::Universal
                }
                '#' => {
                    self.pos += 1;
                    SelectorComponent::Id(self.parse_ident()?)
                }
                '.' => {
                    self.pos += 1;
                    SelectorComponent::Class(self.parse_ident()?)
                }
                '[' => {
                    self.pos += 1;
                    SelectorComponent::Attribute(self.parse_attribute()?)
                }
                ':' => {
                    self.pos += 1;
                    let name = self.parse_ident()?;
                    if !name.eq_ignore_ascii_case("not") {
                        return Err(self.error(format!("unsupported pseudo-class `:{name}`")));
                    }
                    self.expect('(')?;
                    self.skip_ws();
                    let inner = self.parse_compound()?;
                    self.skip_ws();
                    self.expect(')')?;
                    SelectorComponent::Not(inner)
                }
                c if is_ident_char(c) => {
                    SelectorComponent::Type(self.parse_ident()?.to_ascii_lowercase())
                }
                _ => break,
            };
            components.push(component);
        }
        if components.is_empty() {
            return Err(self.error("expected a selector"));
        }
        Ok(components)
    }

    fn parse_ident(&mut self) -> Result<String, DomError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, DomError> {
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.bump() {
            Some(']') => {
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                });
            }
            Some('=') => '=',
            Some(op @ ('~' | '|' | '^' | '$' | '*')) => {
                self.expect('=')?;
                op
            }
            Some(c) => return Err(self.error(format!("unexpected `{c}` in attribute selector"))),
            None => return Err(self.error("unterminated attribute selector")),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.expect(quote)?;
                value
            }
            _ => self.parse_ident()?,
        };
        self.skip_ws();
        let case_insensitive = matches!(self.peek(), Some('i' | 'I'));
        if case_insensitive {
            self.pos += 1;
            self.skip_ws();
        }
        self.expect(']')?;

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(tag: &str, attrs: &[(&str, &str)]) -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let el = tree.create_element(tag);
        for (name, value) in attrs {
            if let Some(e) = tree.get_mut(el).and_then(|n| n.as_element_mut()) {
                e.set_attr(name, value);
            }
        }
        tree.append_child(tree.root(), el).unwrap();
        (tree, el)
    }

    #[test]
    fn test_attribute_selector_exact() {
        let sel = AttributeSelector {
            name: "type".to_string(),
            matcher: Some(AttributeMatcher::Exact("search".to_string())),
            case_insensitive: false,
        };
        assert!(sel.matches(Some("search")));
        assert!(!sel.matches(Some("text")));
        assert!(!sel.matches(None));
    }

    #[test]
    fn test_attribute_selector_prefix() {
        let sel = AttributeSelector {
            name: "href".to_string(),
            matcher: Some(AttributeMatcher::Prefix("/".to_string())),
            case_insensitive: false,
        };
        assert!(sel.matches(Some("/guide/")));
        assert!(!sel.matches(Some("https://example.com/")));
    }

    #[test]
    fn test_not_and_attribute() {
        let (tree, button) = tree_with("button", &[("disabled", "")]);
        let sel = Selector::parse("button:not([disabled])").unwrap();
        assert!(!sel.matches(&tree, button));

        let (tree, input) = tree_with("input", &[("tabindex", "-1")]);
        let sel = Selector::parse("[tabindex]:not([tabindex=\"-1\"]), input").unwrap();
        assert!(sel.matches(&tree, input));
    }

    #[test]
    fn test_descendant_backtracks() {
        let mut tree = DomTree::new();
        let feature = tree.create_element("div");
        let wrap = tree.create_element("div");
        let icon = tree.create_element("span");
        let img = tree.create_element("img");
        for (el, class) in [(feature, "VPFeature"), (icon, "icon")] {
            if let Some(e) = tree.get_mut(el).and_then(|n| n.as_element_mut()) {
                e.set_attr("class", class);
            }
        }
        tree.append_child(tree.root(), feature).unwrap();
        tree.append_child(feature, icon).unwrap();
        tree.append_child(icon, wrap).unwrap();
        tree.append_child(wrap, img).unwrap();

        assert!(Selector::parse(".VPFeature .icon img").unwrap().matches(&tree, img));
        assert!(Selector::parse(".icon > div > img").unwrap().matches(&tree, img));
        assert!(!Selector::parse(".icon > img").unwrap().matches(&tree, img));
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("a[href").is_err());
        assert!(Selector::parse("a:hover").is_err());
        assert!(Selector::parse("a,").is_err());
    }
}
