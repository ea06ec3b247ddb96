//! DOMTokenList
//!
//! Space-separated token attributes: `class`, `rel`, `aria-describedby`.

use std::fmt;

/// Ordered set of whitespace-separated tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<String>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from an attribute value. Duplicates collapse.
    pub fn parse(value: &str) -> Self {
        let mut list = Self::new();
        for token in value.split_ascii_whitespace() {
            list.add(token);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add a token; returns false when it was already present
    pub fn add(&mut self, token: &str) -> bool {
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }

    /// Remove a token; returns false when it was absent
    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| t != token);
        before != self.tokens.len()
    }

    /// Toggle, optionally forcing the final state. Returns the final state.
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> bool {
        let want = force.unwrap_or(!self.contains(token));
        if want {
            self.add(token);
        } else {
            self.remove(token);
        }
        want
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl fmt::Display for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dedupes() {
        let list = TokenList::parse("err-1  help-1 err-1");
        assert_eq!(list.len(), 2);
        assert_eq!(list.to_string(), "err-1 help-1");
    }

    #[test]
    fn test_toggle_force() {
        let mut list = TokenList::parse("lang-zh");
        assert!(!list.toggle("lang-zh", Some(false)));
        assert!(list.toggle("lang-en", Some(true)));
        assert!(list.toggle("lang-en", Some(true)));
        assert_eq!(list.to_string(), "lang-en");
    }

    #[test]
    fn test_add_remove_report_change() {
        let mut list = TokenList::new();
        assert!(list.add("loaded"));
        assert!(!list.add("loaded"));
        assert!(list.remove("loaded"));
        assert!(!list.remove("loaded"));
        assert!(list.is_empty());
    }
}
