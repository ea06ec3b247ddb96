//! Input and synthetic events

use crate::NodeId;

/// Key identity, as far as the enhancement handlers dispatch on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Tab,
    Enter,
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Other(String),
}

impl Key {
    /// Parse a `KeyboardEvent.key` value
    pub fn parse(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            "Tab" => Key::Tab,
            "Enter" => Key::Enter,
            " " | "Space" | "Spacebar" => Key::Space,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Home" => Key::Home,
            "End" => Key::End,
            other => Key::Other(other.to_string()),
        }
    }

    pub fn is_activation(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// A keydown event as delivered to document-level handlers
#[derive(Debug, Clone)]
pub struct KeyboardEvent {
    pub key: Key,
    pub shift: bool,
    /// Event target (the focused element, or `<body>`)
    pub target: NodeId,
    default_prevented: bool,
}

impl KeyboardEvent {
    pub fn new(key: Key, target: NodeId) -> Self {
        Self {
            key,
            shift: false,
            target,
            default_prevented: false,
        }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Events the enhancement layer dispatches into the page
#[derive(Debug, Clone, PartialEq)]
pub enum SyntheticEvent {
    /// `element.click()`
    Click(NodeId),
    /// `new CustomEvent(name, { detail })` on the window
    Custom { name: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse() {
        assert_eq!(Key::parse(" "), Key::Space);
        assert_eq!(Key::parse("Esc"), Key::Escape);
        assert_eq!(Key::parse("a"), Key::Other("a".to_string()));
        assert!(Key::parse("Enter").is_activation());
    }

    #[test]
    fn test_prevent_default() {
        let mut event = KeyboardEvent::new(Key::Tab, NodeId::ROOT).with_shift(true);
        assert!(!event.default_prevented());
        event.prevent_default();
        assert!(event.default_prevented());
        assert!(event.shift);
    }
}
