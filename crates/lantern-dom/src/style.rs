//! Resolved style
//!
//! The subset of computed style the enhancement passes read. The host
//! renderer fills it in; nothing here cascades.

/// `display` as far as visibility checks care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Block,
    Inline,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Computed style for one element
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    /// Resolved `color`, any CSS color syntax
    pub color: Option<String>,
    /// Resolved `background-color`
    pub background_color: Option<String>,
    pub display: Display,
    pub visibility: Visibility,
    pub opacity: f32,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            color: None,
            background_color: None,
            display: Display::Block,
            visibility: Visibility::Visible,
            opacity: 1.0,
        }
    }
}

impl ComputedStyle {
    pub fn with_colors(color: &str, background: &str) -> Self {
        Self {
            color: Some(color.to_string()),
            background_color: Some(background.to_string()),
            ..Default::default()
        }
    }

    pub fn hidden() -> Self {
        Self {
            display: Display::None,
            ..Default::default()
        }
    }

    /// Painted with non-zero opacity
    pub fn is_painted(&self) -> bool {
        self.display != Display::None && self.visibility != Visibility::Hidden && self.opacity > 0.0
    }
}
