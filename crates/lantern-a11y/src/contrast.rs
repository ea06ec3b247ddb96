//! Color contrast checking
//!
//! WCAG 2.x relative luminance and contrast ratio over resolved styles.

use csscolorparser::Color;
use lantern_dom::{Document, NodeId};
use serde::Serialize;

/// Contrast ratio calculator
pub struct ContrastChecker;

impl ContrastChecker {
    /// Relative luminance of an sRGB color
    pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
    }

    /// Contrast ratio between two luminances, order-independent
    pub fn contrast_ratio(l1: f64, l2: f64) -> f64 {
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Contrast ratio between two CSS colors. Unparseable colors are
    /// assumed to contrast maximally.
    pub fn ratio_between(foreground: &str, background: &str) -> f64 {
        match (parse_rgba(foreground), parse_rgba(background)) {
            (Some([r1, g1, b1, _]), Some([r2, g2, b2, _])) => Self::contrast_ratio(
                Self::luminance(r1, g1, b1),
                Self::luminance(r2, g2, b2),
            ),
            _ => 21.0,
        }
    }

    /// WCAG AA for normal text
    pub fn meets_aa(ratio: f64) -> bool {
        ratio >= 4.5
    }
}

fn parse_rgba(input: &str) -> Option<[u8; 4]> {
    let color: Color = input.parse().ok()?;
    Some(color.to_rgba8())
}

fn is_transparent(input: &str) -> bool {
    parse_rgba(input).is_some_and(|[_, _, _, a]| a == 0)
}

/// Element whose text fails the contrast threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrastIssue {
    pub element: NodeId,
    pub ratio: f64,
    pub foreground: String,
    pub background: String,
}

/// Check every element with a resolved text color over a
/// non-transparent background
pub(crate) fn check_document(doc: &Document, threshold: f64) -> Vec<ContrastIssue> {
    let mut issues = Vec::new();
    for id in doc.descendants(doc.tree().root()) {
        let Some(style) = doc.style(id) else { continue };
        let (Some(fg), Some(bg)) = (&style.color, &style.background_color) else {
            continue;
        };
        if is_transparent(bg) {
            continue;
        }
        let ratio = ContrastChecker::ratio_between(fg, bg);
        if ratio < threshold {
            tracing::warn!(
                element = ?id,
                tag = doc.tag(id).unwrap_or_default(),
                color = %fg,
                background = %bg,
                "Insufficient contrast ({:.2}:1)",
                ratio
            );
            issues.push(ContrastIssue {
                element: id,
                ratio,
                foreground: fg.clone(),
                background: bg.clone(),
            });
        }
    }
    issues
}
