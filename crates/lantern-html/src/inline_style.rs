//! Inline style resolution
//!
//! Without a renderer, `style` attributes are the only style source for a
//! loaded file. Declarations are parsed with lightningcss and only the
//! properties the enhancement passes read are resolved, with `color`
//! inherited as in CSS.

use lantern_dom::{ComputedStyle, Display, Document, NodeId, Visibility};
use lightningcss::printer::PrinterOptions;
use lightningcss::properties::Property;
use lightningcss::properties::display::{
    Display as CssDisplay, DisplayKeyword, DisplayOutside, Visibility as CssVisibility,
};
use lightningcss::stylesheet::{ParserOptions, StyleAttribute};
use lightningcss::traits::ToCss;
use lightningcss::values::color::CssColor;

/// Parse a `style` attribute into a computed style over the defaults
pub fn parse_inline_style(value: &str) -> ComputedStyle {
    let mut style = ComputedStyle::default();
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let attribute = match StyleAttribute::parse(value, options) {
        Ok(attribute) => attribute,
        Err(e) => {
            tracing::debug!(style = value, error = %e, "Unparseable style attribute");
            return style;
        }
    };

    // Important declarations win over normal ones
    let block = &attribute.declarations;
    for property in block.declarations.iter().chain(block.important_declarations.iter()) {
        apply_property(&mut style, property);
    }
    style
}

fn apply_property(style: &mut ComputedStyle, property: &Property) {
    match property {
        Property::Color(color) => {
            if let Some(color) = color_string(color) {
                style.color = Some(color);
            }
        }
        Property::BackgroundColor(color) => {
            if let Some(color) = color_string(color) {
                style.background_color = Some(color);
            }
        }
        // Only the final layer of the shorthand carries a color
        Property::Background(layers) => {
            if let Some(color) = layers.last().and_then(|layer| color_string(&layer.color)) {
                style.background_color = Some(color);
            }
        }
        Property::Display(display) => {
            style.display = match display {
                CssDisplay::Keyword(DisplayKeyword::None) => Display::None,
                CssDisplay::Pair(pair) if matches!(pair.outside, DisplayOutside::Inline) => {
                    Display::Inline
                }
                _ => Display::Block,
            }
        }
        Property::Visibility(visibility) => {
            style.visibility = match visibility {
                CssVisibility::Visible => Visibility::Visible,
                _ => Visibility::Hidden,
            }
        }
        Property::Opacity(opacity) => style.opacity = opacity.0.clamp(0.0, 1.0),
        _ => {}
    }
}

/// `currentColor` resolves through inheritance, so it sets nothing
fn color_string(color: &CssColor) -> Option<String> {
    match color {
        CssColor::CurrentColor => None,
        CssColor::RGBA(rgba) if rgba.alpha == 255 => Some(format!(
            "#{:02x}{:02x}{:02x}",
            rgba.red, rgba.green, rgba.blue
        )),
        CssColor::RGBA(rgba) => Some(format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            rgba.red, rgba.green, rgba.blue, rgba.alpha
        )),
        other => other.to_css_string(PrinterOptions::default()).ok(),
    }
}

/// Resolve every element's style from its `style` attribute
pub fn apply_inline_styles(doc: &mut Document) {
    let root = doc.tree().root();
    resolve(doc, root, None);
}

fn resolve(doc: &mut Document, id: NodeId, inherited_color: Option<String>) {
    let mut color = inherited_color;
    if doc.is_element(id) {
        let mut style = doc
            .attr(id, "style")
            .map(parse_inline_style)
            .unwrap_or_default();
        match &style.color {
            Some(own) => color = Some(own.clone()),
            None => style.color = color.clone(),
        }
        doc.set_style(id, style);
    }
    let children: Vec<NodeId> = doc.children(id).collect();
    for child in children {
        resolve(doc, child, color.clone());
    }
}
