//! ARIA annotation
//!
//! Landmarks, heading anchors, image alternatives and screen-reader hints.
//! Every pass leaves author-provided attributes alone.

use std::sync::LazyLock;

use lantern_dom::{Document, NodeId};
use regex::Regex;

use crate::A11yLabels;
use crate::audit::heading_skips;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const DECORATIVE_SELECTOR: &str = ".VPFeature .icon, .decoration, [data-decorative]";

/// Anchor id for a heading: whitespace runs become `-`, lowercased
pub(crate) fn slugify(text: &str) -> String {
    WHITESPACE_RUN
        .replace_all(text.trim(), "-")
        .to_lowercase()
}

fn is_labeled(doc: &Document, id: NodeId) -> bool {
    doc.has_attr(id, "aria-label") || doc.has_attr(id, "aria-labelledby")
}

/// Navigation, main and article landmarks on the theme's layout regions
pub(crate) fn annotate_landmarks(doc: &mut Document, labels: &A11yLabels) {
    let regions = [
        (".VPNav", "navigation", Some(&labels.main_navigation)),
        (".VPSidebar", "navigation", Some(&labels.sidebar_navigation)),
        (".VPDocOutline", "navigation", Some(&labels.document_outline)),
        (".VPContent", "main", Some(&labels.main_content)),
        (".VPDoc", "article", None),
    ];
    for (selector, role, label) in regions {
        let Some(region) = doc.query_selector(selector) else {
            continue;
        };
        if !doc.has_attr(region, "role") {
            doc.set_attr(region, "role", role);
        }
        if let Some(label) = label
            && !is_labeled(doc, region)
        {
            doc.set_attr(region, "aria-label", label);
        }
    }
}

/// Warn about skipped heading levels and backfill anchor ids.
/// Heading levels are never rewritten.
pub(crate) fn annotate_headings(doc: &mut Document) {
    for skip in heading_skips(doc) {
        tracing::warn!(
            element = ?skip.element,
            "Heading level skipped: h{} to h{}",
            skip.from,
            skip.to
        );
    }

    for heading in doc.query_selector_all("h1, h2, h3, h4, h5, h6") {
        if doc.element_id(heading).is_some() {
            continue;
        }
        let slug = slugify(&doc.text_content(heading));
        if !slug.is_empty() {
            doc.set_attr(heading, "id", &slug);
        }
    }
}

/// An image with no usable alternative text
pub(crate) fn lacks_alt(doc: &Document, img: NodeId) -> bool {
    match doc.attr(img, "alt") {
        None => true,
        Some(alt) => alt.is_empty() && !is_presentational(doc, img),
    }
}

pub(crate) fn is_presentational(doc: &Document, id: NodeId) -> bool {
    matches!(doc.attr(id, "role"), Some("presentation" | "none"))
        || doc.attr(id, "aria-hidden") == Some("true")
}

pub(crate) fn annotate_images(doc: &mut Document) {
    for img in doc.query_selector_all("img") {
        annotate_image(doc, img);
    }
}

/// Mark decorative images presentational, or borrow the figure caption
pub(crate) fn annotate_image(doc: &mut Document, img: NodeId) {
    if doc.tag(img) != Some("img") || !lacks_alt(doc, img) {
        return;
    }
    if doc.closest(img, DECORATIVE_SELECTOR).is_some() {
        doc.set_attr(img, "alt", "");
        doc.set_attr(img, "role", "presentation");
        return;
    }

    let caption = doc
        .closest(img, "figure")
        .and_then(|figure| doc.query_selector_in(figure, "figcaption"))
        .map(|caption| doc.text_content(caption).trim().to_string())
        .filter(|caption| !caption.is_empty());
    match caption {
        Some(caption) => doc.set_attr(img, "alt", &caption),
        None => tracing::warn!(
            element = ?img,
            src = doc.attr(img, "src").unwrap_or_default(),
            "Image is missing alt text"
        ),
    }
}

/// Hide icon-only decoration from assistive technology
pub(crate) fn hide_visual_only(doc: &mut Document) {
    for el in doc.query_selector_all(".icon, .emoji, [data-visual]") {
        if !doc.has_attr(el, "aria-label") && doc.text_content(el).trim().is_empty() {
            doc.set_attr(el, "aria-hidden", "true");
        }
    }
}

/// Label feature cards with their ordinal and title
pub(crate) fn describe_features(doc: &mut Document, labels: &A11yLabels) {
    for (index, card) in doc.query_selector_all(".VPFeature").into_iter().enumerate() {
        let text_of = |selector: &str| {
            doc.query_selector_in(card, selector)
                .map(|n| doc.text_content(n).trim().to_string())
                .filter(|t| !t.is_empty())
        };
        let title = text_of(".title");
        let details = text_of(".details");

        if let Some(title) = title {
            let label = format!("{}{}: {}", labels.feature_prefix, index + 1, title);
            doc.set_attr(card, "aria-label", &label);
        }
        if let Some(details) = details {
            doc.set_attr(card, "aria-description", &details);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_html::HtmlParser;
    use pretty_assertions::assert_eq;

    fn parse(html: &str) -> Document {
        HtmlParser::new().parse(html).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting  Started\tGuide"), "getting-started-guide");
        assert_eq!(slugify(" API "), "api");
    }

    #[test]
    fn test_landmarks_respect_existing_labels() {
        let mut doc = parse(
            "<body><nav class=\"VPNav\"></nav>\
             <aside class=\"VPSidebar\" aria-label=\"Docs\"></aside>\
             <div class=\"VPContent\"><div class=\"VPDoc\"></div></div></body>",
        );
        annotate_landmarks(&mut doc, &A11yLabels::default());

        let nav = doc.query_selector(".VPNav").unwrap();
        let sidebar = doc.query_selector(".VPSidebar").unwrap();
        let content = doc.query_selector(".VPContent").unwrap();
        let article = doc.query_selector(".VPDoc").unwrap();
        assert_eq!(doc.attr(nav, "aria-label"), Some("主导航"));
        assert_eq!(doc.attr(sidebar, "aria-label"), Some("Docs"));
        assert_eq!(doc.attr(sidebar, "role"), Some("navigation"));
        assert_eq!(doc.attr(content, "role"), Some("main"));
        assert_eq!(doc.attr(article, "role"), Some("article"));
        assert!(!doc.has_attr(article, "aria-label"));
    }

    #[test]
    fn test_heading_ids_backfilled() {
        let mut doc = parse("<body><h1>Quick Start</h1><h3 id=\"keep\">Deep</h3></body>");
        annotate_headings(&mut doc);

        let h1 = doc.query_selector("h1").unwrap();
        assert_eq!(doc.element_id(h1), Some("quick-start"));
        assert!(doc.query_selector("h3#keep").is_some());
    }

    #[test]
    fn test_image_alt_sources() {
        let mut doc = parse(
            "<body><div class=\"VPFeature\"><div class=\"icon\"><img src=\"i.svg\"></div></div>\
             <figure><img src=\"chart.png\"><figcaption> Throughput </figcaption></figure>\
             <img src=\"orphan.png\"></body>",
        );
        annotate_images(&mut doc);

        let imgs = doc.query_selector_all("img");
        assert_eq!(doc.attr(imgs[0], "alt"), Some(""));
        assert_eq!(doc.attr(imgs[0], "role"), Some("presentation"));
        assert_eq!(doc.attr(imgs[1], "alt"), Some("Throughput"));
        assert!(!doc.has_attr(imgs[2], "alt"));
        assert!(lacks_alt(&doc, imgs[2]));
        assert!(!lacks_alt(&doc, imgs[0]));
    }

    #[test]
    fn test_feature_cards_and_icons() {
        let mut doc = parse(
            "<body><div class=\"VPFeature\"><span class=\"icon\"></span>\
             <h2 class=\"title\">Fast</h2><p class=\"details\">Very fast.</p></div>\
             <div class=\"VPFeature\"><h2 class=\"title\">Small</h2></div>\
             <span class=\"emoji\">🚀</span></body>",
        );
        hide_visual_only(&mut doc);
        describe_features(&mut doc, &A11yLabels::default());

        let cards = doc.query_selector_all(".VPFeature");
        assert_eq!(doc.attr(cards[0], "aria-label"), Some("特性1: Fast"));
        assert_eq!(doc.attr(cards[0], "aria-description"), Some("Very fast."));
        assert_eq!(doc.attr(cards[1], "aria-label"), Some("特性2: Small"));

        let icon = doc.query_selector(".icon").unwrap();
        let emoji = doc.query_selector(".emoji").unwrap();
        assert_eq!(doc.attr(icon, "aria-hidden"), Some("true"));
        assert!(!doc.has_attr(emoji, "aria-hidden"));
    }
}
