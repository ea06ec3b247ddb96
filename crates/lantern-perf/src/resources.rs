//! Resource priorities and hints

use lantern_dom::{Document, NodeId};

use crate::PerfConfig;

const FONT_DISPLAY_MARKER: &str = "data-lantern-font-display";

const FONT_DISPLAY_CSS: &str = r#"
@font-face {
  font-family: 'PingFang SC';
  font-display: swap;
}
"#;

/// Raise the critical stylesheet and font links to high priority
pub(crate) fn prioritize_critical(doc: &mut Document, config: &PerfConfig) {
    let critical = format!("link[href*=\"{}\"]", config.critical_stylesheet);
    if let Some(link) = doc.query_selector(&critical) {
        doc.set_attr(link, "importance", "high");
        doc.set_attr(link, "fetchpriority", "high");
    }

    for link in doc.query_selector_all("link[href*=\"font\"]") {
        doc.set_attr(link, "importance", "high");
        doc.set_attr(link, "crossorigin", "anonymous");
    }
}

/// Append the deferred third-party scripts to `<head>`. A script whose
/// `src` is already present is not added again.
pub(crate) fn load_deferred_scripts(doc: &mut Document, scripts: &[String]) -> Vec<NodeId> {
    let head = doc.head();
    if !head.is_valid() {
        return Vec::new();
    }

    let mut added = Vec::new();
    for src in scripts {
        let exists = doc
            .query_selector_all("script[src]")
            .into_iter()
            .any(|s| doc.attr(s, "src") == Some(src.as_str()));
        if exists {
            continue;
        }
        let script = doc.create_element("script");
        doc.set_attr(script, "src", src);
        doc.set_attr(script, "defer", "");
        doc.set_attr(script, "loading", "lazy");
        if doc.append_child(head, script).is_ok() {
            tracing::debug!(%src, "deferred script appended");
            added.push(script);
        }
    }
    added
}

/// One `font-display: swap` block in `<head>`
pub(crate) fn optimize_font_loading(doc: &mut Document) {
    let head = doc.head();
    if !head.is_valid() || doc.query_selector(&format!("style[{FONT_DISPLAY_MARKER}]")).is_some() {
        return;
    }
    let style = doc.create_element("style");
    doc.set_attr(style, FONT_DISPLAY_MARKER, "");
    doc.set_text_content(style, FONT_DISPLAY_CSS);
    if let Err(e) = doc.append_child(head, style) {
        tracing::warn!(error = %e, "font-display block not inserted");
    }
}

/// Non-critical stylesheets load at low priority
pub(crate) fn optimize_css_loading(doc: &mut Document) {
    for link in doc.query_selector_all("link[rel=\"stylesheet\"]:not([data-critical])") {
        doc.set_attr(link, "importance", "low");
    }
}

/// `dns-prefetch` and `preconnect` hints for the configured domains
pub(crate) fn install_resource_hints(doc: &mut Document, config: &PerfConfig) {
    for domain in &config.dns_prefetch_domains {
        add_hint(doc, "dns-prefetch", domain, false);
    }
    for domain in &config.preconnect_domains {
        add_hint(doc, "preconnect", domain, true);
    }
}

fn add_hint(doc: &mut Document, rel: &str, domain: &str, crossorigin: bool) {
    let head = doc.head();
    if !head.is_valid() {
        return;
    }
    let href = format!("//{domain}");
    let exists = doc
        .query_selector_all(&format!("link[rel=\"{rel}\"]"))
        .into_iter()
        .any(|l| doc.attr(l, "href") == Some(href.as_str()));
    if exists {
        return;
    }

    let link = doc.create_element("link");
    doc.set_attr(link, "rel", rel);
    doc.set_attr(link, "href", &href);
    if crossorigin {
        doc.set_attr(link, "crossorigin", "anonymous");
    }
    if let Err(e) = doc.append_child(head, link) {
        tracing::warn!(rel, %href, error = %e, "resource hint not inserted");
    }
}
