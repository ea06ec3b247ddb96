//! Page-level navigation aids
//!
//! Skip link, language attributes and link annotations.

use std::sync::LazyLock;

use lantern_dom::{Document, NodeId};
use regex::Regex;
use url::Url;

use crate::A11yLabels;
use crate::focus::main_region;

static ENGLISH_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s\.,!?]+$").unwrap());

const DEFAULT_LANG: &str = "zh-CN";
const MAIN_CONTENT_ID: &str = "main-content";
const DOWNLOAD_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Insert (or reuse) the skip link as the first child of `<body>` and
/// point it at the main region
pub(crate) fn install_skip_link(doc: &mut Document, text: &str) -> Option<NodeId> {
    let body = doc.body();
    if !body.is_valid() {
        return None;
    }

    let target = match main_region(doc) {
        Some(main) => match doc.element_id(main) {
            Some(id) => id.to_string(),
            None => {
                doc.set_attr(main, "id", MAIN_CONTENT_ID);
                MAIN_CONTENT_ID.to_string()
            }
        },
        None => MAIN_CONTENT_ID.to_string(),
    };

    let link = match doc.query_selector(".skip-link") {
        Some(existing) => existing,
        None => {
            let link = doc.create_element("a");
            doc.set_attr(link, "class", "skip-link");
            doc.set_text_content(link, text);
            doc.prepend(body, link).ok()?;
            link
        }
    };
    doc.set_attr(link, "href", &format!("#{target}"));
    doc.set_attr(link, "tabindex", "1");
    Some(link)
}

/// Default `<html lang>` and mark English-only text blocks
pub(crate) fn apply_language_attributes(doc: &mut Document) {
    let root = doc.document_element();
    if doc.attr(root, "lang").is_none_or(|lang| lang.trim().is_empty()) {
        doc.set_attr(root, "lang", DEFAULT_LANG);
    }

    for el in doc.query_selector_all("p, h1, h2, h3, h4, h5, h6, li, td, th") {
        if doc.has_attr(el, "lang") {
            continue;
        }
        let text = doc.text_content(el);
        if ENGLISH_TEXT.is_match(text.trim()) {
            doc.set_attr(el, "lang", "en");
        }
    }
}

/// Current-page, external and download link annotations
pub(crate) fn enhance_navigation_links(doc: &mut Document, labels: &A11yLabels) {
    for link in doc.query_selector_all("a[aria-current=\"page\"], .router-link-active") {
        doc.set_attr(link, "aria-current", "page");
    }

    let host = doc.base_url().and_then(|u| u.host_str().map(str::to_string));
    let suffixes = [
        format!(" ({})", labels.new_tab),
        format!(" {})", labels.file_download),
    ];

    for link in doc.query_selector_all("a[href]") {
        let Some(href) = doc.attr(link, "href").map(str::to_string) else {
            continue;
        };
        let external = is_external(&href, host.as_deref());
        let download = download_extension(doc, link, &href);
        if !external && download.is_none() {
            continue;
        }

        let mut label = base_text(doc, link, &suffixes);
        if external {
            label.push_str(&format!(" ({})", labels.new_tab));
            doc.set_attr(link, "rel", "noopener noreferrer");
        }
        if let Some(ext) = download {
            label.push_str(&format!(" ({ext} {})", labels.file_download));
        }
        if doc.attr(link, "aria-label") != Some(label.as_str()) {
            doc.set_attr(link, "aria-label", &label);
        }
    }
}

fn is_external(href: &str, host: Option<&str>) -> bool {
    if !href.starts_with("http") {
        return false;
    }
    match Url::parse(href) {
        Ok(url) => url.host_str() != host,
        Err(_) => false,
    }
}

/// Upper-cased extension for download links
fn download_extension(doc: &Document, link: NodeId, href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    let by_extension = ext
        .as_deref()
        .is_some_and(|e| DOWNLOAD_EXTENSIONS.contains(&e));
    if !by_extension && !doc.has_attr(link, "download") {
        return None;
    }
    Some(
        ext.filter(|e| !e.contains('/'))
            .unwrap_or_default()
            .to_ascii_uppercase(),
    )
}

/// Link text, or the existing label with our own suffixes removed
fn base_text(doc: &Document, link: NodeId, suffixes: &[String]) -> String {
    let text = doc.text_content(link).trim().to_string();
    if !text.is_empty() {
        return text;
    }
    let Some(mut label) = doc.attr(link, "aria-label").map(str::to_string) else {
        return String::new();
    };
    loop {
        let before = label.len();
        if label.ends_with(&suffixes[0]) {
            label.truncate(label.len() - suffixes[0].len());
        } else if label.ends_with(&suffixes[1])
            && let Some(start) = label.rfind(" (")
        {
            label.truncate(start);
        }
        if label.len() == before {
            return label;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_html::HtmlParser;
    use pretty_assertions::assert_eq;

    fn parse(html: &str) -> Document {
        HtmlParser::new()
            .parse_with_url(html, "https://docs.example.com/guide/")
            .unwrap()
    }

    #[test]
    fn test_skip_link_targets_main() {
        let mut doc = parse("<body><nav>n</nav><main>m</main></body>");
        let link = install_skip_link(&mut doc, "跳转到主内容").unwrap();

        assert_eq!(doc.first_child(doc.body()), Some(link));
        assert_eq!(doc.attr(link, "href"), Some("#main-content"));
        assert_eq!(doc.attr(link, "tabindex"), Some("1"));
        assert!(doc.get_element_by_id("main-content").is_some());

        assert_eq!(install_skip_link(&mut doc, "跳转到主内容"), Some(link));
        assert_eq!(doc.query_selector_all(".skip-link").len(), 1);
    }

    #[test]
    fn test_skip_link_uses_existing_id() {
        let mut doc = parse("<body><div class=\"VPContent\" id=\"VPContent\">m</div></body>");
        let link = install_skip_link(&mut doc, "Skip").unwrap();
        assert_eq!(doc.attr(link, "href"), Some("#VPContent"));
        assert_eq!(doc.text_content(link), "Skip");
    }

    #[test]
    fn test_language_attributes() {
        let mut doc = parse(
            "<body><p>Hello, world!</p><p>你好</p><li lang=\"fr\">Bonjour</li><td>v1.2</td></body>",
        );
        apply_language_attributes(&mut doc);

        let root = doc.document_element();
        assert_eq!(doc.attr(root, "lang"), Some("zh-CN"));
        let ps = doc.query_selector_all("p");
        assert_eq!(doc.attr(ps[0], "lang"), Some("en"));
        assert!(!doc.has_attr(ps[1], "lang"));
        let li = doc.query_selector("li").unwrap();
        assert_eq!(doc.attr(li, "lang"), Some("fr"));
        let td = doc.query_selector("td").unwrap();
        assert!(!doc.has_attr(td, "lang"));
    }

    #[test]
    fn test_external_link_label_is_stable() {
        let mut doc = parse(
            "<body><a href=\"https://github.com/x\">Report</a>\
             <a href=\"https://docs.example.com/api\">Same host</a></body>",
        );
        let labels = A11yLabels::default();
        enhance_navigation_links(&mut doc, &labels);
        enhance_navigation_links(&mut doc, &labels);

        let links = doc.query_selector_all("a");
        assert_eq!(doc.attr(links[0], "aria-label"), Some("Report (在新标签页中打开)"));
        assert_eq!(doc.attr(links[0], "rel"), Some("noopener noreferrer"));
        assert!(!doc.has_attr(links[1], "aria-label"));
    }

    #[test]
    fn test_download_and_current_links() {
        let mut doc = parse(
            "<body><a href=\"/files/guide.pdf\">Guide</a>\
             <a href=\"https://cdn.other.org/spec.docx\"></a>\
             <a class=\"router-link-active\" href=\"/guide/\">Guide</a></body>",
        );
        let labels = A11yLabels::default();
        enhance_navigation_links(&mut doc, &labels);

        let links = doc.query_selector_all("a");
        assert_eq!(doc.attr(links[0], "aria-label"), Some("Guide (PDF 文件下载)"));
        assert_eq!(
            doc.attr(links[1], "aria-label"),
            Some(" (在新标签页中打开) (DOCX 文件下载)")
        );
        assert_eq!(doc.attr(links[2], "aria-current"), Some("page"));

        enhance_navigation_links(&mut doc, &labels);
        assert_eq!(
            doc.attr(links[1], "aria-label"),
            Some(" (在新标签页中打开) (DOCX 文件下载)")
        );
    }
}
