//! HTML serialization
//!
//! Writes the arena tree back out as markup, following the HTML fragment
//! serialization rules for void elements, raw text and escaping.

use lantern_dom::{Document, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize the whole document, doctype included
pub fn serialize(doc: &Document) -> String {
    let mut out = String::from("<!DOCTYPE html>");
    for child in doc.children(doc.tree().root()) {
        write_node(doc, child, false, &mut out);
    }
    out
}

fn write_node(doc: &Document, id: NodeId, raw: bool, out: &mut String) {
    let Some(node) = doc.node(id) else { return };
    match &node.data {
        NodeData::Document => {}
        NodeData::Text(text) if raw => out.push_str(text),
        NodeData::Text(text) => escape(text, false, out),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(el.tag());
            for attr in el.attrs() {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&el.tag());
            for child in doc.children(id) {
                write_node(doc, child, raw, out);
            }
            out.push_str("</");
            out.push_str(el.tag());
            out.push('>');
        }
    }
}

fn escape(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HtmlParser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_escapes_and_voids() {
        let doc = HtmlParser::new()
            .parse("<body><p title='a \"b\"'>1 &lt; 2</p><img src=x.png><script>if (a < b) {}</script></body>")
            .unwrap();
        assert_eq!(
            serialize(&doc),
            "<!DOCTYPE html><html><head></head><body>\
             <p title=\"a &quot;b&quot;\">1 &lt; 2</p><img src=\"x.png\">\
             <script>if (a < b) {}</script></body></html>"
        );
    }
}
