//! Form accessibility
//!
//! Labels, descriptions and validity state for form controls.

use lantern_dom::{Document, NodeId};

use crate::A11yLabels;
use crate::aria::slugify;

/// Labels forms and their controls. Holds the counter used to fabricate
/// control ids.
#[derive(Debug, Default)]
pub(crate) struct FormEnhancer {
    next_id: u32,
}

impl FormEnhancer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Label every form by its first heading and enhance its controls
    pub(crate) fn enhance_forms(&mut self, doc: &mut Document) {
        for form in doc.query_selector_all("form") {
            if !doc.has_attr(form, "aria-label")
                && !doc.has_attr(form, "aria-labelledby")
                && let Some(title) = doc.query_selector_in(form, "h1, h2, h3, h4, h5, h6")
            {
                let id = self.ensure_heading_id(doc, title);
                doc.set_attr(form, "aria-labelledby", &id);
            }

            for control in doc.query_selector_all_in(form, "input, select, textarea") {
                self.enhance_control(doc, control);
            }
        }
    }

    /// Id, accessible name and descriptions for one control
    pub(crate) fn enhance_control(&mut self, doc: &mut Document, control: NodeId) {
        let id = match doc.element_id(control) {
            Some(id) => id.to_string(),
            None => {
                let id = self.fabricate_id(doc, "lantern-control");
                doc.set_attr(control, "id", &id);
                id
            }
        };

        let has_label = label_for(doc, &id).is_some() || doc.closest(control, "label").is_some();
        if !has_label
            && !doc.has_attr(control, "aria-label")
            && let Some(name) = nearby_text(doc, control).or_else(|| fallback_name(doc, control))
        {
            doc.set_attr(control, "aria-label", &name);
        }

        if let Some(error) = described_by(doc, "data-error-for", &id) {
            let error_id = ensure_id(doc, error, &format!("{id}-error"));
            add_description(doc, control, &error_id);
            doc.set_attr(control, "aria-invalid", "true");
        }
        if let Some(help) = described_by(doc, "data-help-for", &id) {
            let help_id = ensure_id(doc, help, &format!("{id}-help"));
            add_description(doc, control, &help_id);
        }
        if doc.has_attr(control, "required") && !doc.has_attr(control, "aria-required") {
            doc.set_attr(control, "aria-required", "true");
        }
    }

    fn ensure_heading_id(&mut self, doc: &mut Document, heading: NodeId) -> String {
        if let Some(id) = doc.element_id(heading) {
            return id.to_string();
        }
        let slug = slugify(&doc.text_content(heading));
        let id = if slug.is_empty() || doc.get_element_by_id(&slug).is_some() {
            self.fabricate_id(doc, "lantern-form-title")
        } else {
            slug
        };
        doc.set_attr(heading, "id", &id);
        id
    }

    fn fabricate_id(&mut self, doc: &Document, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{prefix}-{}", self.next_id);
            if doc.get_element_by_id(&id).is_none() {
                return id;
            }
        }
    }
}

fn label_for(doc: &Document, id: &str) -> Option<NodeId> {
    doc.query_selector_all("label[for]")
        .into_iter()
        .find(|&label| doc.attr(label, "for") == Some(id))
}

fn described_by(doc: &Document, attr: &str, id: &str) -> Option<NodeId> {
    doc.query_selector_all(&format!("[{attr}]"))
        .into_iter()
        .find(|&el| doc.attr(el, attr) == Some(id))
}

fn ensure_id(doc: &mut Document, el: NodeId, fallback: &str) -> String {
    match doc.element_id(el) {
        Some(id) => id.to_string(),
        None => {
            doc.set_attr(el, "id", fallback);
            fallback.to_string()
        }
    }
}

fn add_description(doc: &mut Document, control: NodeId, id: &str) {
    let mut tokens = doc.token_list(control, "aria-describedby");
    if tokens.add(id) {
        doc.set_attr(control, "aria-describedby", &tokens.to_string());
    }
}

/// Text of the closest preceding sibling that reads like a label
fn nearby_text(doc: &Document, control: NodeId) -> Option<String> {
    let mut current = doc.previous_sibling(control);
    while let Some(node) = current {
        let text = doc.text_content(node);
        let text = text.trim();
        if text.chars().count() > 2 {
            return Some(text.strip_suffix(':').unwrap_or(text).trim_end().to_string());
        }
        current = doc.previous_sibling(node);
    }
    None
}

fn fallback_name(doc: &Document, control: NodeId) -> Option<String> {
    ["placeholder", "title", "name"]
        .into_iter()
        .filter_map(|attr| doc.attr(control, attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Search boxes get a name, the searchbox role and autocomplete hint
pub(crate) fn enhance_search_inputs(doc: &mut Document, labels: &A11yLabels) {
    for input in doc.query_selector_all("input[type=\"search\"], .DocSearch-Input") {
        if !doc.has_attr(input, "aria-label") {
            doc.set_attr(input, "aria-label", &labels.search);
        }
        doc.set_attr(input, "role", "searchbox");
        doc.set_attr(input, "aria-autocomplete", "both");
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
    fn test_form_labelled_by_heading() {
        let mut doc = parse(
            "<body><form><h2>Contact Us</h2><input name=\"email\"></form>\
             <form aria-label=\"Search\"><h3>Ignored</h3></form></body>",
        );
        FormEnhancer::new().enhance_forms(&mut doc);

        let forms = doc.query_selector_all("form");
        assert_eq!(doc.attr(forms[0], "aria-labelledby"), Some("contact-us"));
        assert!(doc.get_element_by_id("contact-us").is_some());
        assert!(!doc.has_attr(forms[1], "aria-labelledby"));
    }

    #[test]
    fn test_control_names() {
        let mut doc = parse(
            "<body><form>\
             <label for=\"q\">Query</label><input id=\"q\">\
             <label>Name <input id=\"n\"></label>\
             <span>Email:</span><input id=\"e\">\
             <input id=\"p\" placeholder=\"Phone\">\
             <input id=\"x\" aria-label=\"Kept\">\
             </form></body>",
        );
        FormEnhancer::new().enhance_forms(&mut doc);

        let label = |doc: &Document, id: &str| {
            let el = doc.get_element_by_id(id).unwrap();
            doc.attr(el, "aria-label").map(str::to_string)
        };
        assert_eq!(label(&doc, "q"), None);
        assert_eq!(label(&doc, "n"), None);
        assert_eq!(label(&doc, "e").as_deref(), Some("Email"));
        assert_eq!(label(&doc, "x").as_deref(), Some("Kept"));
    }

    #[test]
    fn test_fabricated_ids_skip_existing() {
        let mut doc = parse(
            "<body><div id=\"lantern-control-1\"></div><form><textarea></textarea><select></select></form></body>",
        );
        FormEnhancer::new().enhance_forms(&mut doc);

        let textarea = doc.query_selector("textarea").unwrap();
        let select = doc.query_selector("select").unwrap();
        assert_eq!(doc.element_id(textarea), Some("lantern-control-2"));
        assert_eq!(doc.element_id(select), Some("lantern-control-3"));
    }

    #[test]
    fn test_error_and_help_descriptions() {
        let mut doc = parse(
            "<body><form><input id=\"age\">\
             <p data-error-for=\"age\">Too young</p>\
             <p id=\"age-hint\" data-help-for=\"age\">Years</p></form></body>",
        );
        let mut forms = FormEnhancer::new();
        forms.enhance_forms(&mut doc);
        forms.enhance_forms(&mut doc);

        let input = doc.get_element_by_id("age").unwrap();
        assert_eq!(doc.attr(input, "aria-describedby"), Some("age-error age-hint"));
        assert_eq!(doc.attr(input, "aria-invalid"), Some("true"));
        assert!(doc.get_element_by_id("age-error").is_some());
    }

    #[test]
    fn test_required_state_mirrored() {
        let mut doc = parse("<body><form><input id=\"r\" required><input id=\"o\"></form></body>");
        FormEnhancer::new().enhance_forms(&mut doc);

        let required = doc.get_element_by_id("r").unwrap();
        let optional = doc.get_element_by_id("o").unwrap();
        assert_eq!(doc.attr(required, "aria-required"), Some("true"));
        assert!(!doc.has_attr(optional, "aria-required"));
    }

    #[test]
    fn test_search_inputs() {
        let mut doc = parse(
            "<body><input type=\"search\"><input class=\"DocSearch-Input\" aria-label=\"Find\"></body>",
        );
        enhance_search_inputs(&mut doc, &A11yLabels::default());

        let inputs = doc.query_selector_all("input");
        assert_eq!(doc.attr(inputs[0], "aria-label"), Some("搜索文档"));
        assert_eq!(doc.attr(inputs[1], "aria-label"), Some("Find"));
        for input in inputs {
            assert_eq!(doc.attr(input, "role"), Some("searchbox"));
            assert_eq!(doc.attr(input, "aria-autocomplete"), Some("both"));
        }
    }
}
