//! Language toggle
//!
//! The page language lives in `<html lang>`. Switching rewrites bilingual
//! text in place and persists the choice in storage.

use lantern_dom::{Document, Environment, NodeId};
use serde::{Deserialize, Serialize};

/// Storage key for the persisted choice
pub const LANGUAGE_STORAGE_KEY: &str = "preferred-language";

/// Custom event dispatched after every switch; the detail is the code
pub const LANGUAGE_CHANGE_EVENT: &str = "languagechange";

pub(crate) const TOGGLE_SELECTOR: &str = ".lang-switch-btn";

/// Labels for `[data-nav-key]` elements as (key, zh, en)
const NAV_LABELS: [(&str, &str, &str); 8] = [
    ("home", "首页", "Home"),
    ("products", "产品", "Products"),
    ("services", "服务", "Services"),
    ("cases", "案例", "Cases"),
    ("docs", "文档", "Docs"),
    ("blog", "博客", "Blog"),
    ("about", "关于我们", "About"),
    ("contact", "联系我们", "Contact"),
];

/// Site language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    /// Short code, as stored and dispatched
    pub fn code(self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "zh" => Some(Language::Zh),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Language::Zh => Language::En,
            Language::En => Language::Zh,
        }
    }

    fn html_lang(self) -> &'static str {
        match self {
            Language::Zh => "zh-CN",
            Language::En => "en-US",
        }
    }

    fn toggle_text(self) -> &'static str {
        match self {
            Language::Zh => "中",
            Language::En => "EN",
        }
    }
}

/// Language currently shown, from `<html lang>`
pub fn current_language(doc: &Document) -> Language {
    match doc.attr(doc.document_element(), "lang") {
        Some(lang) if lang.starts_with("en") => Language::En,
        _ => Language::Zh,
    }
}

/// Language to start with: the stored choice, else the browser language
pub fn preferred_language(env: &Environment) -> Language {
    if let Some(stored) = env
        .storage
        .get_item(LANGUAGE_STORAGE_KEY)
        .and_then(Language::from_code)
    {
        return stored;
    }
    if env.language.to_lowercase().starts_with("en") {
        Language::En
    } else {
        Language::Zh
    }
}

/// Show the page in `lang` and dispatch `languagechange`
pub fn set_language(doc: &mut Document, lang: Language) {
    let html = doc.document_element();
    if html.is_valid() {
        doc.set_attr(html, "lang", lang.html_lang());
    }

    if let Some(text) = doc.query_selector(&format!("{TOGGLE_SELECTOR} .lang-text")) {
        doc.set_text_content(text, lang.toggle_text());
    }

    for el in doc.query_selector_all("[data-lang-zh][data-lang-en]") {
        let text = doc
            .attr(el, &format!("data-lang-{}", lang.code()))
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if let Some(text) = text {
            doc.set_text_content(el, &text);
        }
    }

    for (key, zh, en) in NAV_LABELS {
        let label = match lang {
            Language::Zh => zh,
            Language::En => en,
        };
        for el in doc.query_selector_all(&format!("[data-nav-key=\"{key}\"]")) {
            doc.set_text_content(el, label);
        }
    }

    let body = doc.body();
    if body.is_valid() {
        doc.toggle_class(body, "lang-en", Some(lang == Language::En));
        doc.toggle_class(body, "lang-zh", Some(lang == Language::Zh));
    }

    doc.dispatch_custom(LANGUAGE_CHANGE_EVENT, lang.code());
    tracing::debug!(language = lang.code(), "language applied");
}

/// Insert the toggle button next to the appearance switch, or into the
/// navigation bar when there is none. Returns the existing button if the
/// page already has one.
pub(crate) fn install_toggle(doc: &mut Document) -> Option<NodeId> {
    if let Some(existing) = doc.query_selector(TOGGLE_SELECTOR) {
        return Some(existing);
    }

    let anchor = doc
        .query_selector(".VPSwitchAppearance")
        .or_else(|| doc.query_selector("[title*=\"深色\"]"))
        .or_else(|| doc.query_selector("[title*=\"Dark\"]"));

    if let Some(anchor) = anchor
        && let Some(parent) = doc.parent(anchor)
    {
        let button = create_button(doc, "lang-switch-btn")?;
        let container = doc.create_element("div");
        doc.set_attr(container, "class", "VP-lang-toggle");
        doc.set_attr(container, "aria-label", "语言切换");
        doc.append_child(container, button).ok()?;
        let after = doc.next_sibling(anchor);
        doc.insert_before(parent, container, after).ok()?;
        let body = doc.body();
        doc.add_class(body, "has-lang-toggle");
        return Some(button);
    }

    tracing::warn!("Appearance switch not found, adding language toggle to navigation bar");
    let nav = doc
        .query_selector(".VPNavBarTitle")
        .or_else(|| doc.query_selector(".VPNav"))?;
    let button = create_button(doc, "lang-switch-btn nav-position")?;
    doc.append_child(nav, button).ok()?;
    Some(button)
}

fn create_button(doc: &mut Document, class: &str) -> Option<NodeId> {
    let button = doc.create_element("button");
    doc.set_attr(button, "class", class);
    doc.set_attr(button, "type", "button");
    doc.set_attr(button, "aria-label", "切换语言");
    for (class, text) in [("lang-icon", "🌐"), ("lang-text", Language::Zh.toggle_text())] {
        let span = doc.create_element("span");
        doc.set_attr(span, "class", class);
        doc.set_text_content(span, text);
        doc.append_child(button, span).ok()?;
    }
    Some(button)
}
