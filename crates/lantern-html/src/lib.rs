//! Lantern HTML
//!
//! Loads rendered pages into a `lantern_dom::Document` with html5ever and
//! writes them back out after enhancement.

mod inline_style;
mod parser;
mod serialize;

pub use inline_style::{apply_inline_styles, parse_inline_style};
pub use parser::HtmlParser;
pub use serialize::serialize;

use lantern_dom::Document;

/// Parse an HTML string into a document at `url`
pub fn parse(html: &str, url: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse_with_url(html, url)
}

/// HTML loading error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document has no <{0}> element")]
    MissingElement(&'static str),
}
