//! Lantern
//!
//! Client-side enhancement for rendered documentation sites. A [`Page`]
//! owns the document and the host environment, mounts the accessibility
//! and performance managers and forwards host events to them.
//!
//! # Example
//! ```rust,ignore
//! use lantern::{Page, Environment};
//! use lantern::a11y::A11yConfig;
//! use lantern::perf::PerfConfig;
//!
//! let mut page = Page::load(html, "https://docs.example.com/", Environment::default())?;
//! page.init_accessibility(A11yConfig::default())?;
//! page.init_performance(PerfConfig::default())?;
//! page.init_theme();
//! page.press_tab(false);
//! page.advance(1000.0);
//! ```

mod page;
pub mod theme;

pub use page::Page;

pub use lantern_dom::{BuildMode, Environment, HostKind};

// Re-export sub-crates for advanced usage
pub use lantern_a11y as a11y;
pub use lantern_dom as dom;
pub use lantern_html as html;
pub use lantern_perf as perf;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Page-level error
#[derive(Debug, thiserror::Error)]
pub enum LanternError {
    #[error("{0} manager already initialized with a different config")]
    AlreadyInitialized(&'static str),

    #[error(transparent)]
    Html(#[from] lantern_html::HtmlError),

    #[error(transparent)]
    A11y(#[from] lantern_a11y::A11yError),

    #[error(transparent)]
    Perf(#[from] lantern_perf::PerfError),
}
