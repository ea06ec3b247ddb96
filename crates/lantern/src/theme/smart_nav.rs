//! Navigation bar scroll behavior

use lantern_dom::Document;

const NAV_SELECTOR: &str = ".VPNav";

/// Past this offset the bar is styled as scrolled
const SCROLLED_OFFSET: f64 = 100.0;

/// Scrolling down past this offset hides the bar
const HIDE_OFFSET: f64 = 200.0;

/// Tracks the previous scroll position to tell direction
#[derive(Debug, Default)]
pub struct SmartNav {
    last_scroll_y: f64,
}

impl SmartNav {
    pub fn new() -> Self {
        Self::default()
    }

    /// One animation frame after a scroll to `scroll_y`
    pub fn update(&mut self, doc: &mut Document, scroll_y: f64) {
        let Some(nav) = doc.query_selector(NAV_SELECTOR) else {
            return;
        };

        doc.toggle_class(nav, "scrolled", Some(scroll_y > SCROLLED_OFFSET));

        let hide = scroll_y > self.last_scroll_y && scroll_y > HIDE_OFFSET;
        doc.toggle_class(nav, "hide-on-scroll", Some(hide));
        doc.toggle_class(nav, "show-on-scroll", Some(!hide));

        self.last_scroll_y = scroll_y;
    }
}
