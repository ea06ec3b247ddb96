//! Geometry APIs
//!
//! DOMRect and the root-margin arithmetic used by intersection observers.

/// DOMRect - rectangle geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Zero width or height
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Edge-inclusive overlap test, so zero-area boxes sitting inside
    /// `other` still count as intersecting.
    pub fn touches(&self, other: &DOMRect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Overlapping region, if the rects touch
    pub fn intersection(&self, other: &DOMRect) -> Option<DOMRect> {
        if !self.touches(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(DOMRect::from_xywh(x, y, right - x, bottom - y))
    }

    /// Grow outward by a root margin (negative margins shrink)
    pub fn expand(&self, margin: &RootMargin) -> DOMRect {
        DOMRect::from_xywh(
            self.x - margin.left,
            self.y - margin.top,
            self.width + margin.left + margin.right,
            self.height + margin.top + margin.bottom,
        )
    }
}

/// Root margin in pixels, CSS shorthand order
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    /// Parse `"50px"`, `"50px 0px"`, `"0px 0px -50px 0px"` and friends.
    /// Unparseable components are treated as zero.
    pub fn parse(value: &str) -> Self {
        let parts: Vec<f64> = value
            .split_ascii_whitespace()
            .map(|p| p.trim_end_matches("px").parse::<f64>().unwrap_or(0.0))
            .collect();
        let (top, right, bottom, left) = match parts.as_slice() {
            [] => (0.0, 0.0, 0.0, 0.0),
            [a] => (*a, *a, *a, *a),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l, ..] => (*t, *r, *b, *l),
        };
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}
