//! Accessibility audit
//!
//! Detection of common page defects, reported as structured issues.

use lantern_dom::{Document, NodeId};
use serde::Serialize;

use crate::aria::{is_presentational, lacks_alt};
use crate::contrast::ContrastIssue;

/// Issue severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// Should fix for better accessibility
    Warning,
    /// Must fix - fails WCAG AA
    Error,
}

/// Accessibility issue type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum A11yIssue {
    /// Image missing alt text
    MissingAltText { element: NodeId },
    /// Heading level skipped
    HeadingSkip {
        element: NodeId,
        expected_level: u8,
        actual_level: u8,
    },
    /// Page does not have exactly one `<h1>`
    H1Count { count: usize },
    /// Form control without an accessible name
    FormMissingLabel { element: NodeId },
    /// Link with no accessible name
    EmptyLink { element: NodeId },
    /// Low color contrast
    LowContrast { element: NodeId, ratio: f64 },
}

impl A11yIssue {
    pub fn severity(&self) -> IssueSeverity {
        match self {
            Self::HeadingSkip { .. } | Self::H1Count { .. } => IssueSeverity::Warning,
            _ => IssueSeverity::Error,
        }
    }

    /// WCAG success criterion this affects
    pub fn wcag_criteria(&self) -> &'static str {
        match self {
            Self::MissingAltText { .. } => "1.1.1 Non-text Content",
            Self::HeadingSkip { .. } | Self::H1Count { .. } => "1.3.1 Info and Relationships",
            Self::FormMissingLabel { .. } => "4.1.2 Name, Role, Value",
            Self::EmptyLink { .. } => "2.4.4 Link Purpose",
            Self::LowContrast { .. } => "1.4.3 Contrast (Minimum)",
        }
    }
}

/// A heading deeper than its predecessor allows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeadingSkip {
    pub element: NodeId,
    /// Previous heading level (0 before the first heading)
    pub from: u8,
    pub to: u8,
}

/// Audit result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditReport {
    pub images_missing_alt: Vec<NodeId>,
    pub heading_skips: Vec<HeadingSkip>,
    pub h1_count: usize,
    pub unlabeled_controls: Vec<NodeId>,
    pub unlabeled_links: Vec<NodeId>,
    pub contrast_issues: Vec<ContrastIssue>,
}

impl AuditReport {
    /// Flatten into individual issues
    pub fn issues(&self) -> Vec<A11yIssue> {
        let mut issues: Vec<A11yIssue> = self
            .images_missing_alt
            .iter()
            .map(|&element| A11yIssue::MissingAltText { element })
            .collect();
        issues.extend(self.heading_skips.iter().map(|s| A11yIssue::HeadingSkip {
            element: s.element,
            expected_level: s.from + 1,
            actual_level: s.to,
        }));
        if self.h1_count != 1 {
            issues.push(A11yIssue::H1Count {
                count: self.h1_count,
            });
        }
        issues.extend(
            self.unlabeled_controls
                .iter()
                .map(|&element| A11yIssue::FormMissingLabel { element }),
        );
        issues.extend(
            self.unlabeled_links
                .iter()
                .map(|&element| A11yIssue::EmptyLink { element }),
        );
        issues.extend(self.contrast_issues.iter().map(|c| A11yIssue::LowContrast {
            element: c.element,
            ratio: c.ratio,
        }));
        issues
    }

    pub fn is_clean(&self) -> bool {
        self.issues().is_empty()
    }
}

/// Headings whose level exceeds the previous heading's level by more than one
pub(crate) fn heading_skips(doc: &Document) -> Vec<HeadingSkip> {
    let mut current = 0u8;
    let mut skips = Vec::new();
    for heading in doc.query_selector_all("h1, h2, h3, h4, h5, h6") {
        let Some(level) = doc.element(heading).and_then(|e| e.heading_level()) else {
            continue;
        };
        if level > current + 1 {
            skips.push(HeadingSkip {
                element: heading,
                from: current,
                to: level,
            });
        }
        current = level;
    }
    skips
}

/// Does the control have a name from ARIA or an associated `<label>`?
pub(crate) fn control_has_name(doc: &Document, control: NodeId) -> bool {
    let non_empty = |name: &str| doc.attr(control, name).is_some_and(|v| !v.trim().is_empty());
    if non_empty("aria-label") || non_empty("aria-labelledby") {
        return true;
    }
    if doc.closest(control, "label").is_some() {
        return true;
    }
    doc.element_id(control).is_some_and(|id| {
        doc.query_selector_all("label[for]")
            .into_iter()
            .any(|label| doc.attr(label, "for") == Some(id))
    })
}

fn link_has_name(doc: &Document, link: NodeId) -> bool {
    let non_empty = |name: &str| doc.attr(link, name).is_some_and(|v| !v.trim().is_empty());
    if non_empty("aria-label") || non_empty("aria-labelledby") || non_empty("title") {
        return true;
    }
    if !doc.text_content(link).trim().is_empty() {
        return true;
    }
    doc.query_selector_all_in(link, "img[alt]")
        .into_iter()
        .any(|img| doc.attr(img, "alt").is_some_and(|alt| !alt.trim().is_empty()))
}

/// Audit the page. Contrast issues gathered earlier are carried into the report.
pub(crate) fn run(doc: &Document, contrast_issues: &[ContrastIssue]) -> AuditReport {
    let images_missing_alt = doc
        .query_selector_all("img")
        .into_iter()
        .filter(|&img| !is_presentational(doc, img) && lacks_alt(doc, img))
        .collect();

    let h1_count = doc.query_selector_all("h1").len();

    let unlabeled_controls = doc
        .query_selector_all("input:not([type=\"hidden\"]), select, textarea")
        .into_iter()
        .filter(|&c| !control_has_name(doc, c))
        .collect();

    let unlabeled_links = doc
        .query_selector_all("a[href]")
        .into_iter()
        .filter(|&a| !link_has_name(doc, a))
        .collect();

    let report = AuditReport {
        images_missing_alt,
        heading_skips: heading_skips(doc),
        h1_count,
        unlabeled_controls,
        unlabeled_links,
        contrast_issues: contrast_issues.to_vec(),
    };
    log_report(&report);
    report
}

fn log_report(report: &AuditReport) {
    let issues = report.issues();
    if issues.is_empty() {
        tracing::info!("Accessibility audit: no issues found");
    } else {
        let _group = tracing::info_span!("accessibility_issues", count = issues.len()).entered();
        for issue in &issues {
            tracing::warn!(
                severity = ?issue.severity(),
                wcag = issue.wcag_criteria(),
                "{:?}",
                issue
            );
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
    fn test_heading_skips_from_zero() {
        let doc = parse("<body><h2>a</h2><h3>b</h3><h5>c</h5><h1>d</h1><h2>e</h2></body>");
        let skips = heading_skips(&doc);
        assert_eq!(
            skips.iter().map(|s| (s.from, s.to)).collect::<Vec<_>>(),
            vec![(0, 2), (3, 5)]
        );
    }

    #[test]
    fn test_audit_counts() {
        let doc = parse(
            "<body><h1>Title</h1><h1>Again</h1>\
             <img src=\"a.png\"><img src=\"b.png\" alt=\"\" role=\"presentation\"><img src=\"c.png\" alt=\"C\">\
             <label for=\"q\">Query</label><input id=\"q\"><label>Name <input></label><input type=\"text\">\
             <input type=\"hidden\" name=\"token\">\
             <a href=\"/x\">X</a><a href=\"/y\"></a><a href=\"/z\" aria-label=\"\"></a>\
             <a href=\"/i\"><img src=\"i.png\" alt=\"Home\"></a></body>",
        );
        let report = run(&doc, &[]);

        assert_eq!(report.images_missing_alt.len(), 1);
        assert_eq!(report.h1_count, 2);
        assert_eq!(report.unlabeled_controls.len(), 1);
        assert_eq!(report.unlabeled_links.len(), 2);
        assert!(report.issues().contains(&A11yIssue::H1Count { count: 2 }));
    }

    #[test]
    fn test_clean_page() {
        let doc = parse("<body><h1>Title</h1><h2>Sub</h2><img src=\"a.png\" alt=\"A\"></body>");
        assert!(run(&doc, &[]).is_clean());
    }

    #[test]
    fn test_issue_severity() {
        let skip = A11yIssue::HeadingSkip {
            element: NodeId::ROOT,
            expected_level: 2,
            actual_level: 3,
        };
        assert_eq!(skip.severity(), IssueSeverity::Warning);
        assert_eq!(
            A11yIssue::MissingAltText { element: NodeId::ROOT }.severity(),
            IssueSeverity::Error
        );
    }
}
