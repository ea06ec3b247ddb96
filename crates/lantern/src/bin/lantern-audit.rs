//! lantern-audit - accessibility audit for a rendered page
//!
//! Mounts the page in development mode, runs the audit and contrast
//! passes and prints the findings as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use lantern::a11y::{A11yConfig, A11yIssue, AuditReport, IssueSeverity};
use lantern::{Environment, Page};

/// Audit a rendered HTML page for accessibility defects.
#[derive(Parser)]
#[command(name = "lantern-audit", version, about)]
struct Cli {
    /// HTML file to audit
    input: PathBuf,

    /// URL the page is served at; decides which links are external
    #[arg(long, default_value = "http://localhost/")]
    url: String,

    /// Accessibility config as JSON; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the enhanced HTML here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Exit with status 1 when any issue is found
    #[arg(long)]
    fail_on_issues: bool,

    /// Log pass progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct IssueEntry {
    severity: IssueSeverity,
    wcag: &'static str,
    #[serde(flatten)]
    issue: A11yIssue,
}

#[derive(Serialize)]
struct Output<'a> {
    url: &'a str,
    clean: bool,
    issues: Vec<IssueEntry>,
    report: &'a AuditReport,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let html = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            A11yConfig::from_json(&json).context("Invalid accessibility config")?
        }
        None => A11yConfig::default(),
    };

    let mut page = Page::load(&html, &cli.url, Environment::development())
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    page.init_accessibility(config)?;

    let Some(report) = page
        .accessibility()
        .and_then(|a11y| a11y.run_audit(page.document()))
    else {
        bail!("Accessibility manager did not activate");
    };

    let issues: Vec<IssueEntry> = report
        .issues()
        .into_iter()
        .map(|issue| IssueEntry {
            severity: issue.severity(),
            wcag: issue.wcag_criteria(),
            issue,
        })
        .collect();
    let output = Output {
        url: &cli.url,
        clean: issues.is_empty(),
        issues,
        report: &report,
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");

    if let Some(path) = &cli.output {
        fs::write(path, lantern::html::serialize(page.document()))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "enhanced page written");
    }

    let clean = output.clean;
    page.unmount();
    if cli.fail_on_issues && !clean {
        std::process::exit(1);
    }
    Ok(())
}
