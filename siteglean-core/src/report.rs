// Crawl summaries for the terminal and for files

use crate::crawl::extract_url_path;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use siteglean_scanner::{CrawlReport, FailureKind};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

/// Page paths and failures of one host, sorted.
struct HostSummary<'a> {
    pages: Vec<String>,
    failures: Vec<(String, FailureKind, &'a str)>,
}

fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.host_str().map(|h| match u.port() {
                Some(port) => format!("{}:{}", h, port),
                None => h.to_string(),
            })
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn group_by_host(reports: &[CrawlReport]) -> BTreeMap<String, HostSummary<'_>> {
    let mut by_host: BTreeMap<String, HostSummary<'_>> = BTreeMap::new();

    for report in reports {
        for url in report.urls() {
            by_host
                .entry(host_of(url))
                .or_insert_with(|| HostSummary {
                    pages: Vec::new(),
                    failures: Vec::new(),
                })
                .pages
                .push(url.to_string());
        }
        for failure in &report.failures {
            by_host
                .entry(host_of(&failure.url))
                .or_insert_with(|| HostSummary {
                    pages: Vec::new(),
                    failures: Vec::new(),
                })
                .failures
                .push((failure.url.clone(), failure.kind, failure.reason.as_str()));
        }
    }

    for summary in by_host.values_mut() {
        summary.pages.sort();
        summary.failures.sort_by(|a, b| a.0.cmp(&b.0));
    }
    by_host
}

/// Generate a crawl report from results
pub fn generate_crawl_report(reports: &[CrawlReport]) -> String {
    let pages: usize = reports.iter().map(|r| r.pages.len()).sum();
    let failures: usize = reports.iter().map(|r| r.failures.len()).sum();
    let not_found: usize = reports.iter().map(|r| r.not_found().count()).sum();

    let mut report = String::new();
    report.push_str(RULE);
    report.push('\n');
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Seeds crawled: {}\n", reports.len()));
    report.push_str(&format!("  Pages fetched: {}\n", pages));
    report.push_str(&format!(
        "  Failed: {} ({} not found, {} gave up)\n",
        failures,
        not_found,
        failures - not_found
    ));
    if reports.iter().any(|r| r.cancelled) {
        report.push_str("  Cancelled before completion\n");
    }
    report.push('\n');
    report.push_str(RULE);
    report.push('\n');

    for (host, summary) in group_by_host(reports) {
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} pages fetched\n\n", summary.pages.len()));

        for url in &summary.pages {
            report.push_str(&format!("  {} {}\n", "OK ".green(), extract_url_path(url)));
        }
        for (url, kind, reason) in &summary.failures {
            let label = match kind {
                FailureKind::NotFound => "404".yellow(),
                FailureKind::RetriesExhausted => "ERR".red(),
                FailureKind::OffSite => "OFF".blue(),
            };
            report.push_str(&format!(
                "  {} {} {}\n",
                label,
                extract_url_path(url),
                reason.dimmed()
            ));
        }
        report.push('\n');
    }

    report
}

pub fn generate_markdown_report(reports: &[CrawlReport]) -> String {
    let mut report = String::from("# Crawl Report\n\n");
    report.push_str(&format!(
        "_Generated {}_\n\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for (host, summary) in group_by_host(reports) {
        report.push_str(&format!("## {}\n\n", host));
        report.push_str("| Status | URL |\n|---|---|\n");
        for url in &summary.pages {
            report.push_str(&format!("| ok | {} |\n", url));
        }
        for (url, kind, _) in &summary.failures {
            let status = match kind {
                FailureKind::NotFound => "not found",
                FailureKind::RetriesExhausted => "failed",
                FailureKind::OffSite => "off-site",
            };
            report.push_str(&format!("| {} | {} |\n", status, url));
        }
        report.push('\n');
    }

    report
}

pub fn generate_json_report(reports: &[CrawlReport]) -> Result<String, serde_json::Error> {
    let crawls: Vec<serde_json::Value> = reports
        .iter()
        .map(|r| {
            serde_json::json!({
                "seed": r.seed,
                "max_depth": r.max_depth,
                "visited": r.visited,
                "cancelled": r.cancelled,
                "pages": r.urls(),
                "failures": r.failures,
            })
        })
        .collect();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "siteglean",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
            },
            "crawls": crawls,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn render_report(reports: &[CrawlReport], format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_crawl_report(reports)),
        ReportFormat::Markdown => Ok(generate_markdown_report(reports)),
        ReportFormat::Json => generate_json_report(reports),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
