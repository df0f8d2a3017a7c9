//! Report rendering
//!
//! Console output follows the score bands: red from 80, yellow from 50,
//! green below. The HTML report is a single self-contained page named
//! `report_<target>_<YYYY-MM-DD>.html`; every value taken from a scan is
//! escaped before it is written into the page.

use chrono::NaiveDate;
use colored::{ColoredString, Colorize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use orion_core::{InterestLevel, RuleStatus, ScoredAsset, HIGH_INTEREST_THRESHOLD};

use crate::{AnalysisReport, PipelineError};

const NO_INSIGHT: &str = "No AI analysis available.";

const STYLE: &str = r#"
body { font-family: 'Segoe UI', sans-serif; background: #1a1a1a; color: #eee; padding: 40px; }
.card { background: #2d2d2d; padding: 20px; border-radius: 8px; margin-bottom: 20px; border-left: 5px solid #007bff; }
.high-score { border-left: 5px solid #ff4757; }
h1, h2 { color: #007bff; }
.score { font-weight: bold; color: #ffa502; }
.tech { background: #444; padding: 2px 8px; border-radius: 4px; font-size: 0.9em; }
.ai-insight { font-style: italic; color: #7bed9f; margin-top: 10px; border-top: 1px solid #444; padding-top: 10px; }
.reasons { color: #aaa; font-size: 0.9em; }
.conflict { color: #ff6b81; }
.narrative { white-space: pre-line; line-height: 1.6; }
"#;

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// File name of the HTML report for a target and day
pub fn report_file_name(target: &str, date: NaiveDate) -> String {
    let safe_target: String = target
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("report_{}_{}.html", safe_target, date.format("%Y-%m-%d"))
}

fn colored_score(asset: &ScoredAsset) -> ColoredString {
    let score = format!("{:>5.1}", asset.score());
    match asset.interest_level() {
        InterestLevel::High => score.red(),
        InterestLevel::Elevated => score.yellow(),
        InterestLevel::Low => score.green(),
    }
}

/// One console line: `[score] domain | Tech: ...`
pub fn console_line(asset: &ScoredAsset) -> String {
    let technologies = &asset.asset().technologies;
    let tech = if technologies.is_empty() {
        "no tech detected".to_string()
    } else {
        technologies.join(", ")
    };
    format!("[{}] {:30} | Tech: {}", colored_score(asset), asset.domain(), tech)
}

/// Console report; verbose adds insight and reasons for high-interest assets
pub fn render_console(report: &AnalysisReport, verbose: bool) -> String {
    let mut out = String::new();
    let rule = "-".repeat(75);

    let _ = writeln!(out, "[*] Analyzing {} assets...", report.assets.len());
    let _ = writeln!(out, "{}", rule);

    for asset in &report.assets {
        let _ = writeln!(out, "{}", console_line(asset));

        if verbose && asset.score() >= HIGH_INTEREST_THRESHOLD {
            if let Some(insight) = asset.ai_insight() {
                let _ = writeln!(out, "   {}", format!("└── {}", insight).blue());
            }
            for reason in asset.reasons() {
                let _ = writeln!(out, "   └── {}", reason.dimmed());
            }
        }
    }

    if verbose {
        let _ = writeln!(out, "{}", rule);
        for hypothesis in report.intelligence.hypotheses() {
            let line = format!(
                "[{}] {}",
                hypothesis.category,
                hypothesis.interpretation.as_deref().unwrap_or("")
            );
            let line = match hypothesis.status {
                RuleStatus::Conflict => line.red(),
                _ => line.normal(),
            };
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{}", report.narrative());
    }

    out
}

fn render_asset_card(out: &mut String, asset: &ScoredAsset) {
    let card_class = if asset.is_high_interest() {
        "card high-score"
    } else {
        "card"
    };
    let tech: Vec<String> = asset
        .asset()
        .technologies
        .iter()
        .map(|t| format!(r#"<span class="tech">{}</span>"#, escape_html(t)))
        .collect();
    let status = asset
        .asset()
        .status_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let insight = asset.ai_insight().unwrap_or(NO_INSIGHT);

    let _ = writeln!(out, r#"<div class="{}">"#, card_class);
    let _ = writeln!(
        out,
        r#"<h3>{} <span class="score">[{:.1}]</span></h3>"#,
        escape_html(asset.domain()),
        asset.score()
    );
    let _ = writeln!(
        out,
        "<p><strong>Status:</strong> {} | <strong>Technologies:</strong> {}</p>",
        status,
        tech.join(" ")
    );
    if !asset.reasons().is_empty() {
        let _ = writeln!(out, r#"<ul class="reasons">"#);
        for reason in asset.reasons() {
            let _ = writeln!(out, "<li>{}</li>", escape_html(reason));
        }
        let _ = writeln!(out, "</ul>");
    }
    let _ = writeln!(
        out,
        r#"<div class="ai-insight"><strong>AI Strategy:</strong> {}</div>"#,
        escape_html(insight)
    );
    let _ = writeln!(out, "</div>");
}

/// Self-contained HTML page for a report
pub fn render_html(report: &AnalysisReport) -> String {
    let target = escape_html(&report.target);
    let mut out = String::new();

    let _ = writeln!(out, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>ORION Report - {}</title>", target);
    let _ = writeln!(out, "<style>{}</style>\n</head>\n<body>", STYLE);
    let _ = writeln!(out, "<h1>ORION Intelligence Report: {}</h1>", target);
    let _ = writeln!(
        out,
        "<p>Generated on: {} | Run: {}</p>\n<hr>",
        report.generated_at.format("%Y-%m-%d %H:%M"),
        report.run_id
    );

    let _ = writeln!(out, "<h2>Assets</h2>");
    for asset in &report.assets {
        render_asset_card(&mut out, asset);
    }

    let _ = writeln!(out, "<h2>Hypotheses</h2>\n<ul>");
    for hypothesis in report.intelligence.hypotheses() {
        let class = match hypothesis.status {
            RuleStatus::Conflict => r#" class="conflict""#,
            _ => "",
        };
        let _ = writeln!(
            out,
            "<li{}><strong>{}</strong> ({:?} confidence): {}</li>",
            class,
            escape_html(&hypothesis.rule_name),
            hypothesis.confidence,
            escape_html(hypothesis.interpretation.as_deref().unwrap_or(""))
        );
    }
    let _ = writeln!(out, "</ul>");

    let _ = writeln!(out, "<h2>Posture</h2>");
    let _ = writeln!(
        out,
        r#"<div class="card narrative">{}</div>"#,
        escape_html(&report.narrative())
    );

    let _ = writeln!(out, "</body>\n</html>");
    out
}

/// Write the HTML report into a directory, returning its path
pub async fn write_html_report(report: &AnalysisReport, dir: &Path) -> Result<PathBuf, PipelineError> {
    let path = dir.join(report_file_name(
        &report.target,
        report.generated_at.date_naive(),
    ));
    write_file(&path, render_html(report)).await?;
    info!("Report generated: {}", path.display());
    Ok(path)
}

/// Write the full report as pretty JSON
pub async fn write_json_report(report: &AnalysisReport, path: &Path) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(report)?;
    write_file(path, json).await?;
    info!("JSON report written: {}", path.display());
    Ok(())
}

async fn write_file(path: &Path, content: String) -> Result<(), PipelineError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|error| PipelineError::Write {
            path: path.display().to_string(),
            error,
        })
}
