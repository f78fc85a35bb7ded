// Report generation for a single QA pass

use crate::review::ReviewOutcome;
use colored::{ColoredString, Colorize};
use mailqa_scanner::LinkRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

pub const NO_SUBJECT: &str = "N/A";
pub const NO_TOKENS: &str = "None";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}' (expected text or json)", other)),
        }
    }
}

/// Everything one pass found about one email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaReport {
    pub source: String,
    pub subject: Option<String>,
    pub links: Vec<LinkRecord>,
    pub tokens: Vec<String>,
    pub review: ReviewOutcome,
    pub generated_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSummary {
    pub total: usize,
    pub ok: usize,
    pub broken: usize,
    pub missing_utm: usize,
}

impl QaReport {
    pub fn subject_line(&self) -> &str {
        self.subject.as_deref().unwrap_or(NO_SUBJECT)
    }

    pub fn link_summary(&self) -> LinkSummary {
        let broken = self.links.iter().filter(|l| l.status.is_broken()).count();
        LinkSummary {
            total: self.links.len(),
            ok: self.links.len() - broken,
            broken,
            missing_utm: self.links.iter().filter(|l| l.status.missing_utm).count(),
        }
    }

    pub fn has_problems(&self) -> bool {
        let summary = self.link_summary();
        summary.broken > 0 || summary.missing_utm > 0
    }
}

/// Color a status label: red if broken, orange-ish if untagged, green otherwise.
pub fn color_status(label: &str) -> ColoredString {
    if label.contains("Broken") {
        label.red().bold()
    } else if label.contains("Missing UTM") {
        label.yellow()
    } else {
        label.green()
    }
}

fn section(report: &mut String, title: &str) {
    report.push_str(RULE);
    report.push_str(title);
    report.push('\n');
    report.push_str(RULE);
    report.push('\n');
}

pub fn generate_text_report(data: &QaReport, color: bool) -> String {
    let mut report = String::new();

    // Header
    report.push_str(RULE);
    report.push_str("                          MAILQA EMAIL QA REPORT\n");
    report.push_str(RULE);
    report.push('\n');
    report.push_str(&format!("Source:       {}\n", data.source));
    report.push_str(&format!("Generated:    {}\n\n", data.generated_at));

    section(&mut report, "SUBJECT LINE");
    report.push_str(&format!("  {}\n\n", data.subject_line()));

    section(&mut report, "LINKS TABLE");
    let summary = data.link_summary();
    report.push_str(&format!(
        "Links: {}   OK: {}   Broken: {}   Missing UTM: {}\n\n",
        summary.total, summary.ok, summary.broken, summary.missing_utm
    ));

    if data.links.is_empty() {
        report.push_str("  (no links found)\n");
    }

    let width = data
        .links
        .iter()
        .map(|l| l.status.to_string().len())
        .max()
        .unwrap_or(0);

    for (idx, record) in data.links.iter().enumerate() {
        let label = format!("{:<width$}", record.status.to_string(), width = width);
        let label = if color {
            color_status(&label).to_string()
        } else {
            label
        };
        let link = if record.link.is_empty() {
            "(empty href)"
        } else {
            record.link.as_str()
        };
        report.push_str(&format!("  [{:>2}] {}  {}\n", idx + 1, label, link));

        if record.was_unwrapped() {
            report.push_str(&format!("       ↪ {}\n", record.normalized));
        }
        if let Some(reason) = record.probe.reason() {
            report.push_str(&format!("       ({})\n", reason));
        }
    }
    report.push('\n');

    section(&mut report, "PERSONALIZATION TOKENS");
    if data.tokens.is_empty() {
        report.push_str(&format!("  {}\n", NO_TOKENS));
    } else {
        for token in &data.tokens {
            report.push_str(&format!("  {}\n", token));
        }
    }
    report.push('\n');

    section(&mut report, "AI CONTENT REVIEW");
    match &data.review {
        ReviewOutcome::Completed(text) => report.push_str(&wrap_text(text, 80, "  ")),
        ReviewOutcome::Disabled(reason) => {
            let line = format!("  Review skipped: {}", reason);
            if color {
                report.push_str(&line.yellow().to_string());
            } else {
                report.push_str(&line);
            }
            report.push('\n');
        }
        ReviewOutcome::Failed(error) => {
            let line = format!("  AI review failed: {}", error);
            if color {
                report.push_str(&line.red().to_string());
            } else {
                report.push_str(&line);
            }
            report.push('\n');
        }
    }
    report.push('\n');

    report.push_str(RULE);
    report.push_str("                              End of Report\n");
    report.push_str(RULE);

    report
}

pub fn generate_json_report(data: &QaReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "mailqa",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": data.generated_at,
                "format": "json"
            },
            "source": data.source,
            "subject": data.subject,
            "summary": data.link_summary(),
            "links": data.links,
            "tokens": data.tokens,
            "review": data.review
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Word-wrap each paragraph of `text`, keeping blank lines between them.
fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            result.push('\n');
            continue;
        }

        let mut current_line = String::new();
        for word in paragraph.split_whitespace() {
            if current_line.len() + word.len() + 1 > width - indent.len() && !current_line.is_empty()
            {
                result.push_str(indent);
                result.push_str(&current_line);
                result.push('\n');
                current_line.clear();
            }

            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        }

        if !current_line.is_empty() {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
        }
    }

    result
}
