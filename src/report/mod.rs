pub mod interactive;
pub mod types;

pub use interactive::InteractiveReporter;
pub use types::Finding;

use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize finding: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receives findings one at a time, in the order the engine produces them.
pub trait Reporter {
    fn report(&mut self, finding: &Finding) -> Result<(), ReportError>;

    /// Called once after the last finding.
    fn finish(&mut self) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Collects findings in memory.
impl Reporter for Vec<Finding> {
    fn report(&mut self, finding: &Finding) -> Result<(), ReportError> {
        self.push(finding.clone());
        Ok(())
    }
}

/// Human-readable colored output.
pub struct TerminalReporter<W: Write> {
    out: W,
    count: usize,
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, count: 0 }
    }
}

impl<W: Write> Reporter for TerminalReporter<W> {
    fn report(&mut self, finding: &Finding) -> Result<(), ReportError> {
        self.count += 1;
        writeln!(
            self.out,
            "  • {} ({})",
            finding.message,
            finding.location().as_str().cyan()
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        let summary = match self.count {
            0 => "No findings.".green().bold(),
            1 => "1 finding".yellow().bold(),
            n => format!("{} findings", n).as_str().yellow().bold(),
        };
        writeln!(self.out)?;
        writeln!(self.out, "═══ {} ═══", summary)?;
        self.out.flush()?;
        Ok(())
    }
}

/// A finding as written by `JsonReporter`, with its `file:line` up front.
#[derive(Serialize)]
struct JsonFinding<'a> {
    location: String,
    #[serde(flatten)]
    finding: &'a Finding,
}

/// One JSON object per line.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, finding: &Finding) -> Result<(), ReportError> {
        let record = JsonFinding {
            location: finding.location(),
            finding,
        };
        serde_json::to_writer(&mut self.out, &record)?;
        writeln!(self.out)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Buffers findings and writes a markdown report file on `finish`.
pub struct MarkdownReporter {
    path: PathBuf,
    findings: Vec<Finding>,
}

impl MarkdownReporter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            findings: Vec::new(),
        }
    }
}

impl Reporter for MarkdownReporter {
    fn report(&mut self, finding: &Finding) -> Result<(), ReportError> {
        self.findings.push(finding.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        debug!(path = %self.path.display(), findings = self.findings.len(), "writing markdown report");
        std::fs::write(&self.path, render_markdown(&self.findings))?;
        Ok(())
    }
}

fn render_markdown(findings: &[Finding]) -> String {
    let mut md = String::from("# Diff review\n\n");
    if findings.is_empty() {
        md.push_str("No findings.\n");
        return md;
    }

    let mut current_file: Option<&str> = None;
    for finding in findings {
        if current_file != Some(finding.file.as_str()) {
            if current_file.is_some() {
                md.push('\n');
            }
            md.push_str(&format!("## {}\n\n", finding.file));
            current_file = Some(finding.file.as_str());
        }
        md.push_str(&format!(
            "- **[{}]** {} (`{}`)\n",
            finding.rule,
            finding.message.replace('\n', " "),
            finding.location()
        ));
    }
    md.push_str(&format!("\n**{} findings**\n", findings.len()));
    md
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(file: &str, line: usize, rule: &str) -> Finding {
        Finding {
            file: file.to_string(),
            line,
            rule: rule.to_string(),
            message: format!("\"x\", {}?", rule),
        }
    }

    #[test]
    fn test_vec_reporter_collects() {
        let mut collected: Vec<Finding> = Vec::new();
        collected.report(&finding("Foo.m", 1, "comment")).unwrap();
        collected.finish().unwrap();
        assert_eq!(collected.len(), 1);
    }

    #[test]
    fn test_terminal_reporter_output() {
        let mut out = Vec::new();
        {
            let mut reporter = TerminalReporter::new(&mut out);
            reporter.report(&finding("Foo.m", 3, "comment")).unwrap();
            reporter.report(&finding("Foo.h", 9, "bool-getter")).unwrap();
            reporter.finish().unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"x\", comment?"));
        assert!(text.contains("Foo.h:9"));
        assert!(text.contains("2 findings"));
    }

    #[test]
    fn test_terminal_reporter_no_findings() {
        let mut out = Vec::new();
        TerminalReporter::new(&mut out).finish().unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No findings."));
    }

    #[test]
    fn test_json_reporter_one_object_per_line() {
        let mut out = Vec::new();
        {
            let mut reporter = JsonReporter::new(&mut out);
            reporter.report(&finding("Foo.m", 3, "comment")).unwrap();
            reporter.report(&finding("Foo.m", 7, "uicolor")).unwrap();
            reporter.finish().unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["location"], "Foo.m:3");
        assert_eq!(first["line"], 3);
        assert_eq!(first["rule"], "comment");
        assert_eq!(first["file"], "Foo.m");
        assert_eq!(first["message"], "\"x\", comment?");
        assert_eq!(
            lines[0],
            r#"{"location":"Foo.m:3","file":"Foo.m","line":3,"rule":"comment","message":"\"x\", comment?"}"#
        );
    }

    #[test]
    fn test_render_markdown_groups_by_file() {
        let md = render_markdown(&[
            finding("Foo.h", 1, "framework-import"),
            finding("Foo.m", 12, "empty-method"),
            finding("Foo.m", 20, "comment"),
        ]);
        assert!(md.starts_with("# Diff review"));
        assert_eq!(md.matches("## Foo.m").count(), 1);
        assert!(md.contains("- **[comment]** \"x\", comment? (`Foo.m:20`)"));
        assert!(md.contains("**3 findings**"));
    }

    #[test]
    fn test_render_markdown_empty() {
        assert!(render_markdown(&[]).contains("No findings."));
    }

    #[test]
    fn test_markdown_reporter_writes_file() {
        let path = std::env::temp_dir().join("hunk_lint_test_report.md");
        let mut reporter = MarkdownReporter::new(path.clone());
        reporter.report(&finding("Foo.m", 3, "comment")).unwrap();
        reporter.finish().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("## Foo.m"));
        assert!(content.contains("`Foo.m:3`"));
        std::fs::remove_file(&path).ok();
    }
}
