use tracing::{debug, info, instrument};

use crate::diff::{FileDiff, Hunk};
use crate::report::{Finding, ReportError, Reporter};
use crate::rules::{BlockRule, LineRule, Rule};

/// Runs a fixed set of rules over parsed files.
///
/// Findings come out file by file and hunk by hunk in diff order. Within a
/// hunk, block rules fire before line rules; rules keep their registration
/// order and each line rule walks the added lines top to bottom. Every
/// matching (rule, line) pair produces its own finding.
pub struct RuleEngine {
    block_rules: Vec<Box<dyn BlockRule>>,
    line_rules: Vec<Box<dyn LineRule>>,
}

impl RuleEngine {
    /// Split the rules by scope, keeping relative order within each scope.
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut block_rules = Vec::new();
        let mut line_rules = Vec::new();
        for rule in rules {
            match rule {
                Rule::Block(rule) => block_rules.push(rule),
                Rule::Line(rule) => line_rules.push(rule),
            }
        }
        Self {
            block_rules,
            line_rules,
        }
    }

    pub fn block_rule_count(&self) -> usize {
        self.block_rules.len()
    }

    pub fn line_rule_count(&self) -> usize {
        self.line_rules.len()
    }

    /// Hand every finding to `reporter` as soon as it is found, then call
    /// `finish`. Returns the number of findings.
    #[instrument(skip_all, fields(files = files.len()))]
    pub fn run(&self, files: &[FileDiff], reporter: &mut dyn Reporter) -> Result<usize, ReportError> {
        debug!(
            block_rules = self.block_rule_count(),
            line_rules = self.line_rule_count(),
            "starting scan"
        );
        let count = self.scan(files, |finding| reporter.report(&finding))?;
        reporter.finish()?;
        info!(findings = count, "scan complete");
        Ok(count)
    }

    /// All findings, in reporting order.
    #[cfg(test)]
    pub fn findings(&self, files: &[FileDiff]) -> Vec<Finding> {
        let mut findings = Vec::new();
        self.scan(files, |finding| {
            findings.push(finding);
            Ok::<(), std::convert::Infallible>(())
        })
        .unwrap_or_else(|never| match never {});
        findings
    }

    /// Walk the files and pass each finding to `emit`, stopping at the first
    /// error it returns.
    pub fn scan<E>(
        &self,
        files: &[FileDiff],
        mut emit: impl FnMut(Finding) -> Result<(), E>,
    ) -> Result<usize, E> {
        let mut count = 0;
        for file in files {
            let extension = file.extension();
            let block_rules: Vec<&dyn BlockRule> = self
                .block_rules
                .iter()
                .map(|rule| &**rule)
                .filter(|rule| rule.applies_to(extension))
                .collect();
            let line_rules: Vec<&dyn LineRule> = self
                .line_rules
                .iter()
                .map(|rule| &**rule)
                .filter(|rule| rule.applies_to(extension))
                .collect();
            debug!(
                file = %file.name(),
                extension = %extension,
                hunks = file.hunks().len(),
                block_rules = block_rules.len(),
                line_rules = line_rules.len(),
                "scanning file"
            );
            if block_rules.is_empty() && line_rules.is_empty() {
                continue;
            }

            for hunk in file.hunks() {
                debug!(
                    start = hunk.starting_line_number(),
                    raw_lines = hunk.raw_lines().len(),
                    added_lines = hunk.added_lines().len(),
                    "scanning hunk"
                );
                for finding in scan_hunk(file.name(), hunk, &block_rules, &line_rules) {
                    count += 1;
                    emit(finding)?;
                }
            }
        }
        Ok(count)
    }
}

fn scan_hunk(
    file: &str,
    hunk: &Hunk,
    block_rules: &[&dyn BlockRule],
    line_rules: &[&dyn LineRule],
) -> Vec<Finding> {
    let mut findings = Vec::new();

    if !block_rules.is_empty() {
        let block = hunk.block_text();
        for rule in block_rules {
            if rule.matches(&block) {
                findings.push(Finding {
                    file: file.to_string(),
                    line: hunk.starting_line_number(),
                    rule: rule.id().to_string(),
                    message: rule.describe(&block),
                });
            }
        }
    }

    for rule in line_rules {
        for (i, line) in hunk.added_lines().iter().enumerate() {
            if rule.matches(line) {
                findings.push(Finding {
                    file: file.to_string(),
                    line: hunk.line_number(i),
                    rule: rule.id().to_string(),
                    message: rule.describe(line),
                });
            }
        }
    }

    findings
}
