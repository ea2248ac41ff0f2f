//! Built-in rules that need to see a whole hunk at once.

use regex::Regex;

use super::pattern::PatternBlockRule;
use super::{compile, quote, BlockRule, RuleError};

pub fn empty_method() -> Result<PatternBlockRule, RuleError> {
    PatternBlockRule::new("empty-method", r"\{\s*\}", "empty method?")
}

/// Two or more consecutive blank lines. Lines holding only spaces or tabs
/// count as blank.
#[derive(Debug, Clone)]
pub struct MultilineWhitespaceRule {
    trailing: Regex,
    blank_run: Regex,
}

impl MultilineWhitespaceRule {
    pub fn new() -> Result<MultilineWhitespaceRule, RuleError> {
        Ok(MultilineWhitespaceRule {
            trailing: compile("multiline-whitespace", r"[ \t]*\n")?,
            blank_run: compile("multiline-whitespace", r"^\n\n+")?,
        })
    }
}

impl BlockRule for MultilineWhitespaceRule {
    fn id(&self) -> &str {
        "multiline-whitespace"
    }

    fn matches(&self, block: &str) -> bool {
        let normalized = self.trailing.replace_all(block, "\n");
        self.blank_run.is_match(&normalized)
    }

    fn describe(&self, block: &str) -> String {
        quote(block, "unneeded whitespace?")
    }
}

/// Within each blank-line-delimited code block where every line assigns
/// something, the `=` signs must share a column.
#[derive(Debug, Clone)]
pub struct EqualsAlignmentRule {
    separator: Regex,
}

impl EqualsAlignmentRule {
    pub fn new() -> Result<EqualsAlignmentRule, RuleError> {
        Ok(EqualsAlignmentRule {
            separator: compile("equals-alignment", r"\n\s*\n")?,
        })
    }

    /// First code block whose `=` signs are not aligned.
    pub fn misaligned_block<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.separator
            .split(text)
            .filter(|block| !block.trim().is_empty())
            .find(|block| {
                let lines: Vec<&str> = block.lines().collect();
                if !lines.iter().all(|line| line.contains('=')) {
                    return false;
                }
                let column = |line: &str| line.chars().position(|c| c == '=');
                let first = column(lines[0]);
                lines.iter().any(|&line| column(line) != first)
            })
    }
}

impl BlockRule for EqualsAlignmentRule {
    fn id(&self) -> &str {
        "equals-alignment"
    }

    fn matches(&self, block: &str) -> bool {
        self.misaligned_block(block).is_some()
    }

    fn describe(&self, block: &str) -> String {
        quote(self.misaligned_block(block).unwrap_or(block), "alignment?")
    }
}
