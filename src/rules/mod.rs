pub mod block;
pub mod line;
pub mod pattern;

use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{RuleScope, RulesConfig};
use pattern::{PatternBlockRule, PatternLineRule};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid pattern for rule {id}: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },
}

/// Extensions the built-in rules look at unless they say otherwise.
pub const DEFAULT_EXTENSIONS: &[&str] = &["h", "m"];

/// Rule evaluated once per added line of a hunk.
///
/// Context lines reach the rule too, unmarked, so a rule cannot tell them
/// apart from real additions.
pub trait LineRule: Send + Sync {
    /// Stable identifier used by `[rules].disable` and in reports.
    fn id(&self) -> &str;

    fn applies_to(&self, extension: &str) -> bool {
        is_default_extension(extension)
    }

    fn matches(&self, line: &str) -> bool;

    /// Message shown for a line that `matches`.
    fn describe(&self, line: &str) -> String;
}

/// Rule evaluated once per hunk against the concatenated added lines.
pub trait BlockRule: Send + Sync {
    fn id(&self) -> &str;

    fn applies_to(&self, extension: &str) -> bool {
        is_default_extension(extension)
    }

    fn matches(&self, block: &str) -> bool;

    fn describe(&self, block: &str) -> String;
}

/// A registered rule, tagged with the scope it runs at.
pub enum Rule {
    Line(Box<dyn LineRule>),
    Block(Box<dyn BlockRule>),
}

impl Rule {
    pub fn line(rule: impl LineRule + 'static) -> Rule {
        Rule::Line(Box::new(rule))
    }

    pub fn block(rule: impl BlockRule + 'static) -> Rule {
        Rule::Block(Box::new(rule))
    }

    pub fn id(&self) -> &str {
        match self {
            Rule::Line(rule) => rule.id(),
            Rule::Block(rule) => rule.id(),
        }
    }

    pub fn is_block_scoped(&self) -> bool {
        matches!(self, Rule::Block(_))
    }

    #[cfg(test)]
    pub fn applies_to(&self, extension: &str) -> bool {
        match self {
            Rule::Line(rule) => rule.applies_to(extension),
            Rule::Block(rule) => rule.applies_to(extension),
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = if self.is_block_scoped() { "Block" } else { "Line" };
        write!(f, "{}({})", scope, self.id())
    }
}

pub fn is_default_extension(extension: &str) -> bool {
    DEFAULT_EXTENSIONS.contains(&extension)
}

/// Build the rule set for a run: the enabled built-ins in their fixed order,
/// then the custom rules from config.
///
/// A custom rule whose pattern does not compile is skipped with a warning so
/// the remaining rules still run.
pub fn registry(config: &RulesConfig) -> Result<Vec<Rule>, RuleError> {
    let mut rules: Vec<Rule> = builtin(config)?
        .into_iter()
        .filter(|rule| !config.disable.iter().any(|id| id == rule.id()))
        .collect();

    for custom in &config.custom {
        let built = match custom.scope {
            RuleScope::Line => PatternLineRule::from_config(custom).map(Rule::line),
            RuleScope::Block => PatternBlockRule::from_config(custom).map(Rule::block),
        };
        match built {
            Ok(rule) => rules.push(rule),
            Err(e) => warn!(rule = %custom.id, error = %e, "skipping custom rule"),
        }
    }

    debug!(rules = rules.len(), "rule registry built");
    Ok(rules)
}

/// The built-in rules in registration order.
pub fn builtin(config: &RulesConfig) -> Result<Vec<Rule>, RuleError> {
    Ok(vec![
        Rule::line(line::bool_getter()?),
        Rule::line(line::comment()?),
        Rule::line(line::constant_first()?),
        Rule::line(line::dot_notation()?),
        Rule::line(line::inferred_block_return()?),
        Rule::line(line::LineLengthRule::new(config.max_line_length)),
        Rule::line(line::first_object()?),
        Rule::line(line::weak_self_block()?),
        Rule::block(block::MultilineWhitespaceRule::new()?),
        Rule::line(line::uicolor()?),
        Rule::block(block::empty_method()?),
        Rule::line(line::framework_import()?),
        Rule::line(line::ExtraSpaceRule::new()?),
        Rule::line(line::space_before_semicolon()?),
        Rule::line(line::CopyPropertyRule::new()?),
        Rule::block(block::EqualsAlignmentRule::new()?),
    ])
}

/// Compile a rule pattern. `^` and `$` match at line boundaries so block
/// patterns can anchor on individual lines.
pub(crate) fn compile(id: &str, pattern: &str) -> Result<Regex, RuleError> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(|source| RuleError::InvalidPattern {
            id: id.to_string(),
            source,
        })
}

/// `"<subject>", <suffix>` with the subject's indentation and trailing line
/// terminator removed.
pub fn quote(subject: &str, suffix: &str) -> String {
    format!("\"{}\", {}", chomp(subject.trim_start()), suffix)
}

fn chomp(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .or_else(|| text.strip_suffix('\r'))
        .unwrap_or(text)
}
