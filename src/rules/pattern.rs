use regex::Regex;

use super::{compile, is_default_extension, quote, BlockRule, LineRule, RuleError};
use crate::config::CustomRuleConfig;

/// Shared matching core: fire on `pattern` unless `unless` also matches.
#[derive(Debug, Clone)]
struct Matcher {
    id: String,
    pattern: Regex,
    unless: Option<Regex>,
    suffix: String,
    extensions: Option<Vec<String>>,
}

impl Matcher {
    fn new(id: &str, pattern: &str, suffix: &str) -> Result<Matcher, RuleError> {
        Ok(Matcher {
            id: id.to_string(),
            pattern: compile(id, pattern)?,
            unless: None,
            suffix: suffix.to_string(),
            extensions: None,
        })
    }

    fn from_config(config: &CustomRuleConfig) -> Result<Matcher, RuleError> {
        let mut matcher = Matcher::new(&config.id, &config.pattern, &config.message)?;
        if let Some(unless) = &config.unless {
            matcher.unless = Some(compile(&config.id, unless)?);
        }
        matcher.extensions = config.extensions.clone();
        Ok(matcher)
    }

    fn applies_to(&self, extension: &str) -> bool {
        match &self.extensions {
            Some(extensions) => extensions.iter().any(|e| e == extension),
            None => is_default_extension(extension),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text) && !self.unless.as_ref().is_some_and(|u| u.is_match(text))
    }
}

/// Line rule driven by a regex, optionally vetoed by a second regex.
#[derive(Debug, Clone)]
pub struct PatternLineRule(Matcher);

/// Block rule driven by a regex over the hunk's joined text.
#[derive(Debug, Clone)]
pub struct PatternBlockRule(Matcher);

impl PatternLineRule {
    pub fn new(id: &str, pattern: &str, suffix: &str) -> Result<PatternLineRule, RuleError> {
        Matcher::new(id, pattern, suffix).map(PatternLineRule)
    }

    /// Suppress the rule on lines that also match `pattern`.
    pub fn unless(mut self, pattern: &str) -> Result<PatternLineRule, RuleError> {
        self.0.unless = Some(compile(&self.0.id, pattern)?);
        Ok(self)
    }

    pub fn from_config(config: &CustomRuleConfig) -> Result<PatternLineRule, RuleError> {
        Matcher::from_config(config).map(PatternLineRule)
    }
}

impl PatternBlockRule {
    pub fn new(id: &str, pattern: &str, suffix: &str) -> Result<PatternBlockRule, RuleError> {
        Matcher::new(id, pattern, suffix).map(PatternBlockRule)
    }

    pub fn from_config(config: &CustomRuleConfig) -> Result<PatternBlockRule, RuleError> {
        Matcher::from_config(config).map(PatternBlockRule)
    }
}

impl LineRule for PatternLineRule {
    fn id(&self) -> &str {
        &self.0.id
    }

    fn applies_to(&self, extension: &str) -> bool {
        self.0.applies_to(extension)
    }

    fn matches(&self, line: &str) -> bool {
        self.0.matches(line)
    }

    fn describe(&self, line: &str) -> String {
        quote(line, &self.0.suffix)
    }
}

impl BlockRule for PatternBlockRule {
    fn id(&self) -> &str {
        &self.0.id
    }

    fn applies_to(&self, extension: &str) -> bool {
        self.0.applies_to(extension)
    }

    fn matches(&self, block: &str) -> bool {
        self.0.matches(block)
    }

    fn describe(&self, block: &str) -> String {
        quote(block, &self.0.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleScope;

    #[test]
    fn test_pattern_line_rule() {
        let rule = PatternLineRule::new("first-object", r"\[0\]", "firstObject?").unwrap();
        assert!(rule.matches("    id first = items[0];\n"));
        assert!(!rule.matches("    id first = items.firstObject;\n"));
        assert_eq!(
            rule.describe("    id first = items[0];\n"),
            "\"id first = items[0];\", firstObject?"
        );
    }

    #[test]
    fn test_unless_vetoes_match() {
        let rule = PatternLineRule::new("uicolor", "UIColor", "colour?")
            .unwrap()
            .unless("clearColor")
            .unwrap();
        assert!(rule.matches("[UIColor redColor]"));
        assert!(!rule.matches("[UIColor clearColor]"));
    }

    #[test]
    fn test_line_start_anchor() {
        let rule = PatternLineRule::new("comment", "^//", "comment?").unwrap();
        assert!(rule.matches("// note\n"));
        assert!(!rule.matches("    // note\n"));
    }

    #[test]
    fn test_custom_rule_extensions() {
        let config = CustomRuleConfig {
            id: "swift-print".to_string(),
            pattern: r"print\(".to_string(),
            unless: None,
            message: "leftover print?".to_string(),
            scope: RuleScope::Line,
            extensions: Some(vec!["swift".to_string()]),
        };
        let rule = PatternLineRule::from_config(&config).unwrap();
        assert!(rule.applies_to("swift"));
        assert!(!rule.applies_to("m"));
        assert_eq!(rule.describe("print(x)\n"), "\"print(x)\", leftover print?");
    }

    #[test]
    fn test_custom_rule_defaults_to_header_and_source_files() {
        let config = CustomRuleConfig {
            id: "nslog".to_string(),
            pattern: r"NSLog\(".to_string(),
            unless: Some("DEBUG".to_string()),
            message: "NSLog?".to_string(),
            scope: RuleScope::Block,
            extensions: None,
        };
        let rule = PatternBlockRule::from_config(&config).unwrap();
        assert!(rule.applies_to("m"));
        assert!(!rule.applies_to("swift"));
        assert!(rule.matches("a\nNSLog(@\"x\");\n"));
        assert!(!rule.matches("// DEBUG\nNSLog(@\"x\");\n"));
    }

    #[test]
    fn test_invalid_unless_pattern() {
        let config = CustomRuleConfig {
            id: "bad".to_string(),
            pattern: "ok".to_string(),
            unless: Some("[".to_string()),
            message: "x".to_string(),
            scope: RuleScope::Line,
            extensions: None,
        };
        assert!(PatternLineRule::from_config(&config).is_err());
    }
}
