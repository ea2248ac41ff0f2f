use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::rules::line::DEFAULT_MAX_LINE_LENGTH;

/// Config file looked up in the current directory.
pub const CONFIG_FILE: &str = ".hunk-lint.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .hunk-lint.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// How the diff is produced when read from git
    #[serde(default)]
    pub diff: DiffConfig,

    /// Rule selection and custom rules
    #[serde(default)]
    pub rules: RulesConfig,

    /// GitHub-specific settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// What to run when a finding is accepted in interactive mode
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiffConfig {
    /// Lines of context requested from `git diff -U<n>`. Line numbers are
    /// computed per hunk, so a generous window keeps them exact.
    #[serde(default = "default_context_lines")]
    pub context_lines: u32,

    /// Extra arguments passed to `git diff` (e.g. ["--cached"])
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            args: Vec::new(),
        }
    }
}

fn default_context_lines() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Threshold for the line-length rule
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,

    /// Ids of built-in rules to skip
    #[serde(default)]
    pub disable: Vec<String>,

    /// Additional regex rules, run after the built-ins in file order
    #[serde(default)]
    pub custom: Vec<CustomRuleConfig>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_line_length: default_max_line_length(),
            disable: Vec::new(),
            custom: Vec::new(),
        }
    }
}

fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}

/// A `[[rules.custom]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomRuleConfig {
    pub id: String,
    /// Regex that triggers the rule
    pub pattern: String,
    /// Regex that suppresses the rule when it also matches
    #[serde(default)]
    pub unless: Option<String>,
    /// Text appended to the quoted line or block
    pub message: String,
    #[serde(default)]
    pub scope: RuleScope,
    /// Extensions the rule applies to; defaults to headers and implementation files
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    #[default]
    Line,
    Block,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorConfig {
    /// Program and arguments; `{location}` is replaced by `file:line`
    #[serde(default)]
    pub command: Vec<String>,
}

impl Config {
    /// Load configuration from .hunk-lint.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.diff.context_lines, 10);
        assert!(config.diff.args.is_empty());
        assert_eq!(config.rules.max_line_length, 160);
        assert!(config.rules.disable.is_empty());
        assert!(config.rules.custom.is_empty());
        assert!(config.github.token.is_none());
        assert!(config.editor.command.is_empty());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.diff.context_lines, 10);
        assert_eq!(config.rules.max_line_length, 160);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[diff]
context_lines = 25
args = ["--cached"]

[rules]
max_line_length = 120
disable = ["comment"]

[[rules.custom]]
id = "no-nslog"
pattern = "NSLog\\("
message = "leftover NSLog?"

[[rules.custom]]
id = "todo-block"
pattern = "TODO"
unless = "TODO\\(#\\d+\\)"
message = "untracked TODO?"
scope = "block"
extensions = ["m", "mm"]

[editor]
command = ["code", "-g", "{location}"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.diff.context_lines, 25);
        assert_eq!(config.diff.args, vec!["--cached"]);
        assert_eq!(config.rules.max_line_length, 120);
        assert_eq!(config.rules.disable, vec!["comment"]);
        assert_eq!(config.rules.custom.len(), 2);
        assert_eq!(config.rules.custom[0].scope, RuleScope::Line);
        assert_eq!(config.rules.custom[0].pattern, "NSLog\\(");
        assert_eq!(config.rules.custom[1].scope, RuleScope::Block);
        assert_eq!(config.rules.custom[1].extensions.as_deref(), Some(&["m".to_string(), "mm".to_string()][..]));
        assert_eq!(config.editor.command.len(), 3);
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        let toml_str = r#"
[[rules.custom]]
id = "x"
pattern = "x"
message = "x"
scope = "file"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("hunk_lint_test_config.toml");
        std::fs::write(&path, "[rules]\nmax_line_length = 99\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.rules.max_line_length, 99);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("hunk_lint_missing_config.toml");
        assert!(matches!(Config::load_from(&path), Err(ConfigError::FileRead(_))));
    }
}
