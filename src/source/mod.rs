pub mod github;

pub use github::{parse_pr_url, GitHubPrSource};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git diff exited with {status}: {stderr}")]
    Git { status: String, stderr: String },

    #[error("Failed to read diff: {0}")]
    Read(#[from] std::io::Error),

    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Invalid PR URL: {0}")]
    InvalidUrl(String),

    #[error("GitHub token not found in config or environment")]
    MissingToken,
}

/// Produces the raw unified diff to review.
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Short description for logs (e.g. "git diff -U10").
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<String, SourceError>;
}

/// Working-tree changes from `git diff -U<n>`.
#[derive(Debug, Clone)]
pub struct GitDiffSource {
    context_lines: u32,
    args: Vec<String>,
}

impl GitDiffSource {
    pub fn new(context_lines: u32, args: Vec<String>) -> Self {
        Self {
            context_lines,
            args,
        }
    }

    /// Arguments passed to git, in order.
    pub fn git_args(&self) -> Vec<String> {
        let mut args = vec!["diff".to_string(), format!("-U{}", self.context_lines)];
        args.extend(self.args.iter().cloned());
        args
    }
}

#[async_trait]
impl DiffSource for GitDiffSource {
    fn describe(&self) -> String {
        format!("git {}", self.git_args().join(" "))
    }

    #[instrument(skip(self), fields(context_lines = self.context_lines))]
    async fn fetch(&self) -> Result<String, SourceError> {
        let output = Command::new("git")
            .args(self.git_args())
            .output()
            .await
            .map_err(SourceError::Spawn)?;

        if !output.status.success() {
            return Err(SourceError::Git {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(diff_bytes = output.stdout.len(), "received git diff");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// A patch file, or stdin when the path is `-`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }
}

#[async_trait]
impl DiffSource for FileSource {
    fn describe(&self) -> String {
        if self.is_stdin() {
            "stdin".to_string()
        } else {
            self.path.display().to_string()
        }
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<String, SourceError> {
        let mut bytes = Vec::new();
        if self.is_stdin() {
            tokio::io::stdin().read_to_end(&mut bytes).await?;
        } else {
            bytes = tokio::fs::read(&self.path).await?;
        }
        debug!(diff_bytes = bytes.len(), "read diff");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// A fixed diff held in memory.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    diff: String,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, diff: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diff: diff.into(),
        }
    }
}

#[async_trait]
impl DiffSource for StaticSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    async fn fetch(&self) -> Result<String, SourceError> {
        Ok(self.diff.clone())
    }
}
