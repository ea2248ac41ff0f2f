mod config;
mod diff;
mod engine;
mod report;
mod rules;
mod source;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info, info_span, Instrument, Span};
use tracing_subscriber::EnvFilter;

use config::Config;
use engine::RuleEngine;
use report::interactive::EditorLauncher;
use report::{InteractiveReporter, JsonReporter, MarkdownReporter, Reporter, TerminalReporter};
use source::{DiffSource, FileSource, GitDiffSource, GitHubPrSource, StaticSource};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// hunk-lint: lints the added lines of a unified diff and reports each
/// finding at its post-change file:line.
#[derive(Parser, Debug)]
#[command(name = "hunk-lint", version, about)]
struct Cli {
    /// GitHub Pull Request URL to review instead of local changes
    /// (e.g., https://github.com/org/repo/pull/42)
    pr_url: Option<String>,

    /// Read the diff from a file instead of running git ("-" for stdin)
    #[arg(long, conflicts_with = "pr_url")]
    diff_file: Option<PathBuf>,

    /// Lines of context requested from `git diff` (overrides config)
    #[arg(short = 'U', long)]
    context: Option<u32>,

    /// Config file (defaults to .hunk-lint.toml in the current directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format for findings
    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    format: OutputFormat,

    /// Write a markdown report to this path instead of printing findings
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ask about each finding and open the editor on accepted ones
    #[arg(short, long, conflicts_with = "output")]
    interactive: bool,

    /// Use a built-in sample diff for demo purposes (no git repository needed)
    #[arg(long)]
    r#mock: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Terminal,
    Json,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let source = select_source(&cli, &config)?;
    let span = info_span!("review", source = %source.describe());
    let output = ReporterChoice::from_cli(&cli, &config);

    run(source.as_ref(), &config, output).instrument(span).await
}

/// Fetch the diff, build the rules and review on a blocking thread.
async fn run(source: &dyn DiffSource, config: &Config, output: ReporterChoice) -> Result<(), BoxError> {
    info!("fetching diff");
    let raw_diff = source.fetch().await?;
    debug!(diff_bytes = raw_diff.len(), "fetched diff");

    let rules = rules::registry(&config.rules)?;
    info!(rules = rules.len(), "running rules");

    let span = Span::current();
    let count =
        tokio::task::spawn_blocking(move || span.in_scope(|| review(&raw_diff, rules, output))).await??;
    info!(findings = count, "done");

    Ok(())
}

/// Pick where the diff comes from: the built-in sample, a file, a pull
/// request, or the local working tree, in that order of precedence.
fn select_source(cli: &Cli, config: &Config) -> Result<Box<dyn DiffSource>, BoxError> {
    if cli.r#mock {
        info!("using built-in sample diff");
        let sample = include_str!("../tests/fixtures/sample_diff.patch");
        return Ok(Box::new(StaticSource::new("sample diff", sample)));
    }

    if let Some(path) = &cli.diff_file {
        return Ok(Box::new(FileSource::new(path.clone())));
    }

    if let Some(url) = &cli.pr_url {
        let pr_url = source::parse_pr_url(url)?;
        debug!(owner = %pr_url.owner, repo = %pr_url.repo, pr = pr_url.pr_number, "parsed PR URL");
        return Ok(Box::new(GitHubPrSource::new(pr_url, config.github_token())));
    }

    let context_lines = cli.context.unwrap_or(config.diff.context_lines);
    Ok(Box::new(GitDiffSource::new(context_lines, config.diff.args.clone())))
}

/// Where findings go, decided up front so the reporter itself can be built
/// on the blocking thread that runs the engine.
#[derive(Debug, Clone)]
enum ReporterChoice {
    Terminal,
    Json,
    Markdown(PathBuf),
    Interactive(Vec<String>),
}

impl ReporterChoice {
    fn from_cli(cli: &Cli, config: &Config) -> Self {
        if cli.interactive {
            return ReporterChoice::Interactive(config.editor.command.clone());
        }
        if let Some(path) = &cli.output {
            return ReporterChoice::Markdown(path.clone());
        }
        match cli.format {
            OutputFormat::Terminal => ReporterChoice::Terminal,
            OutputFormat::Json => ReporterChoice::Json,
        }
    }

    fn build(self) -> Box<dyn Reporter> {
        match self {
            ReporterChoice::Terminal => Box::new(TerminalReporter::new(std::io::stdout())),
            ReporterChoice::Json => Box::new(JsonReporter::new(std::io::stdout())),
            ReporterChoice::Markdown(path) => Box::new(MarkdownReporter::new(path)),
            ReporterChoice::Interactive(command) => Box::new(InteractiveReporter::new(
                std::io::stdin().lock(),
                std::io::stdout(),
                EditorLauncher::new(command),
            )),
        }
    }
}

/// Parse the diff, run the rules and stream findings to the chosen reporter.
fn review(raw_diff: &str, rules: Vec<rules::Rule>, output: ReporterChoice) -> Result<usize, BoxError> {
    let files = diff::parse_diff(raw_diff)?;
    info!(files = files.len(), "parsed diff");

    let engine = RuleEngine::new(rules);
    let mut reporter = output.build();
    let count = engine.run(&files, reporter.as_mut())?;
    Ok(count)
}
