use std::io::{BufRead, Write};
use std::process::Command;
use tracing::{debug, warn};

use super::{Finding, ReportError, Reporter};

/// Placeholder in the editor command replaced by `file:line`.
pub const LOCATION_PLACEHOLDER: &str = "{location}";

/// Asks the reviewer about each finding and opens the editor on the ones
/// they accept.
pub struct InteractiveReporter<R: BufRead, W: Write> {
    input: R,
    output: W,
    editor: EditorLauncher,
    accepted: usize,
}

impl<R: BufRead, W: Write> InteractiveReporter<R, W> {
    pub fn new(input: R, output: W, editor: EditorLauncher) -> Self {
        Self {
            input,
            output,
            editor,
            accepted: 0,
        }
    }

    #[cfg(test)]
    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

impl<R: BufRead, W: Write> Reporter for InteractiveReporter<R, W> {
    fn report(&mut self, finding: &Finding) -> Result<(), ReportError> {
        write!(self.output, "{} ", finding.message)?;
        self.output.flush()?;

        let mut answer = String::new();
        // EOF counts as "no"
        self.input.read_line(&mut answer)?;
        if !is_yes(&answer) {
            return Ok(());
        }

        self.accepted += 1;
        self.editor.open(&finding.location(), &mut self.output)
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        debug!(accepted = self.accepted, "interactive review finished");
        self.output.flush()?;
        Ok(())
    }
}

fn is_yes(answer: &str) -> bool {
    answer.contains(['y', 'Y'])
}

/// Runs the configured editor command for an accepted finding.
#[derive(Debug, Clone, Default)]
pub struct EditorLauncher {
    command: Vec<String>,
}

impl EditorLauncher {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Program and arguments with the placeholder filled in.
    pub fn expand(&self, location: &str) -> Vec<String> {
        self.command
            .iter()
            .map(|arg| arg.replace(LOCATION_PLACEHOLDER, location))
            .collect()
    }

    /// Open `location`. Without a configured command the location is printed
    /// so it can be pasted into an editor's "open quickly" prompt.
    pub fn open<W: Write>(&self, location: &str, output: &mut W) -> Result<(), ReportError> {
        let argv = self.expand(location);
        let Some((program, args)) = argv.split_first() else {
            writeln!(output, "{}", location)?;
            return Ok(());
        };

        debug!(program = %program, location = %location, "launching editor");
        match Command::new(program).args(args).status() {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(program = %program, %status, "editor exited with failure"),
            Err(e) => warn!(program = %program, error = %e, "failed to launch editor"),
        }
        Ok(())
    }
}
