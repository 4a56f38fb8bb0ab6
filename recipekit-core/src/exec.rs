use crate::env::command_env;
use crate::ports::{CommandOutput, CommandRunner};
use camino::{Utf8Path, Utf8PathBuf};
use recipekit_types::plan::CommandLine;
use recipekit_types::report::CommandRecord;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

/// Lines of command output kept in error messages and command records.
const OUTPUT_TAIL_LINES: usize = 40;

/// Runs planned commands relative to the source directory with the build
/// environment applied.
pub(crate) struct Executor<'a> {
    pub runner: &'a dyn CommandRunner,
    pub source_dir: &'a Utf8Path,
    pub overrides: BTreeMap<String, String>,
}

impl Executor<'_> {
    pub fn path(&self, rel: &str) -> Utf8PathBuf {
        self.source_dir.join(rel)
    }

    /// `Err` only when the command could not be started; the record is
    /// returned in both cases.
    pub fn run(
        &self,
        command: &CommandLine,
    ) -> (CommandRecord, anyhow::Result<CommandOutput>) {
        let cwd = match &command.cwd {
            Some(dir) => self.source_dir.join(dir),
            None => self.source_dir.to_path_buf(),
        };
        let env = command_env(&self.overrides, &command.env);
        let shown = command.display();

        info!(command = %shown, cwd = %cwd, "running");
        let started = Instant::now();
        let result = self.runner.run(command, &cwd, &env);
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let record = match &result {
            Ok(out) => {
                debug!(command = %shown, exit_code = ?out.exit_code, duration_ms, "finished");
                CommandRecord {
                    command: shown,
                    exit_code: out.exit_code,
                    duration_ms: Some(duration_ms),
                    output: Some(output_tail(&out.output)).filter(|t| !t.is_empty()),
                }
            }
            Err(_) => not_run(shown),
        };
        (record, result)
    }
}

pub(crate) fn not_run(command: String) -> CommandRecord {
    CommandRecord {
        command,
        exit_code: None,
        duration_ms: None,
        output: None,
    }
}

pub(crate) fn output_tail(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines[start..].join("\n")
}
