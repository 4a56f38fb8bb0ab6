//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use recipekit_types::plan::CommandLine;
use recipekit_types::spec::SpecInput;
use std::collections::BTreeMap;

/// Source of the resolver's concrete spec.
pub trait SpecSource {
    fn load_spec(&self) -> anyhow::Result<SpecInput>;
}

/// Captured result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// stdout and stderr as one stream, in write order.
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external commands.
///
/// `cwd` is absolute. `env` holds only the variables to set on top of the
/// inherited environment. An `Err` means the command could not be started.
pub trait CommandRunner {
    fn run(
        &self,
        command: &CommandLine,
        cwd: &Utf8Path,
        env: &BTreeMap<String, String>,
    ) -> anyhow::Result<CommandOutput>;
}

/// Read access for status and log files produced by builds and jobs.
pub trait FileReader {
    /// `Ok(None)` when the file does not exist.
    fn read_optional(&self, path: &Utf8Path) -> anyhow::Result<Option<String>>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
