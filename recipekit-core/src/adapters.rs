//! Default process- and filesystem-backed port implementations.

use crate::ports::{CommandOutput, CommandRunner, FileReader, SpecSource, WritePort};
use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use recipekit_types::plan::CommandLine;
use recipekit_types::spec::SpecInput;
use std::collections::{BTreeMap, VecDeque};
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::process::{Command, Stdio};
use tracing::debug;

/// Lines of merged command output a runner hands back.
const RETAINED_OUTPUT_LINES: usize = 200;

/// Loads a spec file, picking the format from its extension.
#[derive(Debug, Clone)]
pub struct FsSpecSource {
    pub path: Utf8PathBuf,
}

impl FsSpecSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl SpecSource for FsSpecSource {
    fn load_spec(&self) -> anyhow::Result<SpecInput> {
        let contents =
            fs::read_to_string(&self.path).with_context(|| format!("read spec {}", self.path))?;
        parse_spec(&self.path, &contents)
    }
}

/// Parse a spec in TOML, YAML or JSON.
pub fn parse_spec(path: &Utf8Path, contents: &str) -> anyhow::Result<SpecInput> {
    match path.extension() {
        Some("toml") => toml::from_str(contents).with_context(|| format!("parse TOML spec {path}")),
        Some("yaml" | "yml") => {
            serde_yaml::from_str(contents).with_context(|| format!("parse YAML spec {path}"))
        }
        Some("json") => {
            serde_json::from_str(contents).with_context(|| format!("parse JSON spec {path}"))
        }
        other => bail!(
            "unsupported spec format {:?} for {path}: expected .toml, .yaml, .yml or .json",
            other.unwrap_or("")
        ),
    }
}

/// In-memory spec source for embedding and testing.
#[derive(Debug, Clone)]
pub struct InMemorySpecSource {
    spec: SpecInput,
}

impl InMemorySpecSource {
    pub fn new(spec: SpecInput) -> Self {
        Self { spec }
    }
}

impl SpecSource for InMemorySpecSource {
    fn load_spec(&self) -> anyhow::Result<SpecInput> {
        Ok(self.spec.clone())
    }
}

/// Runs commands with `std::process`, blocking until they exit.
///
/// stdout and stderr share one pipe, so the captured output keeps the order
/// in which the process wrote it. Lines are logged as they arrive and only
/// the last lines are kept.
#[derive(Debug, Clone, Default)]
pub struct ShellCommandRunner;

impl CommandRunner for ShellCommandRunner {
    fn run(
        &self,
        command: &CommandLine,
        cwd: &Utf8Path,
        env: &BTreeMap<String, String>,
    ) -> anyhow::Result<CommandOutput> {
        let program = resolve_program(cwd, &command.program);
        debug!(program = %program, cwd = %cwd, "spawning");

        let (reader, writer) = io::pipe().context("create output pipe")?;
        let stderr = writer.try_clone().context("duplicate output pipe")?;

        // The command owns the write ends; drop it so the reader sees EOF
        // once the child exits.
        let mut child = {
            let mut cmd = Command::new(program.as_str());
            cmd.args(&command.args)
                .current_dir(cwd)
                .envs(env)
                .stdin(Stdio::null())
                .stdout(writer)
                .stderr(stderr);
            cmd.spawn()
                .with_context(|| format!("run `{}` in {cwd}", command.display()))?
        };

        let output = read_merged(reader);
        let status = child
            .wait()
            .with_context(|| format!("wait for `{}`", command.display()))?;
        Ok(CommandOutput {
            exit_code: status.code(),
            output: output?,
        })
    }
}

fn read_merged(reader: impl Read) -> anyhow::Result<String> {
    let mut reader = BufReader::new(reader);
    let mut tail: VecDeque<String> = VecDeque::with_capacity(RETAINED_OUTPUT_LINES);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader
            .read_until(b'\n', &mut buf)
            .context("read command output")?
            == 0
        {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        let line = text.strip_suffix('\n').unwrap_or(text.as_ref());
        debug!("| {line}");
        if tail.len() == RETAINED_OUTPUT_LINES {
            tail.pop_front();
        }
        tail.push_back(line.to_string());
    }
    Ok(tail.into_iter().map(|line| line + "\n").collect())
}

/// Relative programs with a directory part (`./configure`) are looked up
/// from the working directory, everything else through `PATH`.
fn resolve_program(cwd: &Utf8Path, program: &str) -> Utf8PathBuf {
    let path = Utf8Path::new(program);
    if path.is_relative() && path.components().count() > 1 {
        cwd.join(path)
    } else {
        path.to_path_buf()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FsFileReader;

impl FileReader for FsFileReader {
    fn read_optional(&self, path: &Utf8Path) -> anyhow::Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {path}")),
        }
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
