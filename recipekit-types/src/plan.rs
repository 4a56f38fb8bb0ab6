use crate::ToolInfo;
use crate::env::EnvMutation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Build phases in execution order.
///
/// The post-build test is not a phase; it runs between `Build` and
/// `Install` and is reported on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Edit,
    Configure,
    Build,
    Install,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Edit => "edit",
            Phase::Configure => "configure",
            Phase::Build => "build",
            Phase::Install => "install",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully assembled external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory relative to the source directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Extra variables for this command only, on top of the build environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl CommandLine {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(var.into(), value.into());
        self
    }

    /// Shell-like rendering used in logs, reports and golden files.
    pub fn display(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("{k}={}", shell_quote(v)))
            .collect();
        parts.push(shell_quote(&self.program));
        parts.extend(self.args.iter().map(|a| shell_quote(a)));
        parts.join(" ")
    }
}

fn shell_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '=' | ':' | ',' | '+')
        });
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// A `(pattern, replacement)` pair for the config file patcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSubstitution {
    pub pattern: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedEdit {
    pub path: String,
    pub substitutions: Vec<PlannedSubstitution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStep {
    pub phase: Phase,
    pub command: CommandLine,
}

/// Which part of the smoke test a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStage {
    /// Local script that prepares the experiment.
    Runscripts,
    /// Batch job submission (blocks until the job ends).
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TestStep {
    Command {
        stage: TestStage,
        command: CommandLine,
    },
    /// Read a status artifact and require `token` in its content.
    StatusFile { path: String, token: String },
    /// Echo a log file into the run log. Runs even after an earlier failure.
    EchoLog { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTest {
    pub name: String,
    pub steps: Vec<TestStep>,
}

/// Everything an install would do, computed without running anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallPlan {
    pub schema: String,
    pub tool: ToolInfo,
    pub recipe: String,
    pub version: String,
    pub compiler: String,
    pub prefix: String,

    #[serde(default)]
    pub variants: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,

    #[serde(default)]
    pub configure_args: Vec<String>,

    #[serde(default)]
    pub env: Vec<EnvMutation>,

    #[serde(default)]
    pub edits: Vec<PlannedEdit>,

    #[serde(default)]
    pub steps: Vec<PlannedStep>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<PlannedTest>,
}

impl InstallPlan {
    pub fn new(tool: ToolInfo, recipe: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::RECIPEKIT_PLAN_V1.to_string(),
            tool,
            recipe: recipe.into(),
            version: version.into(),
            compiler: String::new(),
            prefix: String::new(),
            variants: BTreeMap::new(),
            config_file: None,
            configure_args: vec![],
            env: vec![],
            edits: vec![],
            steps: vec![],
            test: None,
        }
    }

    pub fn steps_for(&self, phase: Phase) -> impl Iterator<Item = &PlannedStep> {
        self.steps.iter().filter(move |s| s.phase == phase)
    }
}
