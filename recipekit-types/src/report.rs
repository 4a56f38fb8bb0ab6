use crate::ToolInfo;
use crate::plan::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one install run, written as `report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,
    pub recipe: String,
    pub version: String,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub phases: Vec<PhaseRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<TestRecord>,

    pub verdict: Verdict,
}

impl InstallReport {
    pub fn new(tool: ToolInfo, recipe: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::RECIPEKIT_REPORT_V1.to_string(),
            tool,
            run: RunInfo::start(),
            recipe: recipe.into(),
            version: version.into(),
            dry_run: false,
            phases: vec![],
            test: None,
            verdict: Verdict {
                status: VerdictStatus::Pass,
                reasons: vec![],
            },
        }
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseRecord> {
        self.phases.iter().find(|p| p.phase == phase)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl RunInfo {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: None,
        }
    }

    pub fn finish(&mut self) {
        let now = Utc::now();
        let elapsed = now.signed_duration_since(self.started_at);
        self.ended_at = Some(now);
        self.duration_ms = u64::try_from(elapsed.num_milliseconds()).ok();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Ok,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub status: PhaseStatus,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<EditRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PhaseRecord {
    pub fn new(phase: Phase, status: PhaseStatus) -> Self {
        Self {
            phase,
            status,
            commands: vec![],
            edits: vec![],
            message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command: String,

    /// `None` when the process was killed by a signal or never started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Last lines of the merged stdout/stderr stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRecord {
    pub path: String,
    pub sha256_before: String,
    pub sha256_after: String,

    #[serde(default)]
    pub substitutions: Vec<SubstitutionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionRecord {
    pub pattern: String,
    pub lines_matched: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub name: String,
    pub status: TestStatus,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub status: VerdictStatus,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}
