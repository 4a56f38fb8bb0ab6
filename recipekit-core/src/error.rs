use camino::Utf8PathBuf;
use recipekit_domain::SpecError;
use recipekit_edit::EditError;
use recipekit_types::plan::Phase;

/// Error type for pipeline results.
///
/// Exit code 2 = install failure, 3 = test failure, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("invalid spec: {0}")]
    Spec(#[from] SpecError),

    #[error("edit phase failed: {0}")]
    Edit(#[from] EditError),

    #[error("{phase} phase failed: `{command}` {reason}")]
    Phase {
        phase: Phase,
        command: String,
        reason: String,
        /// Captured stdout and stderr (tail).
        output: String,
    },

    #[error("test failed: {0}")]
    Test(#[from] TestFailure),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl InstallError {
    /// Tail of the failing command's output, if any was captured.
    pub fn output(&self) -> Option<&str> {
        match self {
            InstallError::Phase { output, .. } => Some(output.as_str()).filter(|o| !o.is_empty()),
            InstallError::Test(f) => f.output(),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            InstallError::Spec(_) | InstallError::Phase { .. } => 2,
            InstallError::Edit(e) => e.exit_code(),
            InstallError::Test(_) => 3,
            InstallError::Internal(_) => 1,
        }
    }
}

/// Why a post-build test did not pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TestFailure {
    #[error("run script generation `{command}` {reason}")]
    Runscripts {
        command: String,
        reason: String,
        /// Captured output (tail), empty when the command never started.
        output: String,
    },

    #[error("could not submit `{command}`: {reason}")]
    Submission { command: String, reason: String },

    #[error("status file {path} not found")]
    StatusMissing { path: Utf8PathBuf },

    #[error("status file {path} does not contain '{token}': {content}")]
    StatusNotOk {
        path: Utf8PathBuf,
        token: String,
        content: String,
    },

    #[error("batch job `{command}` {}", exit_label(.exit_code))]
    JobFailed {
        command: String,
        exit_code: Option<i32>,
        /// Captured output of the submission (tail).
        output: String,
    },
}

impl TestFailure {
    pub fn output(&self) -> Option<&str> {
        match self {
            TestFailure::Runscripts { output, .. } | TestFailure::JobFailed { output, .. } => {
                Some(output.as_str()).filter(|o| !o.is_empty())
            }
            _ => None,
        }
    }
}

/// How a finished process ended, for error messages.
pub fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exited with code {c}"),
        None => "was terminated by a signal".to_string(),
    }
}
