//! Error types for recipekit-edit.
//!
//! This module defines error types that distinguish between:
//! - Patch failures (exit code 2): a pattern that matches nothing, a pattern that does not compile,
//!   a selected config file that does not exist
//! - Runtime errors (exit code 1): other I/O errors

use camino::Utf8PathBuf;
use thiserror::Error;

/// The top-level error type for recipekit-edit operations.
#[derive(Debug, Error)]
pub enum EditError {
    /// No line of the file matched the pattern.
    #[error("pattern '{pattern}' matched no line in {path}")]
    PatternNotMatched { pattern: String, path: Utf8PathBuf },

    /// The selected config file is not in the source tree.
    #[error("missing or incorrect config path: {path} does not exist")]
    ConfigFileMissing { path: Utf8PathBuf },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A runtime/tool error occurred (exit code 1).
    /// This includes unreadable files and failed writes.
    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

impl EditError {
    /// Returns true if the patch itself was rejected (exit code 2).
    pub fn is_patch_failure(&self) -> bool {
        !matches!(self, EditError::Runtime(_))
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_patch_failure() { 2 } else { 1 }
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::EditError;

    #[test]
    fn unmatched_pattern_reports_exit_code_2() {
        let err = EditError::PatternNotMatched {
            pattern: "XML2_ROOT=.*".to_string(),
            path: "config/cscs/daint.gpu.gnu".into(),
        };
        assert!(err.is_patch_failure());
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "pattern 'XML2_ROOT=.*' matched no line in config/cscs/daint.gpu.gnu"
        );
    }

    #[test]
    fn runtime_error_reports_exit_code_1() {
        let err = EditError::from(anyhow::anyhow!("boom"));
        assert!(!err.is_patch_failure());
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("runtime error"));
    }

    #[test]
    fn missing_config_file_is_a_patch_failure() {
        let err = EditError::ConfigFileMissing {
            path: "./config/cscs/tsa.cpu.pgi".into(),
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "missing or incorrect config path: ./config/cscs/tsa.cpu.pgi does not exist"
        );
    }
}
