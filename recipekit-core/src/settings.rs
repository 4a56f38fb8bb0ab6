//! Clap-free settings for plan and install pipelines.

use camino::Utf8PathBuf;
use recipekit_domain::{DEFAULT_TIME_LIMIT, PlanOptions};
use recipekit_edit::MissingPattern;
use std::collections::BTreeMap;

/// Settings for the plan pipeline.
#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub out_dir: Utf8PathBuf,
    pub make_jobs: Option<u32>,
    pub time_limit: String,
    pub run_tests: bool,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            out_dir: Utf8PathBuf::from("artifacts/recipekit"),
            make_jobs: None,
            time_limit: DEFAULT_TIME_LIMIT.to_string(),
            run_tests: true,
        }
    }
}

impl PlanSettings {
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            make_jobs: self.make_jobs,
            time_limit: self.time_limit.clone(),
            run_tests: self.run_tests,
        }
    }
}

/// Settings for the install pipeline.
#[derive(Debug, Clone)]
pub struct InstallSettings {
    pub plan: PlanSettings,

    /// Directory holding the unpacked sources; commands run relative to it.
    pub source_dir: Utf8PathBuf,

    // Install behaviour
    pub dry_run: bool,
    pub on_missing: MissingPattern,

    // Backups
    pub backup_suffix: Option<String>,

    /// Environment the build inherits; `append_flags` extends these values.
    pub inherited_env: BTreeMap<String, String>,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            plan: PlanSettings::default(),
            source_dir: Utf8PathBuf::from("."),
            dry_run: false,
            on_missing: MissingPattern::default(),
            backup_suffix: None,
            inherited_env: BTreeMap::new(),
        }
    }
}
