//! Configuration file loading for recipekit.
//!
//! Discovers and loads `recipekit.toml` from the working directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use recipekit_core::{InstallSettings, MissingPattern, PlanSettings};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "recipekit.toml";

/// Default suffix for config file backups.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".orig";

/// Top-level configuration from recipekit.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipekitConfig {
    pub patch: PatchConfig,
    pub build: BuildConfig,
    pub test: TestConfig,
    pub output: OutputConfig,
}

/// Config file patching.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatchConfig {
    /// What to do when a substitution pattern matches nothing.
    pub on_missing: MissingPattern,

    /// Keep a copy of each config file before patching it.
    pub backup: bool,

    pub backup_suffix: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            on_missing: MissingPattern::Fail,
            backup: false,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Parallel make jobs.
    pub jobs: Option<u32>,
}

/// Post-build test settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
    pub enabled: bool,

    /// Scheduler wall-clock limit, `HH:MM:SS`.
    pub time_limit: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time_limit: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub out_dir: Option<Utf8PathBuf>,
}

/// Discover the recipekit.toml config file.
///
/// Returns `None` if `dir` has no config file.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a recipekit.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<RecipekitConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<RecipekitConfig> {
    let config: RecipekitConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `dir`, or return default if not found.
pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<RecipekitConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(RecipekitConfig::default()),
    }
}

/// Plan-level options given on the command line. `None` defers to the
/// config file.
#[derive(Debug, Clone, Default)]
pub struct PlanOverrides {
    pub out_dir: Option<Utf8PathBuf>,
    pub jobs: Option<u32>,
    pub time_limit: Option<String>,
    pub skip_test: bool,
}

/// Install-only options given on the command line.
#[derive(Debug, Clone, Default)]
pub struct InstallOverrides {
    pub on_missing: Option<MissingPattern>,
    pub backup: bool,
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub out_dir: Utf8PathBuf,
    pub make_jobs: Option<u32>,
    pub time_limit: String,
    pub run_tests: bool,
    pub on_missing: MissingPattern,
    pub backup_suffix: Option<String>,
}

impl MergedConfig {
    pub fn plan_settings(&self) -> PlanSettings {
        PlanSettings {
            out_dir: self.out_dir.clone(),
            make_jobs: self.make_jobs,
            time_limit: self.time_limit.clone(),
            run_tests: self.run_tests,
        }
    }

    pub fn install_settings(
        &self,
        source_dir: Utf8PathBuf,
        dry_run: bool,
        inherited_env: BTreeMap<String, String>,
    ) -> InstallSettings {
        InstallSettings {
            plan: self.plan_settings(),
            source_dir,
            dry_run,
            on_missing: self.on_missing,
            backup_suffix: self.backup_suffix.clone(),
            inherited_env,
        }
    }
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: RecipekitConfig,
}

impl ConfigMerger {
    pub fn new(config: RecipekitConfig) -> Self {
        Self { config }
    }

    /// Merge with plan command CLI arguments.
    ///
    /// `--skip-test` turns tests off even when the config enables them.
    pub fn merge_plan_args(self, cli: &PlanOverrides) -> MergedConfig {
        let defaults = PlanSettings::default();
        MergedConfig {
            out_dir: cli
                .out_dir
                .clone()
                .or(self.config.output.out_dir)
                .unwrap_or(defaults.out_dir),
            make_jobs: cli.jobs.or(self.config.build.jobs),
            time_limit: cli
                .time_limit
                .clone()
                .or(self.config.test.time_limit)
                .unwrap_or(defaults.time_limit),
            run_tests: self.config.test.enabled && !cli.skip_test,
            on_missing: self.config.patch.on_missing,
            backup_suffix: self
                .config
                .patch
                .backup
                .then_some(self.config.patch.backup_suffix),
        }
    }

    /// Merge with install command CLI arguments.
    pub fn merge_install_args(self, plan: &PlanOverrides, cli: &InstallOverrides) -> MergedConfig {
        let backup_suffix = self.config.patch.backup_suffix.clone();
        let mut merged = self.merge_plan_args(plan);
        if let Some(on_missing) = cli.on_missing {
            merged.on_missing = on_missing;
        }
        // CLI flag enables backups when the config leaves them off
        if cli.backup && merged.backup_suffix.is_none() {
            merged.backup_suffix = Some(backup_suffix);
        }
        merged
    }
}
