//! Core plan and install pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: commands, status files and artifacts
//! all go through the port traits. Only the edit phase touches the source
//! tree directly, through `recipekit-edit`.

use crate::env::build_overrides;
use crate::error::{InstallError, exit_label};
use crate::exec::{Executor, not_run, output_tail};
use crate::ports::{CommandRunner, FileReader, SpecSource, WritePort};
use crate::settings::{InstallSettings, PlanSettings};
use crate::testing::run_test;
use anyhow::Context;
use camino::Utf8Path;
use recipekit_domain::{lookup_recipe, plan_install, resolve};
use recipekit_edit::{PatchOptions, apply_edits};
use recipekit_render::{render_plan_md, render_report_md};
use recipekit_types::ToolInfo;
use recipekit_types::plan::{InstallPlan, Phase, PlannedTest};
use recipekit_types::report::{
    InstallReport, PhaseRecord, PhaseStatus, TestRecord, TestStatus, Verdict, VerdictStatus,
};
use tracing::{debug, info, warn};

/// Outcome of `run_plan`.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: InstallPlan,
}

/// Validate the spec against its recipe and compute the install plan.
///
/// The caller is responsible for writing artifacts (via `WritePort`) or the
/// convenience `write_plan_artifacts` helper.
pub fn run_plan(
    settings: &PlanSettings,
    specs: &dyn SpecSource,
    tool: ToolInfo,
) -> Result<PlanOutcome, InstallError> {
    let input = specs.load_spec().context("load spec")?;
    let recipe = lookup_recipe(&input.recipe)?;
    let spec = resolve(recipe.as_ref(), input)?;
    let plan = plan_install(recipe.as_ref(), &spec, &settings.plan_options(), tool)?;

    debug!(
        recipe = %plan.recipe,
        version = %plan.version,
        steps = plan.steps.len(),
        edits = plan.edits.len(),
        test = plan.test.is_some(),
        "plan computed"
    );
    Ok(PlanOutcome { plan })
}

/// Write `plan.json` and `plan.md` into `out_dir`.
pub fn write_plan_artifacts(
    outcome: &PlanOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    write_plan_files(&outcome.plan, out_dir, writer)
}

fn write_plan_files(
    plan: &InstallPlan,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    let plan_json = serde_json::to_string_pretty(plan).context("serialize plan")?;
    writer.write_file(&out_dir.join("plan.json"), plan_json.as_bytes())?;

    let plan_md = render_plan_md(plan);
    writer.write_file(&out_dir.join("plan.md"), plan_md.as_bytes())?;
    Ok(())
}

/// Outcome of `run_install`.
///
/// A failed phase or test does not make `run_install` return `Err`: the
/// report still records how far the install got, and `failure` holds the
/// error that stopped it.
#[derive(Debug)]
pub struct InstallOutcome {
    pub plan: InstallPlan,
    pub report: InstallReport,
    /// Unified diff of the config file edits (empty when nothing changed).
    pub patch: String,
    pub failure: Option<InstallError>,
}

impl InstallOutcome {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    pub fn exit_code(&self) -> u8 {
        self.failure.as_ref().map_or(0, InstallError::exit_code)
    }
}

/// Plan, then run edit, configure, build, test and install in that order.
///
/// Stops at the first failing phase; later phases are recorded as skipped.
/// The test runs between build and install, so a failing test leaves the
/// prefix untouched.
///
/// Returns `Err` only when no plan could be computed.
pub fn run_install(
    settings: &InstallSettings,
    specs: &dyn SpecSource,
    runner: &dyn CommandRunner,
    files: &dyn FileReader,
    tool: ToolInfo,
) -> Result<InstallOutcome, InstallError> {
    let PlanOutcome { plan } = run_plan(&settings.plan, specs, tool.clone())?;

    info!(
        recipe = %plan.recipe,
        version = %plan.version,
        source_dir = %settings.source_dir,
        dry_run = settings.dry_run,
        "install started"
    );

    let mut report = InstallReport::new(tool, &plan.recipe, &plan.version);
    report.dry_run = settings.dry_run;
    let mut failure: Option<InstallError> = None;

    // Edit
    let patch_opts = PatchOptions {
        dry_run: settings.dry_run,
        on_missing: settings.on_missing,
        backup_suffix: settings.backup_suffix.clone(),
    };
    let mut patch = String::new();
    match apply_edits(&settings.source_dir, &plan.edits, &patch_opts) {
        Ok(edits) => {
            patch = edits.patch();
            let status = if settings.dry_run {
                PhaseStatus::Skipped
            } else {
                PhaseStatus::Ok
            };
            let mut record = PhaseRecord::new(Phase::Edit, status);
            record.edits = edits.records();
            report.phases.push(record);
        }
        Err(e) => {
            warn!("edit phase failed: {e}");
            let mut record = PhaseRecord::new(Phase::Edit, PhaseStatus::Failed);
            record.message = Some(e.to_string());
            report.phases.push(record);
            failure = Some(e.into());
        }
    }

    let exec = Executor {
        runner,
        source_dir: &settings.source_dir,
        overrides: build_overrides(&settings.inherited_env, &plan.env),
    };
    let halted = |failure: &Option<InstallError>| settings.dry_run || failure.is_some();

    for phase in [Phase::Configure, Phase::Build] {
        let record = run_phase(&plan, phase, &exec, halted(&failure), &mut failure);
        report.phases.push(record);
    }

    report.test = plan.test.as_ref().map(|test| {
        if halted(&failure) {
            return skipped_test(test);
        }
        match run_test(test, &exec, files) {
            Ok((record, test_failure)) => {
                if let Some(f) = test_failure {
                    failure = Some(f.into());
                }
                record
            }
            Err(e) => {
                let mut record = skipped_test(test);
                record.status = TestStatus::Failed;
                record.failure = Some(format!("{e:#}"));
                failure = Some(InstallError::Internal(e));
                record
            }
        }
    });

    let record = run_phase(&plan, Phase::Install, &exec, halted(&failure), &mut failure);
    report.phases.push(record);

    report.verdict = match &failure {
        None => Verdict {
            status: VerdictStatus::Pass,
            reasons: vec![],
        },
        Some(e) => Verdict {
            status: VerdictStatus::Fail,
            reasons: vec![e.to_string()],
        },
    };
    report.run.finish();

    match &failure {
        None => info!(recipe = %plan.recipe, "install finished"),
        Some(e) => warn!(recipe = %plan.recipe, exit_code = e.exit_code(), "install failed: {e}"),
    }

    Ok(InstallOutcome {
        plan,
        report,
        patch,
        failure,
    })
}

/// Run the commands of one phase. When `skip` is set the commands are only
/// listed.
fn run_phase(
    plan: &InstallPlan,
    phase: Phase,
    exec: &Executor<'_>,
    skip: bool,
    failure: &mut Option<InstallError>,
) -> PhaseRecord {
    let commands: Vec<_> = plan.steps_for(phase).map(|s| &s.command).collect();

    if skip {
        let mut record = PhaseRecord::new(phase, PhaseStatus::Skipped);
        record.commands = commands.iter().map(|c| not_run(c.display())).collect();
        return record;
    }

    info!(phase = %phase, "phase started");
    let mut record = PhaseRecord::new(phase, PhaseStatus::Ok);
    for (idx, command) in commands.iter().enumerate() {
        let (cmd_record, result) = exec.run(command);
        record.commands.push(cmd_record);

        let err = match result {
            Ok(out) if out.success() => continue,
            Ok(out) => InstallError::Phase {
                phase,
                command: command.display(),
                reason: exit_label(&out.exit_code),
                output: output_tail(&out.output),
            },
            Err(e) => InstallError::Phase {
                phase,
                command: command.display(),
                reason: format!("could not be started: {e:#}"),
                output: String::new(),
            },
        };

        warn!(phase = %phase, "{err}");
        record.status = PhaseStatus::Failed;
        record.message = Some(err.to_string());
        record
            .commands
            .extend(commands[idx + 1..].iter().map(|c| not_run(c.display())));
        *failure = Some(err);
        break;
    }
    record
}

fn skipped_test(test: &PlannedTest) -> TestRecord {
    TestRecord {
        name: test.name.clone(),
        status: TestStatus::Skipped,
        commands: vec![],
        failure: None,
    }
}

/// Write `plan.json`, `plan.md`, `report.json`, `report.md` and
/// `patch.diff` into `out_dir`.
pub fn write_install_artifacts(
    outcome: &InstallOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    write_plan_files(&outcome.plan, out_dir, writer)?;

    let report_json = serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

    let report_md = render_report_md(&outcome.report);
    writer.write_file(&out_dir.join("report.md"), report_md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySpecSource;
    use crate::error::TestFailure;
    use crate::ports::CommandOutput;
    use camino::Utf8PathBuf;
    use pretty_assertions::assert_eq;
    use recipekit_types::plan::CommandLine;
    use recipekit_types::spec::{CompilerInfo, DependencyInput, SpecInput};
    use recipekit_types::variant::VariantValue;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    const CONFIG: &str = "config/cscs/daint.gpu.gnu";
    const CONFIG_BODY: &str = "XML2_ROOT=/usr\n\
                               SERIALBOX2_ROOT=/usr\n\
                               SB2PP=old \\\n\
                               CLAW='clawfc'\n";

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        command: String,
        cwd: Utf8PathBuf,
        env: BTreeMap<String, String>,
    }

    /// Records every call. Scripted programs exit with the given code, or
    /// fail to start when the code is `None`.
    #[derive(Default)]
    struct FakeRunner {
        calls: RefCell<Vec<Call>>,
        scripted: BTreeMap<String, Option<i32>>,
    }

    impl FakeRunner {
        fn failing(command: &str, code: Option<i32>) -> Self {
            let mut scripted = BTreeMap::new();
            scripted.insert(command.to_string(), code);
            Self {
                scripted,
                ..Self::default()
            }
        }

        fn commands(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|c| c.command.clone()).collect()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(
            &self,
            command: &CommandLine,
            cwd: &Utf8Path,
            env: &BTreeMap<String, String>,
        ) -> anyhow::Result<CommandOutput> {
            let display = command.display();
            self.calls.borrow_mut().push(Call {
                command: display.clone(),
                cwd: cwd.to_path_buf(),
                env: env.clone(),
            });
            match self.scripted.get(&display) {
                None => Ok(CommandOutput {
                    exit_code: Some(0),
                    output: String::new(),
                }),
                Some(Some(code)) => Ok(CommandOutput {
                    exit_code: Some(*code),
                    output: "compiling\nerror: boom\n".to_string(),
                }),
                Some(None) => anyhow::bail!("No such file or directory"),
            }
        }
    }

    #[derive(Default)]
    struct FakeFiles {
        files: BTreeMap<Utf8PathBuf, String>,
        reads: RefCell<Vec<Utf8PathBuf>>,
    }

    impl FakeFiles {
        fn with(path: Utf8PathBuf, contents: &str) -> Self {
            let mut files = BTreeMap::new();
            files.insert(path, contents.to_string());
            Self {
                files,
                ..Self::default()
            }
        }
    }

    impl FileReader for FakeFiles {
        fn read_optional(&self, path: &Utf8Path) -> anyhow::Result<Option<String>> {
            self.reads.borrow_mut().push(path.to_path_buf());
            Ok(self.files.get(path).cloned())
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        files: RefCell<BTreeMap<Utf8PathBuf, String>>,
    }

    impl WritePort for RecordingWriter {
        fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
            self.files.borrow_mut().insert(
                path.to_path_buf(),
                String::from_utf8_lossy(contents).into_owned(),
            );
            Ok(())
        }

        fn create_dir_all(&self, _path: &Utf8Path) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn tool() -> ToolInfo {
        ToolInfo {
            name: "recipekit".to_string(),
            version: None,
        }
    }

    fn deps(names: &[&str]) -> BTreeMap<String, DependencyInput> {
        names
            .iter()
            .map(|n| {
                (
                    n.to_string(),
                    DependencyInput {
                        prefix: format!("/opt/{n}").into(),
                        version: None,
                    },
                )
            })
            .collect()
    }

    fn icon_spec(test_name: Option<&str>) -> InMemorySpecSource {
        let mut variants = BTreeMap::new();
        if let Some(name) = test_name {
            variants.insert("test_name".to_string(), VariantValue::text(name));
        }
        InMemorySpecSource::new(SpecInput {
            recipe: "icon".to_string(),
            version: "master".to_string(),
            prefix: "/opt/icon".into(),
            compiler: CompilerInfo {
                name: "gcc".to_string(),
                version: None,
            },
            variants,
            dependencies: deps(&["cmake", "libxml2", "serialbox", "claw"]),
        })
    }

    fn icontools_spec() -> InMemorySpecSource {
        let mut variants = BTreeMap::new();
        variants.insert("slave".to_string(), VariantValue::text("daint"));
        InMemorySpecSource::new(SpecInput {
            recipe: "icontools".to_string(),
            version: "master".to_string(),
            prefix: "/opt/icontools".into(),
            compiler: CompilerInfo {
                name: "cce".to_string(),
                version: None,
            },
            variants,
            dependencies: deps(&[
                "autoconf",
                "automake",
                "libtool",
                "m4",
                "cray-libsci",
                "netcdf-fortran",
                "netcdf-c",
                "hdf5",
                "mpi",
                "eccodes",
                "jasper",
            ]),
        })
    }

    fn icon_tree() -> (TempDir, Utf8PathBuf) {
        let td = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
        fs_err::create_dir_all(root.join("config/cscs")).unwrap();
        fs_err::write(root.join(CONFIG), CONFIG_BODY).unwrap();
        (td, root)
    }

    fn settings(root: &Utf8Path) -> InstallSettings {
        InstallSettings {
            source_dir: root.to_path_buf(),
            ..InstallSettings::default()
        }
    }

    fn status_path(root: &Utf8Path) -> Utf8PathBuf {
        root.join("experiments/atm_amip_test/finish.status")
    }

    fn phase_status(outcome: &InstallOutcome, phase: Phase) -> PhaseStatus {
        outcome.report.phase(phase).unwrap().status
    }

    #[test]
    fn successful_install_runs_every_phase_in_order() {
        let (_td, root) = icon_tree();
        let runner = FakeRunner::default();
        let files = FakeFiles::with(status_path(&root), "OK\n");

        let outcome = run_install(
            &settings(&root),
            &icon_spec(Some("atm_amip_test")),
            &runner,
            &files,
            tool(),
        )
        .unwrap();

        assert!(outcome.succeeded());
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(
            runner.commands(),
            vec![
                "./config/cscs/daint.gpu.gnu --prefix=/opt/icon",
                "make",
                "./make_runscripts -s atm_amip_test",
                "sbatch -W --time=00:15:00 -A g110 -C gpu -p debug exp.atm_amip_test.run",
                "make install",
            ]
        );
        assert_eq!(runner.calls.borrow()[3].cwd, root.join("run"));
        assert_eq!(outcome.report.verdict.status, VerdictStatus::Pass);
        assert_eq!(
            outcome.report.test.as_ref().unwrap().status,
            TestStatus::Passed
        );

        let patched = fs_err::read_to_string(root.join(CONFIG)).unwrap();
        assert!(patched.contains("XML2_ROOT='/opt/libxml2'"));
        assert!(patched.contains("CLAW='/opt/claw/bin/clawfc'"));
        assert!(outcome.patch.contains("+++ b/config/cscs/daint.gpu.gnu"));
        assert!(outcome.report.run.ended_at.is_some());
    }

    #[test]
    fn status_without_ok_fails_before_install() {
        let (_td, root) = icon_tree();
        let runner = FakeRunner::default();
        let files = FakeFiles::with(status_path(&root), "FAILED\n");

        let outcome = run_install(
            &settings(&root),
            &icon_spec(Some("atm_amip_test")),
            &runner,
            &files,
            tool(),
        )
        .unwrap();

        assert_eq!(outcome.exit_code(), 3);
        assert!(matches!(
            outcome.failure,
            Some(InstallError::Test(TestFailure::StatusNotOk { ref content, .. })) if content == "FAILED"
        ));
        assert_eq!(phase_status(&outcome, Phase::Install), PhaseStatus::Skipped);
        assert!(!runner.commands().contains(&"make install".to_string()));
        assert_eq!(outcome.report.verdict.status, VerdictStatus::Fail);
    }

    #[test]
    fn missing_status_file_fails_the_test() {
        let (_td, root) = icon_tree();
        let outcome = run_install(
            &settings(&root),
            &icon_spec(Some("atm_amip_test")),
            &FakeRunner::default(),
            &FakeFiles::default(),
            tool(),
        )
        .unwrap();

        assert!(matches!(
            outcome.failure,
            Some(InstallError::Test(TestFailure::StatusMissing { .. }))
        ));
        let test = outcome.report.test.unwrap();
        assert_eq!(test.status, TestStatus::Failed);
        assert!(test.failure.unwrap().contains("finish.status not found"));
    }

    #[test]
    fn build_failure_skips_test_and_install() {
        let (_td, root) = icon_tree();
        let runner = FakeRunner::failing("make", Some(2));

        let outcome = run_install(
            &settings(&root),
            &icon_spec(Some("atm_amip_test")),
            &runner,
            &FakeFiles::default(),
            tool(),
        )
        .unwrap();

        assert_eq!(outcome.exit_code(), 2);
        let err = outcome.failure.as_ref().unwrap();
        assert_eq!(err.to_string(), "build phase failed: `make` exited with code 2");
        match err {
            InstallError::Phase { output, .. } => assert!(output.contains("error: boom")),
            other => panic!("unexpected failure: {other:?}"),
        }
        assert_eq!(phase_status(&outcome, Phase::Configure), PhaseStatus::Ok);
        assert_eq!(phase_status(&outcome, Phase::Build), PhaseStatus::Failed);
        assert_eq!(phase_status(&outcome, Phase::Install), PhaseStatus::Skipped);
        assert_eq!(
            outcome.report.test.as_ref().unwrap().status,
            TestStatus::Skipped
        );
        let build = outcome.report.phase(Phase::Build).unwrap();
        assert_eq!(build.commands[0].output.as_deref(), Some("compiling\nerror: boom"));
        let install = outcome.report.phase(Phase::Install).unwrap();
        assert_eq!(install.commands[0].exit_code, None);
        assert_eq!(install.commands[0].output, None);
    }

    #[test]
    fn configure_that_cannot_start_is_reported() {
        let (_td, root) = icon_tree();
        let runner =
            FakeRunner::failing("./config/cscs/daint.gpu.gnu --prefix=/opt/icon", None);

        let outcome = run_install(
            &settings(&root),
            &icon_spec(None),
            &runner,
            &FakeFiles::default(),
            tool(),
        )
        .unwrap();

        let msg = outcome.failure.as_ref().unwrap().to_string();
        assert!(msg.starts_with("configure phase failed"));
        assert!(msg.contains("could not be started"));
        assert_eq!(runner.commands().len(), 1);
    }

    #[test]
    fn unmatched_config_pattern_stops_before_configure() {
        let (_td, root) = icon_tree();
        fs_err::write(root.join(CONFIG), "FC=gfortran\n").unwrap();
        let runner = FakeRunner::default();

        let outcome = run_install(
            &settings(&root),
            &icon_spec(None),
            &runner,
            &FakeFiles::default(),
            tool(),
        )
        .unwrap();

        assert_eq!(outcome.exit_code(), 2);
        assert_eq!(phase_status(&outcome, Phase::Edit), PhaseStatus::Failed);
        assert_eq!(phase_status(&outcome, Phase::Configure), PhaseStatus::Skipped);
        assert!(runner.commands().is_empty());
        assert_eq!(
            fs_err::read_to_string(root.join(CONFIG)).unwrap(),
            "FC=gfortran\n"
        );
    }

    #[test]
    fn missing_config_file_is_an_install_failure() {
        let (_td, root) = icon_tree();
        fs_err::remove_file(root.join(CONFIG)).unwrap();
        let runner = FakeRunner::default();

        let outcome = run_install(
            &settings(&root),
            &icon_spec(None),
            &runner,
            &FakeFiles::default(),
            tool(),
        )
        .unwrap();

        assert_eq!(outcome.exit_code(), 2);
        let msg = outcome.failure.as_ref().unwrap().to_string();
        assert!(msg.contains("missing or incorrect config path"));
        assert!(msg.contains("daint.gpu.gnu"));
        assert_eq!(phase_status(&outcome, Phase::Edit), PhaseStatus::Failed);
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn runscripts_failure_keeps_command_output() {
        let (_td, root) = icon_tree();
        let runner = FakeRunner::failing("./make_runscripts -s atm_amip_test", Some(1));

        let outcome = run_install(
            &settings(&root),
            &icon_spec(Some("atm_amip_test")),
            &runner,
            &FakeFiles::default(),
            tool(),
        )
        .unwrap();

        assert_eq!(outcome.exit_code(), 3);
        let failure = outcome.failure.as_ref().unwrap();
        match failure {
            InstallError::Test(TestFailure::Runscripts { reason, output, .. }) => {
                assert_eq!(reason, "exited with code 1");
                assert_eq!(output, "compiling\nerror: boom");
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        assert_eq!(failure.output(), Some("compiling\nerror: boom"));

        let test = outcome.report.test.as_ref().unwrap();
        assert_eq!(test.commands.len(), 1);
        assert_eq!(test.commands[0].output.as_deref(), Some("compiling\nerror: boom"));
        assert!(!runner.commands().iter().any(|c| c.starts_with("sbatch")));
    }

    #[test]
    fn job_failure_still_echoes_the_log() {
        let root = Utf8PathBuf::from("/work/icontools");
        let runner = FakeRunner::failing(
            "sbatch -W --time=00:15:00 -A g110 -C gpu -p debug ./C2SM-scripts/test/jenkins/test.sh",
            Some(1),
        );
        let files = FakeFiles::default();

        let outcome = run_install(
            &settings(&root),
            &icontools_spec(),
            &runner,
            &files,
            tool(),
        )
        .unwrap();

        assert_eq!(outcome.exit_code(), 3);
        assert!(matches!(
            outcome.failure,
            Some(InstallError::Test(TestFailure::JobFailed {
                exit_code: Some(1),
                ref output,
                ..
            })) if output.contains("error: boom")
        ));
        assert_eq!(*files.reads.borrow(), vec![root.join("job.out")]);
        assert_eq!(phase_status(&outcome, Phase::Install), PhaseStatus::Skipped);
    }

    #[test]
    fn build_environment_reaches_commands() {
        let root = Utf8PathBuf::from("/work/icontools");
        let runner = FakeRunner::default();
        let mut settings = settings(&root);
        settings
            .inherited_env
            .insert("LIBS".to_string(), "-L/opt/lib".to_string());
        settings
            .inherited_env
            .insert("HOME".to_string(), "/home/user".to_string());

        let outcome = run_install(
            &settings,
            &icontools_spec(),
            &runner,
            &FakeFiles::default(),
            tool(),
        )
        .unwrap();
        assert!(outcome.succeeded());

        let calls = runner.calls.borrow();
        let configure = &calls[0];
        assert_eq!(configure.cwd, root);
        assert!(configure.env["LIBS"].starts_with("-L/opt/lib -lhdf5"));
        assert!(configure.env["CFLAGS"].starts_with("-O2 -g"));
        assert!(!configure.env.contains_key("HOME"));
    }

    #[test]
    fn dry_run_lists_commands_without_running_them() {
        let (_td, root) = icon_tree();
        let runner = FakeRunner::default();
        let mut settings = settings(&root);
        settings.dry_run = true;

        let outcome = run_install(
            &settings,
            &icon_spec(Some("atm_amip_test")),
            &runner,
            &FakeFiles::default(),
            tool(),
        )
        .unwrap();

        assert!(outcome.succeeded());
        assert!(runner.commands().is_empty());
        assert!(outcome.report.dry_run);
        assert!(outcome.patch.contains("+XML2_ROOT='/opt/libxml2'"));
        assert_eq!(fs_err::read_to_string(root.join(CONFIG)).unwrap(), CONFIG_BODY);

        for phase in [Phase::Edit, Phase::Configure, Phase::Build, Phase::Install] {
            assert_eq!(phase_status(&outcome, phase), PhaseStatus::Skipped);
        }
        let edit = outcome.report.phase(Phase::Edit).unwrap();
        assert_eq!(edit.edits.len(), 1);
        let build = outcome.report.phase(Phase::Build).unwrap();
        assert_eq!(build.commands[0].command, "make");
        assert_eq!(
            outcome.report.test.as_ref().unwrap().status,
            TestStatus::Skipped
        );
    }

    #[test]
    fn disabled_tests_leave_no_test_record() {
        let (_td, root) = icon_tree();
        let runner = FakeRunner::default();
        let mut settings = settings(&root);
        settings.plan.run_tests = false;
        settings.plan.make_jobs = Some(8);

        let outcome = run_install(
            &settings,
            &icon_spec(Some("atm_amip_test")),
            &runner,
            &FakeFiles::default(),
            tool(),
        )
        .unwrap();

        assert!(outcome.succeeded());
        assert!(outcome.report.test.is_none());
        assert_eq!(runner.commands()[1..], ["make -j8", "make -j8 install"]);
    }

    #[test]
    fn invalid_spec_is_an_error() {
        let mut input = icon_spec(None).load_spec().unwrap();
        input.version = "9.9".to_string();
        let err = run_plan(
            &PlanSettings::default(),
            &InMemorySpecSource::new(input),
            tool(),
        )
        .unwrap_err();
        assert!(matches!(err, InstallError::Spec(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn install_artifacts_are_written() {
        let root = Utf8PathBuf::from("/work/icontools");
        let outcome = run_install(
            &settings(&root),
            &icontools_spec(),
            &FakeRunner::default(),
            &FakeFiles::with(root.join("job.out"), "done\n"),
            tool(),
        )
        .unwrap();

        let writer = RecordingWriter::default();
        let out = Utf8PathBuf::from("out");
        write_install_artifacts(&outcome, &out, &writer).unwrap();

        let files = writer.files.borrow();
        let names: Vec<&str> = files.keys().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "out/patch.diff",
                "out/plan.json",
                "out/plan.md",
                "out/report.json",
                "out/report.md"
            ]
        );
        let report: serde_json::Value =
            serde_json::from_str(&files[&out.join("report.json")]).unwrap();
        assert_eq!(report["schema"], "recipekit.report.v1");
        assert_eq!(report["verdict"]["status"], "pass");
        assert_eq!(report["test"]["name"], "jenkins");
        assert_eq!(files[&out.join("patch.diff")], "");
    }

    #[test]
    fn plan_artifacts_are_written() {
        let outcome = run_plan(&PlanSettings::default(), &icontools_spec(), tool()).unwrap();
        let writer = RecordingWriter::default();
        write_plan_artifacts(&outcome, Utf8Path::new("out"), &writer).unwrap();

        let files = writer.files.borrow();
        assert_eq!(files.len(), 2);
        let plan: InstallPlan = serde_json::from_str(&files[Utf8Path::new("out/plan.json")]).unwrap();
        assert_eq!(plan, outcome.plan);
    }
}
