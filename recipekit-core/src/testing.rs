//! Post-build smoke test runner.
//!
//! Steps run in plan order. After the first failure the remaining commands
//! and status checks are skipped, but log echo steps still run so the job
//! output ends up in the build log either way.

use crate::error::{TestFailure, exit_label};
use crate::exec::{Executor, output_tail};
use crate::ports::FileReader;
use camino::Utf8PathBuf;
use recipekit_types::plan::{PlannedTest, TestStage, TestStep};
use recipekit_types::report::{TestRecord, TestStatus};
use tracing::{info, warn};

/// Run a planned test.
///
/// `Err` is reserved for tool errors (unreadable files); test outcomes are
/// reported through the returned failure.
pub(crate) fn run_test(
    test: &PlannedTest,
    exec: &Executor<'_>,
    files: &dyn FileReader,
) -> anyhow::Result<(TestRecord, Option<TestFailure>)> {
    info!(test = %test.name, "test started");
    let mut record = TestRecord {
        name: test.name.clone(),
        status: TestStatus::Passed,
        commands: vec![],
        failure: None,
    };
    let mut failure: Option<TestFailure> = None;

    for step in &test.steps {
        match step {
            TestStep::EchoLog { path } => echo_log(exec, files, path)?,
            _ if failure.is_some() => continue,
            TestStep::Command { stage, command } => {
                let (cmd_record, result) = exec.run(command);
                let display = cmd_record.command.clone();
                record.commands.push(cmd_record);
                failure = match (stage, result) {
                    (_, Ok(out)) if out.success() => None,
                    (TestStage::Runscripts, Ok(out)) => Some(TestFailure::Runscripts {
                        command: display,
                        reason: exit_label(&out.exit_code),
                        output: output_tail(&out.output),
                    }),
                    (TestStage::Runscripts, Err(e)) => Some(TestFailure::Runscripts {
                        command: display,
                        reason: format!("could not be started: {e:#}"),
                        output: String::new(),
                    }),
                    (TestStage::Submit, Ok(out)) => Some(TestFailure::JobFailed {
                        command: display,
                        exit_code: out.exit_code,
                        output: output_tail(&out.output),
                    }),
                    (TestStage::Submit, Err(e)) => Some(TestFailure::Submission {
                        command: display,
                        reason: format!("{e:#}"),
                    }),
                };
            }
            TestStep::StatusFile { path, token } => {
                let abs = exec.path(path);
                failure = match files.read_optional(&abs)? {
                    None => Some(TestFailure::StatusMissing {
                        path: Utf8PathBuf::from(path),
                    }),
                    Some(content) if content.contains(token.as_str()) => None,
                    Some(content) => Some(TestFailure::StatusNotOk {
                        path: Utf8PathBuf::from(path),
                        token: token.clone(),
                        content: content.trim().to_string(),
                    }),
                };
            }
        }
    }

    match &failure {
        Some(f) => {
            warn!(test = %test.name, "test failed: {f}");
            record.status = TestStatus::Failed;
            record.failure = Some(f.to_string());
        }
        None => info!(test = %test.name, "test passed"),
    }
    Ok((record, failure))
}

fn echo_log(exec: &Executor<'_>, files: &dyn FileReader, path: &str) -> anyhow::Result<()> {
    match files.read_optional(&exec.path(path))? {
        Some(contents) => info!(log = %path, "{}", contents.trim_end()),
        None => warn!(log = %path, "job log not found"),
    }
    Ok(())
}
