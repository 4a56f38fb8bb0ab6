//! Rendering helpers (markdown and plain text) for human-readable artifacts.

use recipekit_types::env::{EnvMutation, EnvOp};
use recipekit_types::plan::{InstallPlan, Phase, TestStage, TestStep};
use recipekit_types::report::{InstallReport, PhaseStatus, TestStatus, VerdictStatus};

pub fn render_plan_md(plan: &InstallPlan) -> String {
    let mut out = String::new();
    out.push_str(&format!("# recipekit plan: {}@{}\n\n", plan.recipe, plan.version));
    out.push_str(&format!("- Compiler: `{}`\n", plan.compiler));
    out.push_str(&format!("- Prefix: `{}`\n", plan.prefix));
    if let Some(config) = &plan.config_file {
        out.push_str(&format!("- Config file: `{}`\n", config));
    }
    out.push('\n');

    out.push_str("## Variants\n\n");
    if plan.variants.is_empty() {
        out.push_str("_No variants._\n");
    }
    for (name, value) in &plan.variants {
        out.push_str(&format!("- `{}` = `{}`\n", name, value));
    }
    out.push('\n');

    out.push_str("## Configure arguments\n\n");
    if plan.configure_args.is_empty() {
        out.push_str("_None._\n");
    }
    for arg in &plan.configure_args {
        out.push_str(&format!("- `{}`\n", arg));
    }
    out.push('\n');

    if !plan.env.is_empty() {
        out.push_str("## Environment\n\n");
        for m in &plan.env {
            out.push_str(&format!("- {}\n", env_line(m)));
        }
        out.push('\n');
    }

    if !plan.edits.is_empty() {
        out.push_str("## Edits\n\n");
        for edit in &plan.edits {
            out.push_str(&format!("### `{}`\n\n", edit.path));
            for s in &edit.substitutions {
                out.push_str(&format!("- `{}` → `{}`\n", s.pattern, s.replacement));
            }
            out.push('\n');
        }
    }

    out.push_str("## Steps\n\n");
    for (i, step) in plan.steps.iter().enumerate() {
        let cwd = step
            .command
            .cwd
            .as_deref()
            .map(|d| format!(" (in `{d}`)"))
            .unwrap_or_default();
        out.push_str(&format!(
            "{}. **{}** `{}`{}\n",
            i + 1,
            step.phase,
            step.command.display(),
            cwd
        ));
    }
    out.push('\n');

    out.push_str("## Test\n\n");
    match &plan.test {
        None => out.push_str("_No test planned._\n"),
        Some(test) => {
            out.push_str(&format!("Runs after `{}`: **{}**\n\n", Phase::Build, test.name));
            for step in &test.steps {
                out.push_str(&format!("- {}\n", test_step_line(step)));
            }
        }
    }

    out
}

pub fn render_report_md(report: &InstallReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# recipekit install: {}@{}\n\n",
        report.recipe, report.version
    ));
    out.push_str(&format!("- Verdict: `{}`\n", verdict_label(report.verdict.status)));
    out.push_str(&format!("- Dry run: `{}`\n", report.dry_run));
    if let Some(ms) = report.run.duration_ms {
        out.push_str(&format!("- Duration: {} ms\n", ms));
    }
    for reason in &report.verdict.reasons {
        out.push_str(&format!("- Reason: {}\n", reason));
    }
    out.push('\n');

    out.push_str("## Phases\n\n");
    if report.phases.is_empty() {
        out.push_str("_No phases ran._\n");
    }
    for record in &report.phases {
        out.push_str(&format!(
            "### {} `{}`\n\n",
            record.phase,
            phase_status_label(record.status)
        ));
        if let Some(msg) = &record.message {
            out.push_str(&format!("{}\n\n", msg));
        }
        for edit in &record.edits {
            out.push_str(&format!(
                "- `{}` {} → {}\n",
                edit.path,
                short_sha(&edit.sha256_before),
                short_sha(&edit.sha256_after)
            ));
            for s in &edit.substitutions {
                out.push_str(&format!("  - `{}` matched {} line(s)\n", s.pattern, s.lines_matched));
            }
        }
        for cmd in &record.commands {
            out.push_str(&format!("- `{}`{}\n", cmd.command, exit_suffix(cmd.exit_code)));
        }
        out.push('\n');
    }

    if let Some(test) = &report.test {
        out.push_str(&format!(
            "## Test {} `{}`\n\n",
            test.name,
            test_status_label(test.status)
        ));
        if let Some(failure) = &test.failure {
            out.push_str(&format!("{}\n\n", failure));
        }
        for cmd in &test.commands {
            out.push_str(&format!("- `{}`{}\n", cmd.command, exit_suffix(cmd.exit_code)));
        }
    }

    out
}

/// Configure arguments and environment, one per line, as `recipekit args` prints them.
pub fn render_args_text(plan: &InstallPlan) -> String {
    let mut out = String::new();
    for arg in &plan.configure_args {
        out.push_str(arg);
        out.push('\n');
    }
    for m in &plan.env {
        out.push_str(&env_line(m));
        out.push('\n');
    }
    out
}

fn env_line(m: &EnvMutation) -> String {
    match m.op {
        EnvOp::Set => format!("{}={}", m.var, m.value),
        EnvOp::AppendFlags => format!("{}+={}", m.var, m.value),
    }
}

fn test_step_line(step: &TestStep) -> String {
    match step {
        TestStep::Command { stage, command } => {
            let cwd = command
                .cwd
                .as_deref()
                .map(|d| format!(" (in `{d}`)"))
                .unwrap_or_default();
            format!("{}: `{}`{}", stage_label(*stage), command.display(), cwd)
        }
        TestStep::StatusFile { path, token } => {
            format!("status: `{}` must contain `{}`", path, token)
        }
        TestStep::EchoLog { path } => format!("log: echo `{}`", path),
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}

fn exit_suffix(code: Option<i32>) -> String {
    match code {
        Some(0) => String::new(),
        Some(c) => format!(" (exit {})", c),
        None => " (not run)".to_string(),
    }
}

fn stage_label(s: TestStage) -> &'static str {
    match s {
        TestStage::Runscripts => "runscripts",
        TestStage::Submit => "submit",
    }
}

fn verdict_label(s: VerdictStatus) -> &'static str {
    match s {
        VerdictStatus::Pass => "pass",
        VerdictStatus::Fail => "fail",
    }
}

fn phase_status_label(s: PhaseStatus) -> &'static str {
    match s {
        PhaseStatus::Ok => "ok",
        PhaseStatus::Failed => "failed",
        PhaseStatus::Skipped => "skipped",
    }
}

fn test_status_label(s: TestStatus) -> &'static str {
    match s {
        TestStatus::Passed => "passed",
        TestStatus::Failed => "failed",
        TestStatus::Skipped => "skipped",
    }
}
