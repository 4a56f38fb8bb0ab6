use crate::error::SpecError;
use crate::recipe::Recipe;
use crate::rules::build_flags;
use crate::spec::Spec;
use recipekit_types::ToolInfo;
use recipekit_types::plan::{CommandLine, InstallPlan, Phase, PlannedStep};
use tracing::debug;

/// Wall-clock limit passed to the scheduler for smoke tests.
pub const DEFAULT_TIME_LIMIT: &str = "00:15:00";

#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Parallel make jobs (`make -jN`); `None` runs plain `make`.
    pub make_jobs: Option<u32>,
    pub time_limit: String,
    pub run_tests: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            make_jobs: None,
            time_limit: DEFAULT_TIME_LIMIT.to_string(),
            run_tests: true,
        }
    }
}

/// Assemble every edit, command and test step for one install.
///
/// Deterministic: the same recipe, spec and options always produce the same
/// plan, so command lines can be compared byte for byte.
pub fn plan_install(
    recipe: &dyn Recipe,
    spec: &Spec,
    opts: &PlanOptions,
    tool: ToolInfo,
) -> Result<InstallPlan, SpecError> {
    let mut plan = InstallPlan::new(tool, spec.recipe(), spec.version());
    plan.compiler = match &spec.compiler().version {
        Some(v) => format!("{}@{v}", spec.compiler().name),
        None => spec.compiler().name.clone(),
    };
    plan.prefix = spec.prefix().to_string();
    plan.variants = spec
        .variants()
        .iter()
        .map(|(k, v)| (k.clone(), v.to_string()))
        .collect();
    plan.config_file = recipe.config_file(spec)?.map(|p| p.to_string());

    let flags = build_flags(recipe, spec)?;
    plan.configure_args = flags.args;
    plan.env = flags.env;

    plan.edits = recipe.edits(spec)?;

    for command in recipe.pre_configure(spec)? {
        plan.steps.push(PlannedStep {
            phase: Phase::Configure,
            command,
        });
    }
    if let Some(command) = recipe.configure(spec, &plan.configure_args)? {
        plan.steps.push(PlannedStep {
            phase: Phase::Configure,
            command,
        });
    }

    let make_args: Vec<String> = opts.make_jobs.map(|n| format!("-j{n}")).into_iter().collect();
    plan.steps.push(PlannedStep {
        phase: Phase::Build,
        command: CommandLine::new("make", make_args.clone()),
    });
    plan.steps.push(PlannedStep {
        phase: Phase::Install,
        command: CommandLine::new("make", make_args.into_iter().chain(["install".to_string()])),
    });

    if opts.run_tests {
        plan.test = recipe.test(spec, &opts.time_limit)?;
    }

    debug!(
        recipe = %plan.recipe,
        steps = plan.steps.len(),
        edits = plan.edits.len(),
        test = plan.test.is_some(),
        "install planned"
    );
    Ok(plan)
}
