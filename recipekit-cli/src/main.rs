mod config;
mod explain;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{ConfigMerger, InstallOverrides, MergedConfig, PlanOverrides};
use recipekit_core::adapters::{FsFileReader, FsSpecSource, FsWritePort, ShellCommandRunner};
use recipekit_core::{
    InstallError, MissingPattern, run_install, run_plan, write_install_artifacts,
    write_plan_artifacts,
};
use recipekit_domain::{builtin_recipes, lookup_recipe};
use recipekit_render::render_args_text;
use recipekit_types::ToolInfo;
use std::collections::BTreeMap;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "recipekit",
    version,
    about = "Build recipes for the ICON model and ICON tools on CSCS clusters."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a spec and write its install plan (runs nothing).
    Plan(PlanArgs),
    /// Patch, configure, build, test and install a spec.
    Install(InstallArgs),
    /// Print the build configuration file the spec selects.
    ConfigPath(SpecArgs),
    /// Print configure arguments and environment changes for a spec.
    Args(ArgsArgs),
    /// List the built-in recipes.
    ListRecipes(ListRecipesArgs),
    /// Show a recipe's versions, variants, dependencies and conflicts.
    Explain(ExplainArgs),
}

#[derive(Debug, Parser)]
struct SpecArgs {
    /// Concrete spec file (.toml, .yaml, .yml or .json).
    #[arg(long, env = "RECIPEKIT_SPEC")]
    spec: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct PlanArgs {
    #[command(flatten)]
    spec: SpecArgs,

    /// Output directory for artifacts (default: artifacts/recipekit).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Parallel make jobs.
    #[arg(long)]
    jobs: Option<u32>,

    /// Wall-clock limit for the test job (HH:MM:SS).
    #[arg(long)]
    time_limit: Option<String>,

    /// Leave the post-build test out of the plan.
    #[arg(long, default_value_t = false)]
    skip_test: bool,
}

#[derive(Debug, Parser)]
struct InstallArgs {
    #[command(flatten)]
    plan: PlanArgs,

    /// Directory holding the unpacked sources.
    #[arg(long, default_value = ".")]
    source_dir: Utf8PathBuf,

    /// Compute edits and list commands without changing or running anything.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// What to do when a config file pattern matches no line.
    #[arg(long, value_enum)]
    on_missing: Option<OnMissing>,

    /// Back up config files before patching them.
    #[arg(long, default_value_t = false)]
    backup: bool,
}

#[derive(Debug, Parser)]
struct ArgsArgs {
    #[command(flatten)]
    spec: SpecArgs,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ListRecipesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Recipe name (e.g., "icon", "icontools").
    recipe: String,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OnMissing {
    Fail,
    Warn,
}

impl From<OnMissing> for MissingPattern {
    fn from(v: OnMissing) -> Self {
        match v {
            OnMissing::Fail => MissingPattern::Fail,
            OnMissing::Warn => MissingPattern::Warn,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match real_main(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn real_main(cli: Cli) -> Result<u8, InstallError> {
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Install(args) => cmd_install(args),
        Command::ConfigPath(args) => cmd_config_path(args),
        Command::Args(args) => cmd_args(args),
        Command::ListRecipes(args) => cmd_list_recipes(args),
        Command::Explain(args) => cmd_explain(args),
    }
}

fn plan_overrides(args: &PlanArgs) -> PlanOverrides {
    PlanOverrides {
        out_dir: args.out_dir.clone(),
        jobs: args.jobs,
        time_limit: args.time_limit.clone(),
        skip_test: args.skip_test,
    }
}

fn load_merger() -> anyhow::Result<ConfigMerger> {
    let file_config =
        config::load_or_default(camino::Utf8Path::new(".")).context("load recipekit.toml config")?;
    Ok(ConfigMerger::new(file_config))
}

fn cmd_plan(args: PlanArgs) -> Result<u8, InstallError> {
    let merged = load_merger()?.merge_plan_args(&plan_overrides(&args));
    debug!("merged config: {:?}", merged);

    let settings = merged.plan_settings();
    let specs = FsSpecSource::new(args.spec.spec);
    let outcome = run_plan(&settings, &specs, tool_info())?;

    write_plan_artifacts(&outcome, &settings.out_dir, &FsWritePort)?;
    info!("wrote plan to {}", settings.out_dir);
    Ok(0)
}

fn cmd_install(args: InstallArgs) -> Result<u8, InstallError> {
    let install = InstallOverrides {
        on_missing: args.on_missing.map(MissingPattern::from),
        backup: args.backup,
    };
    let merged: MergedConfig =
        load_merger()?.merge_install_args(&plan_overrides(&args.plan), &install);
    debug!("merged config: {:?}", merged);

    let inherited_env: BTreeMap<String, String> = std::env::vars().collect();
    let settings = merged.install_settings(args.source_dir, args.dry_run, inherited_env);
    let specs = FsSpecSource::new(args.plan.spec.spec);

    let outcome = run_install(
        &settings,
        &specs,
        &ShellCommandRunner,
        &FsFileReader,
        tool_info(),
    )?;

    write_install_artifacts(&outcome, &settings.plan.out_dir, &FsWritePort)?;
    info!("wrote install report to {}", settings.plan.out_dir);

    if let Some(failure) = &outcome.failure {
        error!("{failure}");
        if let Some(output) = failure.output() {
            eprintln!("{output}");
        }
    }
    Ok(outcome.exit_code())
}

fn cmd_config_path(args: SpecArgs) -> Result<u8, InstallError> {
    let outcome = run_plan(
        &Default::default(),
        &FsSpecSource::new(args.spec),
        tool_info(),
    )?;
    let Some(path) = outcome.plan.config_file else {
        return Err(anyhow::anyhow!(
            "recipe `{}` does not use a build configuration file",
            outcome.plan.recipe
        )
        .into());
    };
    println!("{path}");
    Ok(0)
}

fn cmd_args(args: ArgsArgs) -> Result<u8, InstallError> {
    let outcome = run_plan(
        &Default::default(),
        &FsSpecSource::new(args.spec.spec),
        tool_info(),
    )?;
    let plan = outcome.plan;
    match args.format {
        OutputFormat::Text => print!("{}", render_args_text(&plan)),
        OutputFormat::Json => {
            let v = serde_json::json!({
                "recipe": plan.recipe,
                "configure_args": plan.configure_args,
                "env": plan.env,
            });
            let s = serde_json::to_string_pretty(&v).context("serialize args")?;
            println!("{s}");
        }
    }
    Ok(0)
}

fn cmd_list_recipes(args: ListRecipesArgs) -> Result<u8, InstallError> {
    let recipes = builtin_recipes();
    match args.format {
        OutputFormat::Text => {
            println!("Available recipes:\n");
            println!("  {:<12} {:<28} HOMEPAGE", "NAME", "VERSIONS");
            println!("  {:<12} {:<28} --------", "----", "--------");
            for r in &recipes {
                let meta = r.meta();
                let versions: Vec<&str> = meta.versions.iter().map(|v| v.name).collect();
                println!(
                    "  {:<12} {:<28} {}",
                    meta.name,
                    versions.join(", "),
                    meta.homepage
                );
            }
            println!();
            println!("Use 'recipekit explain <recipe>' for details.");
        }
        OutputFormat::Json => {
            let list: Vec<_> = recipes
                .iter()
                .map(|r| explain::recipe_summary_json(r.as_ref()))
                .collect();
            let s = serde_json::to_string_pretty(&list).context("serialize recipes")?;
            println!("{s}");
        }
    }
    Ok(0)
}

fn cmd_explain(args: ExplainArgs) -> Result<u8, InstallError> {
    let recipe = lookup_recipe(&args.recipe)?;
    print!("{}", explain::explain_recipe(recipe.as_ref()));
    Ok(0)
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "recipekit".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
