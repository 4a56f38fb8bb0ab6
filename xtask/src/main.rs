use anyhow::Context;
use clap::{Parser, Subcommand};
use fs_err as fs;
use std::path::Path;
use std::process::Command as ProcessCommand;

const FIXTURES_DIR: &str = "tests/fixtures";

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by recipekit artifacts.
    PrintSchemas,
    /// Bless golden fixtures (overwrite expected plans).
    BlessFixtures,
    /// Check that every fixture has a spec and an expected plan.
    CheckFixtures {
        #[arg(long, default_value = FIXTURES_DIR)]
        dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", recipekit_types::schema::RECIPEKIT_PLAN_V1);
            println!("{}", recipekit_types::schema::RECIPEKIT_REPORT_V1);
        }
        Command::BlessFixtures => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "recipekit-domain", "--test", "golden_fixtures"])
                .env("RECIPEKIT_BLESS", "1")
                .status()
                .context("run golden fixture blessing")?;
            if !status.success() {
                anyhow::bail!("bless-fixtures failed");
            }
        }
        Command::CheckFixtures { dir } => {
            let problems = check_fixtures(Path::new(&dir))?;
            if !problems.is_empty() {
                for p in &problems {
                    eprintln!("{p}");
                }
                anyhow::bail!("{} fixture problem(s) in {dir}", problems.len());
            }
            println!("fixtures in {dir} are complete");
        }
    }
    Ok(())
}

fn check_fixtures(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut problems = Vec::new();
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("list {}", dir.display()))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        for required in ["spec.toml", "expected/plan.json"] {
            if !path.join(required).is_file() {
                problems.push(format!("{}: missing {required}", path.display()));
            }
        }
    }
    Ok(problems)
}
