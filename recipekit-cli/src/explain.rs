//! Recipe explanation for the `recipekit explain` and `list-recipes`
//! commands.

use recipekit_domain::{Condition, Recipe, VersionDecl, VersionSource};
use serde_json::json;
use std::fmt::Write;

const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Human-readable description of a recipe: versions, variants,
/// dependencies and conflicts.
pub fn explain_recipe(recipe: &dyn Recipe) -> String {
    let meta = recipe.meta();
    let mut out = String::new();

    let banner = RULE.replace('-', "=");
    let _ = writeln!(out, "{banner}");
    let _ = writeln!(out, "RECIPE: {}", meta.name);
    let _ = writeln!(out, "{banner}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Homepage:     {}", meta.homepage);
    let _ = writeln!(out, "Git:          {}", meta.git);
    let _ = writeln!(out, "Maintainers:  {}", meta.maintainers.join(", "));
    let _ = writeln!(out);

    section(&mut out, "DESCRIPTION");
    let _ = writeln!(out, "{}", meta.description);
    let _ = writeln!(out);

    section(&mut out, "VERSIONS");
    for v in &meta.versions {
        let _ = writeln!(out, "  {:<12} {}", v.name, version_source_label(v));
    }
    let _ = writeln!(out);

    section(&mut out, "VARIANTS");
    for v in &meta.variants {
        let _ = writeln!(
            out,
            "  {:<16} [default: {}] ({})",
            v.name,
            v.default,
            v.domain_label()
        );
        let _ = writeln!(out, "      {}", v.description);
    }
    let _ = writeln!(out);

    section(&mut out, "DEPENDENCIES");
    for d in &meta.dependencies {
        let name = if d.constraint.is_empty() {
            d.name.to_string()
        } else {
            format!("{} {}", d.name, d.constraint)
        };
        let _ = write!(out, "  {:<32} type=({})", name, d.link_types_label());
        if d.when != Condition::Always {
            let _ = write!(out, " when {}", d.when);
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out);

    section(&mut out, "CONFLICTS");
    if meta.conflicts.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for c in &meta.conflicts {
        let _ = writeln!(out, "  {} when {}", c.spec, c.when);
    }

    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{RULE}");
}

pub fn version_source_label(v: &VersionDecl) -> String {
    let source = match &v.source {
        VersionSource::Branch(branch) => format!("branch {branch}"),
        VersionSource::Commit(commit) => format!("commit {commit}"),
        VersionSource::ForkBranch { git, branch } => format!("branch {branch} of {git}"),
    };
    if v.submodules {
        format!("{source} (with submodules)")
    } else {
        source
    }
}

/// Machine-readable recipe summary for `list-recipes --format json`.
pub fn recipe_summary_json(recipe: &dyn Recipe) -> serde_json::Value {
    let meta = recipe.meta();
    json!({
        "name": meta.name,
        "homepage": meta.homepage,
        "versions": meta.versions.iter().map(|v| v.name).collect::<Vec<_>>(),
        "variants": meta.variants.iter().map(|v| v.name).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipekit_domain::{Icon, IconTools};

    #[test]
    fn test_explain_icon_lists_everything() {
        let text = explain_recipe(&Icon::new());
        assert!(text.contains("RECIPE: icon"));
        assert!(text.contains("ham          branch hammoz/gpu/master of"));
        assert!(text.contains("2.0.17       commit 39ed04ad (with submodules)"));
        assert!(text.contains("claw             [default: true] (bool)"));
        assert!(text.contains("icon_target      [default: gpu] (gpu|cpu)"));
        assert!(text.contains("when +claw"));
        assert!(!text.contains("  none"));
    }

    #[test]
    fn test_explain_icontools_has_no_conflicts() {
        let text = explain_recipe(&IconTools::new());
        assert!(text.contains("RECIPE: icontools"));
        assert!(text.contains("cray-libsci %cce"));
        assert!(text.contains("when slave=daint"));
        assert!(text.contains("CONFLICTS\n"));
        assert!(text.ends_with("  none\n"));
    }

    #[test]
    fn test_summary_json() {
        let v = recipe_summary_json(&IconTools::new());
        assert_eq!(v["name"], "icontools");
        assert_eq!(v["versions"][0], "master");
        assert_eq!(v["variants"][0], "slave");
    }
}
