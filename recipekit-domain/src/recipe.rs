use crate::condition::Condition;
use crate::error::SpecError;
use crate::rules::Rule;
use crate::spec::Spec;
use crate::variant::VariantDecl;
use camino::Utf8PathBuf;
use recipekit_types::plan::{CommandLine, PlannedEdit, PlannedTest};
use recipekit_types::spec::LinkType;

/// Where a version's sources come from. Fetching is the framework's job;
/// this is carried for `explain` and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    Branch(&'static str),
    Commit(&'static str),
    /// A branch in a different repository than the recipe's default.
    ForkBranch {
        git: &'static str,
        branch: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDecl {
    pub name: &'static str,
    pub source: VersionSource,
    pub submodules: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDecl {
    pub name: &'static str,
    /// Version/compiler/variant constraint passed through to the resolver.
    pub constraint: &'static str,
    pub link_types: &'static [LinkType],
    pub when: Condition,
}

impl DependencyDecl {
    pub fn link_types_label(&self) -> String {
        self.link_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// `spec` and `when` holding together rejects the spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub spec: Condition,
    pub when: Condition,
}

/// Static description of a recipe.
#[derive(Debug, Clone)]
pub struct RecipeMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub homepage: &'static str,
    pub git: &'static str,
    pub maintainers: &'static [&'static str],
    pub versions: Vec<VersionDecl>,
    pub variants: Vec<VariantDecl>,
    pub dependencies: Vec<DependencyDecl>,
    pub conflicts: Vec<Conflict>,
}

/// One buildable package.
///
/// Implementations are pure: every method maps a resolved spec to strings and
/// command lines. Nothing here runs a process or reads a file.
pub trait Recipe: Send + Sync {
    fn meta(&self) -> &RecipeMeta;

    /// Ordered rule table producing configure arguments and environment.
    fn rules(&self) -> Vec<Rule>;

    /// Pre-existing build configuration file consumed by configure, if any.
    fn config_file(&self, _spec: &Spec) -> Result<Option<Utf8PathBuf>, SpecError> {
        Ok(None)
    }

    /// In-place edits for the edit phase.
    fn edits(&self, _spec: &Spec) -> Result<Vec<PlannedEdit>, SpecError> {
        Ok(vec![])
    }

    /// Commands run before configure.
    fn pre_configure(&self, _spec: &Spec) -> Result<Vec<CommandLine>, SpecError> {
        Ok(vec![])
    }

    /// The configure command, or `None` to skip configuration.
    fn configure(&self, spec: &Spec, args: &[String]) -> Result<Option<CommandLine>, SpecError>;

    /// Post-build smoke test, or `None` when the spec asks for none.
    fn test(&self, _spec: &Spec, _time_limit: &str) -> Result<Option<PlannedTest>, SpecError> {
        Ok(None)
    }
}
