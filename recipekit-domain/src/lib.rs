//! Domain logic: turn a resolved spec into a deterministic install plan.
//!
//! This crate owns *what* a build does and in which order. It does not run
//! anything and does not touch the file system; that's the `recipekit-core`
//! crate (processes) and the `recipekit-edit` crate (config file patching).

mod condition;
mod error;
mod planner;
mod recipe;
mod recipes;
mod rules;
mod scheduler;
mod selector;
mod spec;
mod template;
mod variant;

pub use condition::Condition;
pub use error::SpecError;
pub use planner::{DEFAULT_TIME_LIMIT, PlanOptions, plan_install};
pub use recipe::{Conflict, DependencyDecl, Recipe, RecipeMeta, VersionDecl, VersionSource};
pub use recipes::{Icon, IconTools, builtin_recipes, lookup_recipe, recipe_names};
pub use rules::{BuildFlags, Effect, Rule, build_flags};
pub use scheduler::SubmitProfile;
pub use selector::{compiler_suffix, config_file_name, select_config_file};
pub use spec::{Spec, resolve};
pub use template::Template;
pub use variant::{VariantDecl, VariantDomain};
