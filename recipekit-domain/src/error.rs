//! Error types for spec validation and plan assembly.

use thiserror::Error;

/// A spec that cannot be built by the selected recipe.
///
/// All variants are fatal: the install is rejected before any phase runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("unknown recipe '{name}' (available: {available})")]
    UnknownRecipe { name: String, available: String },

    #[error("recipe '{recipe}' has no version '{version}' (available: {available})")]
    UnknownVersion {
        recipe: String,
        version: String,
        available: String,
    },

    #[error("recipe '{recipe}' has no variant '{name}'")]
    UnknownVariant { recipe: String, name: String },

    #[error("invalid value '{value}' for variant '{name}': expected {expected}")]
    InvalidVariantValue {
        name: String,
        value: String,
        expected: String,
    },

    #[error("variant '{name}' is not a {expected} variant")]
    VariantType { name: String, expected: String },

    #[error("conflict: '{spec}' cannot be combined with '{when}'")]
    Conflict { spec: String, when: String },

    #[error("missing dependency '{name}' ({link_types})")]
    MissingDependency { name: String, link_types: String },

    #[error("unknown host '{host}' for batch submission")]
    UnknownHost { host: String },

    #[error("template '{template}': {reason}")]
    Template { template: String, reason: String },
}
