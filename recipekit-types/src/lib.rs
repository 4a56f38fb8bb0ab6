//! Shared DTOs (schemas-as-code) for the recipekit workspace.
//!
//! # Design constraints
//! - These types are intended to be serialized to disk.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod env;
pub mod plan;
pub mod report;
pub mod spec;
pub mod variant;

/// Schema identifiers.
pub mod schema {
    pub const RECIPEKIT_PLAN_V1: &str = "recipekit.plan.v1";
    pub const RECIPEKIT_REPORT_V1: &str = "recipekit.report.v1";
}

use serde::{Deserialize, Serialize};

/// Identifies the tool that produced an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
