use crate::variant::VariantValue;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A concrete spec as handed over by the external resolver.
///
/// Variants that are absent take the recipe's declared default during
/// validation. Dependencies carry only what the recipes read: the install
/// prefix and, optionally, the resolved version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecInput {
    pub recipe: String,
    pub version: String,
    pub prefix: Utf8PathBuf,
    pub compiler: CompilerInfo,

    #[serde(default)]
    pub variants: BTreeMap<String, VariantValue>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencyInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyInput {
    pub prefix: Utf8PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// How a dependency participates in the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Build,
    Link,
    Run,
}

impl LinkType {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Build => "build",
            LinkType::Link => "link",
            LinkType::Run => "run",
        }
    }
}
