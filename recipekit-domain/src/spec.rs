use crate::error::SpecError;
use crate::recipe::Recipe;
use camino::{Utf8Path, Utf8PathBuf};
use recipekit_types::spec::{CompilerInfo, DependencyInput, SpecInput};
use recipekit_types::variant::VariantValue;
use std::collections::BTreeMap;
use tracing::debug;

/// A validated, immutable spec for one build.
///
/// Every declared variant has a value (explicit or default), the version is
/// one the recipe declares, no conflict holds and every active dependency has
/// a prefix. Built only through [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    recipe: String,
    version: String,
    prefix: Utf8PathBuf,
    compiler: CompilerInfo,
    variants: BTreeMap<String, VariantValue>,
    dependencies: BTreeMap<String, DependencyInput>,
}

impl Spec {
    pub fn recipe(&self) -> &str {
        &self.recipe
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn prefix(&self) -> &Utf8Path {
        &self.prefix
    }

    pub fn compiler(&self) -> &CompilerInfo {
        &self.compiler
    }

    pub fn variants(&self) -> &BTreeMap<String, VariantValue> {
        &self.variants
    }

    pub fn variant(&self, name: &str) -> Option<&VariantValue> {
        self.variants.get(name)
    }

    /// True for a boolean variant set to `true`.
    pub fn enabled(&self, name: &str) -> bool {
        self.variant(name).and_then(VariantValue::as_bool) == Some(true)
    }

    /// Value of a single-valued (enum or free) variant.
    pub fn variant_str(&self, name: &str) -> Result<&str, SpecError> {
        self.variant(name)
            .and_then(VariantValue::as_str)
            .ok_or_else(|| SpecError::VariantType {
                name: name.to_string(),
                expected: "single-valued".to_string(),
            })
    }

    pub fn dep_prefix(&self, name: &str) -> Result<&Utf8Path, SpecError> {
        self.dependencies
            .get(name)
            .map(|d| d.prefix.as_path())
            .ok_or_else(|| SpecError::MissingDependency {
                name: name.to_string(),
                link_types: "not in spec".to_string(),
            })
    }
}

/// Validate a resolver-provided spec against the recipe's declarations.
pub fn resolve(recipe: &dyn Recipe, input: SpecInput) -> Result<Spec, SpecError> {
    let meta = recipe.meta();

    if !meta.versions.iter().any(|v| v.name == input.version) {
        return Err(SpecError::UnknownVersion {
            recipe: meta.name.to_string(),
            version: input.version,
            available: meta
                .versions
                .iter()
                .map(|v| v.name)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let mut given = input.variants;
    let mut variants = BTreeMap::new();
    for decl in &meta.variants {
        let value = match given.remove(decl.name) {
            Some(v) => decl.validate(v)?,
            None => decl.default.clone(),
        };
        variants.insert(decl.name.to_string(), value);
    }
    if let Some(name) = given.into_keys().next() {
        return Err(SpecError::UnknownVariant {
            recipe: meta.name.to_string(),
            name,
        });
    }

    let spec = Spec {
        recipe: meta.name.to_string(),
        version: input.version,
        prefix: input.prefix,
        compiler: input.compiler,
        variants,
        dependencies: input.dependencies,
    };

    for conflict in &meta.conflicts {
        if conflict.spec.holds(&spec) && conflict.when.holds(&spec) {
            return Err(SpecError::Conflict {
                spec: conflict.spec.to_string(),
                when: conflict.when.to_string(),
            });
        }
    }

    for dep in &meta.dependencies {
        if !dep.when.holds(&spec) {
            continue;
        }
        if !spec.dependencies.contains_key(dep.name) {
            return Err(SpecError::MissingDependency {
                name: dep.name.to_string(),
                link_types: dep.link_types_label(),
            });
        }
    }
    for name in spec.dependencies.keys() {
        if !meta.dependencies.iter().any(|d| d.name == name) {
            debug!(dependency = %name, "ignoring dependency the recipe does not declare");
        }
    }

    debug!(recipe = %spec.recipe, version = %spec.version, "spec resolved");
    Ok(spec)
}
