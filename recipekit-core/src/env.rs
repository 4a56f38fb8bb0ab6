//! Build environment assembly.

use recipekit_types::env::EnvMutation;
use std::collections::BTreeMap;

/// Fold the planned mutations over the inherited environment.
///
/// Returns only the variables the mutations touch, with their final values.
/// `append_flags` sees the inherited value or whatever an earlier mutation
/// left behind.
pub fn build_overrides(
    inherited: &BTreeMap<String, String>,
    mutations: &[EnvMutation],
) -> BTreeMap<String, String> {
    let mut overrides: BTreeMap<String, String> = BTreeMap::new();
    for m in mutations {
        let current = overrides
            .get(&m.var)
            .or_else(|| inherited.get(&m.var))
            .map(String::as_str);
        let next = m.apply_to(current);
        overrides.insert(m.var.clone(), next);
    }
    overrides
}

/// Environment for one command: build overrides plus the command's own
/// variables, which win.
pub fn command_env(
    overrides: &BTreeMap<String, String>,
    command_env: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut env = overrides.clone();
    env.extend(command_env.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
}
