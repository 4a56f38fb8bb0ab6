//! Spec builders shared by the domain test suites.

#![allow(dead_code)]

use recipekit_types::spec::{CompilerInfo, DependencyInput, SpecInput};
use recipekit_types::variant::VariantValue;
use std::collections::BTreeMap;

pub fn compiler(name: &str) -> CompilerInfo {
    CompilerInfo {
        name: name.to_string(),
        version: None,
    }
}

pub fn deps(names: &[&str]) -> BTreeMap<String, DependencyInput> {
    names
        .iter()
        .map(|n| {
            (
                n.to_string(),
                DependencyInput {
                    prefix: format!("/opt/{n}").into(),
                    version: None,
                },
            )
        })
        .collect()
}

pub fn icon_input(compiler_name: &str, variants: &[(&str, VariantValue)]) -> SpecInput {
    icon_input_at("master", compiler_name, variants)
}

pub fn icon_input_at(
    version: &str,
    compiler_name: &str,
    variants: &[(&str, VariantValue)],
) -> SpecInput {
    SpecInput {
        recipe: "icon".to_string(),
        version: version.to_string(),
        prefix: "/opt/icon".into(),
        compiler: compiler(compiler_name),
        variants: variants
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
        dependencies: deps(&["cmake", "libxml2", "serialbox", "claw", "eccodes"]),
    }
}

pub fn icontools_input(slave: &str) -> SpecInput {
    let mut variants = BTreeMap::new();
    variants.insert("slave".to_string(), VariantValue::text(slave));
    SpecInput {
        recipe: "icontools".to_string(),
        version: "master".to_string(),
        prefix: "/opt/icontools".into(),
        compiler: compiler("cce"),
        variants,
        dependencies: deps(&[
            "autoconf",
            "automake",
            "libtool",
            "m4",
            "cray-libsci",
            "netcdf-fortran",
            "netcdf-c",
            "hdf5",
            "mpi",
            "eccodes",
            "jasper",
        ]),
    }
}
