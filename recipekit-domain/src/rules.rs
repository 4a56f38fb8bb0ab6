use crate::condition::Condition;
use crate::error::SpecError;
use crate::recipe::Recipe;
use crate::spec::Spec;
use crate::template::Template;
use recipekit_types::env::EnvMutation;

/// What a matching rule contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Arg(Template),
    SetEnv { var: &'static str, value: Template },
    AppendFlags { var: &'static str, value: Template },
}

impl Effect {
    pub const fn arg(raw: &'static str) -> Self {
        Effect::Arg(Template::new(raw))
    }

    pub const fn set_env(var: &'static str, raw: &'static str) -> Self {
        Effect::SetEnv {
            var,
            value: Template::new(raw),
        }
    }

    pub const fn append_flags(var: &'static str, raw: &'static str) -> Self {
        Effect::AppendFlags {
            var,
            value: Template::new(raw),
        }
    }
}

/// One row of a recipe's flag table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub when: Condition,
    pub effects: Vec<Effect>,
}

impl Rule {
    pub fn new(when: Condition, effects: Vec<Effect>) -> Self {
        Self { when, effects }
    }

    pub fn always(effects: Vec<Effect>) -> Self {
        Self::new(Condition::Always, effects)
    }
}

/// Configure arguments and environment mutations, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFlags {
    pub args: Vec<String>,
    pub env: Vec<EnvMutation>,
}

/// Evaluate a recipe's rule table once, top to bottom.
pub fn build_flags(recipe: &dyn Recipe, spec: &Spec) -> Result<BuildFlags, SpecError> {
    let mut flags = BuildFlags::default();
    for rule in recipe.rules() {
        if !rule.when.holds(spec) {
            continue;
        }
        for effect in &rule.effects {
            match effect {
                Effect::Arg(t) => flags.args.push(t.render(spec)?),
                Effect::SetEnv { var, value } => {
                    flags.env.push(EnvMutation::set(*var, value.render(spec)?))
                }
                Effect::AppendFlags { var, value } => flags
                    .env
                    .push(EnvMutation::append_flags(*var, value.render(spec)?)),
            }
        }
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{DependencyDecl, RecipeMeta, VersionDecl, VersionSource};
    use crate::spec::resolve;
    use crate::variant::VariantDecl;
    use recipekit_types::plan::CommandLine;
    use recipekit_types::spec::{CompilerInfo, DependencyInput, LinkType, SpecInput};
    use recipekit_types::variant::VariantValue;
    use std::collections::BTreeMap;

    struct Toy {
        meta: RecipeMeta,
    }

    impl Toy {
        fn new() -> Self {
            Self {
                meta: RecipeMeta {
                    name: "toy",
                    description: "",
                    homepage: "",
                    git: "",
                    maintainers: &[],
                    versions: vec![VersionDecl {
                        name: "1.0",
                        source: VersionSource::Branch("main"),
                        submodules: false,
                    }],
                    variants: vec![
                        VariantDecl::boolean("fast", false, ""),
                        VariantDecl::free("mode", "none", ""),
                    ],
                    dependencies: vec![DependencyDecl {
                        name: "zlib",
                        constraint: "",
                        link_types: &[LinkType::Link],
                        when: Condition::Always,
                    }],
                    conflicts: vec![],
                },
            }
        }
    }

    impl Recipe for Toy {
        fn meta(&self) -> &RecipeMeta {
            &self.meta
        }

        fn rules(&self) -> Vec<Rule> {
            vec![
                Rule::always(vec![Effect::arg("--with-zlib={dep:zlib}")]),
                Rule::new(
                    Condition::Enabled("fast"),
                    vec![
                        Effect::arg("--enable-fast"),
                        Effect::append_flags("CFLAGS", "-O3"),
                    ],
                ),
                Rule::new(
                    Condition::NotEquals("mode", "none"),
                    vec![Effect::arg("--mode={variant:mode}")],
                ),
                Rule::always(vec![Effect::set_env("TOY_HOME", "{prefix}/share/{{toy}}")]),
            ]
        }

        fn configure(&self, _spec: &Spec, args: &[String]) -> Result<Option<CommandLine>, SpecError> {
            Ok(Some(CommandLine::new("./configure", args.iter().cloned())))
        }
    }

    fn input(variants: &[(&str, VariantValue)]) -> SpecInput {
        let mut dependencies = BTreeMap::new();
        dependencies.insert(
            "zlib".to_string(),
            DependencyInput {
                prefix: "/opt/zlib".into(),
                version: None,
            },
        );
        SpecInput {
            recipe: "toy".to_string(),
            version: "1.0".to_string(),
            prefix: "/opt/toy".into(),
            compiler: CompilerInfo {
                name: "gcc".to_string(),
                version: None,
            },
            variants: variants
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            dependencies,
        }
    }

    #[test]
    fn defaults_emit_only_unconditional_rules() {
        let toy = Toy::new();
        let spec = resolve(&toy, input(&[])).unwrap();
        let flags = build_flags(&toy, &spec).unwrap();
        assert_eq!(flags.args, vec!["--with-zlib=/opt/zlib"]);
        assert_eq!(
            flags.env,
            vec![EnvMutation::set("TOY_HOME", "/opt/toy/share/{toy}")]
        );
    }

    #[test]
    fn rules_apply_in_table_order() {
        let toy = Toy::new();
        let spec = resolve(
            &toy,
            input(&[
                ("mode", VariantValue::text("read")),
                ("fast", VariantValue::Bool(true)),
            ]),
        )
        .unwrap();
        let flags = build_flags(&toy, &spec).unwrap();
        assert_eq!(
            flags.args,
            vec!["--with-zlib=/opt/zlib", "--enable-fast", "--mode=read"]
        );
        assert_eq!(flags.env[0], EnvMutation::append_flags("CFLAGS", "-O3"));
    }

    #[test]
    fn unknown_placeholder_is_reported() {
        let toy = Toy::new();
        let spec = resolve(&toy, input(&[])).unwrap();
        let err = Template::new("--x={nope}").render(&spec).unwrap_err();
        assert_eq!(
            err.to_string(),
            "template '--x={nope}': unknown placeholder '{nope}'"
        );
        assert!(Template::new("--x={dep:zlib").render(&spec).is_err());
        assert!(Template::new("a}b").render(&spec).is_err());
    }

    #[test]
    fn missing_dependency_placeholder_is_a_spec_error() {
        let toy = Toy::new();
        let spec = resolve(&toy, input(&[])).unwrap();
        let err = Template::new("{dep:hdf5}").render(&spec).unwrap_err();
        assert!(matches!(err, SpecError::MissingDependency { .. }));
    }
}
