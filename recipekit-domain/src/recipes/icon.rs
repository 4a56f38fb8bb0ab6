use crate::condition::Condition;
use crate::error::SpecError;
use crate::recipe::{Conflict, DependencyDecl, Recipe, RecipeMeta, VersionDecl, VersionSource};
use crate::rules::{Effect, Rule};
use crate::scheduler::SubmitProfile;
use crate::selector::select_config_file;
use crate::spec::Spec;
use crate::template::Template;
use crate::variant::VariantDecl;
use camino::{Utf8Path, Utf8PathBuf};
use recipekit_types::plan::{
    CommandLine, PlannedEdit, PlannedSubstitution, PlannedTest, TestStage, TestStep,
};
use recipekit_types::spec::LinkType;

const BUILD_LINK_RUN: &[LinkType] = &[LinkType::Build, LinkType::Link, LinkType::Run];

const ECHAM_NAMELISTS_DIR: &str = "externals/atm_phy_echam_submodels/namelists";
const HAMMOZ_INPUT_ROOT: &str = "/store/c2sm/c2sme/input_gcm/icon/input_hammoz/";

/// Config file lines rewritten in the edit phase, in this order.
fn substitutions() -> [(Condition, &'static str, Template); 4] {
    [
        (
            Condition::Always,
            "XML2_ROOT=.*",
            Template::new("XML2_ROOT='{dep:libxml2}'"),
        ),
        (
            Condition::Always,
            "SERIALBOX2_ROOT=.*",
            Template::new("SERIALBOX2_ROOT='{dep:serialbox}'"),
        ),
        (
            Condition::Always,
            "SB2PP=.*",
            Template::new(r#"SB2PP="python2 {dep:serialbox}/python/pp_ser/pp_ser.py" \"#),
        ),
        (
            Condition::Enabled("claw"),
            "CLAW='.*",
            Template::new("CLAW='{dep:claw}/bin/clawfc'"),
        ),
    ]
}

/// The ICON weather and climate model.
pub struct Icon {
    meta: RecipeMeta,
}

impl Icon {
    pub fn new() -> Self {
        Self {
            meta: RecipeMeta {
                name: "icon",
                description: "The ICON modelling framework, a joint project of DWD and MPI-M \
                              for a unified next-generation global numerical weather \
                              prediction and climate modelling system.",
                homepage: "https://gitlab.dkrz.de/icon/icon",
                git: "git@gitlab.dkrz.de:icon/icon.git",
                maintainers: &["egermann"],
                versions: vec![
                    VersionDecl {
                        name: "master",
                        source: VersionSource::Branch("master"),
                        submodules: true,
                    },
                    VersionDecl {
                        name: "ham",
                        source: VersionSource::ForkBranch {
                            git: "git@git.iac.ethz.ch:hammoz/icon-hammoz.git",
                            branch: "hammoz/gpu/master",
                        },
                        submodules: true,
                    },
                    VersionDecl {
                        name: "2.6.x-rc",
                        source: VersionSource::Commit("040de650"),
                        submodules: true,
                    },
                    VersionDecl {
                        name: "2.0.17",
                        source: VersionSource::Commit("39ed04ad"),
                        submodules: true,
                    },
                ],
                variants: vec![
                    VariantDecl::one_of(
                        "icon_target",
                        &["gpu", "cpu"],
                        "gpu",
                        "Build with target gpu or cpu",
                    ),
                    VariantDecl::one_of(
                        "host",
                        &["tsa", "daint"],
                        "daint",
                        "Build on described host (e.g daint)",
                    ),
                    VariantDecl::free("site", "cscs", "Build on described site (e.g cscs)"),
                    VariantDecl::boolean("claw", true, "Build with claw directories enabled"),
                    VariantDecl::boolean("rte-rrtmgp", true, "Build with rte-rrtmgp enabled"),
                    VariantDecl::boolean("mpi-checks", false, "Build with mpi-check enabled"),
                    VariantDecl::boolean("openmp", true, "Build with openmp enabled"),
                    VariantDecl::one_of(
                        "serialize_mode",
                        &["none", "create", "read", "perturb"],
                        "none",
                        "Build with serialization, with serialize_mode enabled",
                    ),
                    VariantDecl::boolean("eccodes", false, "Build with grib2 enabled"),
                    VariantDecl::free(
                        "test_name",
                        "none",
                        "Launch test: test_name after installation",
                    ),
                    VariantDecl::boolean("skip-config", false, "Skip configure phase"),
                    VariantDecl::free(
                        "config_dir",
                        ".",
                        "Enable out-of-source build by describing config_dir",
                    ),
                    VariantDecl::boolean(
                        "ham",
                        false,
                        "Build with hammoz and atm_phy_echam enabled.",
                    ),
                ],
                dependencies: vec![
                    DependencyDecl {
                        name: "cmake",
                        constraint: "%gcc",
                        link_types: &[LinkType::Build, LinkType::Link],
                        when: Condition::Always,
                    },
                    DependencyDecl {
                        name: "libxml2",
                        constraint: "@2.9.7%gcc",
                        link_types: BUILD_LINK_RUN,
                        when: Condition::Always,
                    },
                    DependencyDecl {
                        name: "serialbox",
                        constraint: "@2.4.3",
                        link_types: BUILD_LINK_RUN,
                        when: Condition::Always,
                    },
                    DependencyDecl {
                        name: "eccodes",
                        constraint: "@2.18.0 +build_shared_libs",
                        link_types: BUILD_LINK_RUN,
                        when: Condition::Enabled("eccodes"),
                    },
                    DependencyDecl {
                        name: "claw",
                        constraint: "@2.0.1",
                        link_types: BUILD_LINK_RUN,
                        when: Condition::Enabled("claw"),
                    },
                ],
                conflicts: vec![
                    Conflict {
                        spec: Condition::Enabled("claw"),
                        when: Condition::Compiler("intel"),
                    },
                    Conflict {
                        spec: Condition::Enabled("claw"),
                        when: Condition::Compiler("cce"),
                    },
                    Conflict {
                        spec: Condition::Equals("icon_target", "gpu"),
                        when: Condition::Compiler("intel"),
                    },
                    Conflict {
                        spec: Condition::Equals("icon_target", "gpu"),
                        when: Condition::Compiler("cce"),
                    },
                ],
            },
        }
    }

    fn config_dir(spec: &Spec) -> Result<&Utf8Path, SpecError> {
        spec.variant_str("config_dir").map(Utf8Path::new)
    }

    fn test_name(spec: &Spec) -> Result<Option<&str>, SpecError> {
        let name = spec.variant_str("test_name")?;
        Ok((name != "none").then_some(name))
    }
}

impl Default for Icon {
    fn default() -> Self {
        Self::new()
    }
}

impl Recipe for Icon {
    fn meta(&self) -> &RecipeMeta {
        &self.meta
    }

    fn rules(&self) -> Vec<Rule> {
        vec![
            Rule::new(
                Condition::Enabled("ham"),
                vec![
                    Effect::arg("--enable-atm-phy-echam-submodels"),
                    Effect::arg("--enable-hammoz"),
                ],
            ),
            Rule::new(
                Condition::Disabled("openmp"),
                vec![Effect::arg("--disable-openmp")],
            ),
            Rule::new(
                Condition::NotEquals("serialize_mode", "none"),
                vec![Effect::arg("--enable-serialization={variant:serialize_mode}")],
            ),
        ]
    }

    fn config_file(&self, spec: &Spec) -> Result<Option<Utf8PathBuf>, SpecError> {
        Ok(Some(select_config_file(
            Self::config_dir(spec)?,
            spec.variant_str("site")?,
            spec.variant_str("host")?,
            spec.variant_str("icon_target")?,
            &spec.compiler().name,
        )))
    }

    fn edits(&self, spec: &Spec) -> Result<Vec<PlannedEdit>, SpecError> {
        if spec.enabled("skip-config") {
            return Ok(vec![]);
        }
        let Some(path) = self.config_file(spec)? else {
            return Ok(vec![]);
        };

        let mut planned = Vec::new();
        for (when, pattern, replacement) in substitutions() {
            if !when.holds(spec) {
                continue;
            }
            planned.push(PlannedSubstitution {
                pattern: pattern.to_string(),
                replacement: replacement.render(spec)?,
            });
        }

        Ok(vec![PlannedEdit {
            path: path.to_string(),
            substitutions: planned,
        }])
    }

    fn pre_configure(&self, spec: &Spec) -> Result<Vec<CommandLine>, SpecError> {
        if !Condition::Version("ham").holds(spec) {
            return Ok(vec![]);
        }
        let dir = Self::config_dir(spec)?.join(ECHAM_NAMELISTS_DIR);
        Ok(vec![
            CommandLine::new("make", Vec::<String>::new()).in_dir(dir.as_str()),
        ])
    }

    fn configure(&self, spec: &Spec, args: &[String]) -> Result<Option<CommandLine>, SpecError> {
        if spec.enabled("skip-config") {
            return Ok(None);
        }
        let Some(path) = self.config_file(spec)? else {
            return Ok(None);
        };
        let mut all = vec![format!("--prefix={}", spec.prefix())];
        all.extend(args.iter().cloned());
        Ok(Some(CommandLine::new(path.as_str(), all)))
    }

    fn test(&self, spec: &Spec, time_limit: &str) -> Result<Option<PlannedTest>, SpecError> {
        let Some(name) = Self::test_name(spec)? else {
            return Ok(None);
        };

        let mut runscripts = CommandLine::new("./make_runscripts", ["-s", name]);
        if Condition::Version("ham").holds(spec) {
            runscripts = runscripts.with_env("indata_hammoz_root", HAMMOZ_INPUT_ROOT);
        }

        let profile = SubmitProfile::for_host(spec.variant_str("host")?)?;
        let submit = profile
            .sbatch(time_limit, &format!("exp.{name}.run"))
            .in_dir("run");

        Ok(Some(PlannedTest {
            name: name.to_string(),
            steps: vec![
                TestStep::Command {
                    stage: TestStage::Runscripts,
                    command: runscripts,
                },
                TestStep::Command {
                    stage: TestStage::Submit,
                    command: submit,
                },
                TestStep::StatusFile {
                    path: format!("experiments/{name}/finish.status"),
                    token: "OK".to_string(),
                },
            ],
        }))
    }
}
