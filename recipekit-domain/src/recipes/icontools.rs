use crate::condition::Condition;
use crate::error::SpecError;
use crate::recipe::{DependencyDecl, Recipe, RecipeMeta, VersionDecl, VersionSource};
use crate::rules::{Effect, Rule};
use crate::scheduler::SubmitProfile;
use crate::spec::Spec;
use crate::variant::VariantDecl;
use recipekit_types::plan::{CommandLine, PlannedTest, TestStage, TestStep};
use recipekit_types::spec::LinkType;

const BUILD: &[LinkType] = &[LinkType::Build];
const BUILD_LINK: &[LinkType] = &[LinkType::Build, LinkType::Link];
const BUILD_LINK_RUN: &[LinkType] = &[LinkType::Build, LinkType::Link, LinkType::Run];

const TEST_SCRIPT: &str = "./C2SM-scripts/test/jenkins/test.sh";
const TEST_LOG: &str = "job.out";

/// DWD ICON tools: preparation of ICON input files (boundary and initial
/// conditions, grids, remapping).
pub struct IconTools {
    meta: RecipeMeta,
}

impl IconTools {
    pub fn new() -> Self {
        let dep = |name, constraint, link_types| DependencyDecl {
            name,
            constraint,
            link_types,
            when: Condition::Always,
        };

        Self {
            meta: RecipeMeta {
                name: "icontools",
                description: "DWD ICON Tools for C2SM members. Set of tools to prepare the \
                              input files (boundary condition, initial condition, ...) for ICON.",
                homepage: "https://wiki.c2sm.ethz.ch/MODELS/ICONDwdIconTools",
                git: "git@github.com:C2SM/dwd_icon_tools.git",
                maintainers: &["jonasjucker"],
                versions: vec![
                    VersionDecl {
                        name: "master",
                        source: VersionSource::Branch("master"),
                        submodules: false,
                    },
                    VersionDecl {
                        name: "dev-build",
                        source: VersionSource::Branch("master"),
                        submodules: false,
                    },
                ],
                variants: vec![VariantDecl::one_of(
                    "slave",
                    &["tsa", "daint"],
                    "daint",
                    "Build on described slave (e.g daint)",
                )],
                dependencies: vec![
                    dep("autoconf", "", BUILD),
                    dep("automake", "", BUILD),
                    dep("libtool", "", BUILD),
                    dep("m4", "", BUILD),
                    DependencyDecl {
                        name: "cray-libsci",
                        constraint: "%cce",
                        link_types: BUILD_LINK,
                        when: Condition::Equals("slave", "daint"),
                    },
                    dep("netcdf-fortran", "~mpi", BUILD_LINK),
                    dep("netcdf-c", "~mpi", BUILD_LINK),
                    dep("hdf5", "~mpi +hl", BUILD_LINK),
                    dep("mpi", "", BUILD_LINK_RUN),
                    dep("eccodes", "~aec", BUILD_LINK_RUN),
                    dep("jasper", "@1.900.1%gcc ~shared", BUILD_LINK),
                ],
                conflicts: vec![],
            },
        }
    }
}

impl Default for IconTools {
    fn default() -> Self {
        Self::new()
    }
}

impl Recipe for IconTools {
    fn meta(&self) -> &RecipeMeta {
        &self.meta
    }

    fn rules(&self) -> Vec<Rule> {
        let cflags = |v| Effect::append_flags("CFLAGS", v);
        let cxxflags = |v| Effect::append_flags("CXXFLAGS", v);
        let fcflags = |v| Effect::append_flags("FCFLAGS", v);
        let libs = |v| Effect::append_flags("LIBS", v);

        vec![
            Rule::always(vec![
                Effect::arg("acx_cv_fc_ftn_include_flag=-I"),
                Effect::arg("acx_cv_fc_pp_include_flag=-I"),
                Effect::arg("--disable-silent-rules"),
                Effect::arg("--disable-shared"),
                Effect::arg("--with-netcdf={dep:netcdf-fortran}"),
                Effect::arg("--enable-iso-c-interface"),
                Effect::arg("--enable-grib2"),
                Effect::arg("--with-eccodes={dep:eccodes}"),
            ]),
            // cray modules do not export the netcdf location on daint
            Rule::new(
                Condition::Equals("slave", "daint"),
                vec![Effect::set_env("NETCDF_DIR", "{dep:netcdf-c}")],
            ),
            Rule::always(vec![
                cflags("-O2"),
                cflags("-g"),
                cflags("-Wunused"),
                cflags("-DHAVE_LIBNETCDF"),
                cflags("-DHAVE_NETCDF4"),
                cflags("-DHAVE_CF_INTERFACE"),
                cflags("-DHAVE_LIBGRIB_API"),
                cflags("-D__ICON__"),
                cflags("-DNOMPI"),
                cxxflags("-O2"),
                cxxflags("-g"),
                cxxflags("-fopenmp"),
                cxxflags("-Wunused"),
                cxxflags("-DNOMPI"),
                fcflags("-O2"),
                fcflags("-g"),
                fcflags("-cpp"),
                fcflags("-Wunused"),
                fcflags("-DNOMPI"),
                libs("-lhdf5"),
            ]),
            Rule::new(
                Condition::Equals("slave", "daint"),
                vec![libs("-lsci_cray")],
            ),
            // jasper must link after eccodes
            Rule::always(vec![
                libs("-leccodes"),
                libs("-leccodes_f90"),
                libs("-ljasper"),
            ]),
            Rule::new(Condition::Equals("slave", "tsa"), vec![libs("-lgfortran")]),
        ]
    }

    fn configure(&self, spec: &Spec, args: &[String]) -> Result<Option<CommandLine>, SpecError> {
        let mut all = vec![format!("--prefix={}", spec.prefix())];
        all.extend(args.iter().cloned());
        Ok(Some(CommandLine::new("./configure", all)))
    }

    fn test(&self, spec: &Spec, time_limit: &str) -> Result<Option<PlannedTest>, SpecError> {
        let profile = SubmitProfile::for_host(spec.variant_str("slave")?)?;
        Ok(Some(PlannedTest {
            name: "jenkins".to_string(),
            steps: vec![
                TestStep::Command {
                    stage: TestStage::Submit,
                    command: profile.sbatch(time_limit, TEST_SCRIPT),
                },
                TestStep::EchoLog {
                    path: TEST_LOG.to_string(),
                },
            ],
        }))
    }
}
