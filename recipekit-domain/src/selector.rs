//! Config file selection: `<config_dir>/config/<site>/<host>.<target>.<suffix>`.

use camino::{Utf8Path, Utf8PathBuf};

/// Config file suffix for a compiler. Two families are spelled differently
/// in the config tree; everything else uses the compiler name.
pub fn compiler_suffix(compiler: &str) -> &str {
    match compiler {
        "gcc" => "gnu",
        "cce" => "cray",
        other => other,
    }
}

pub fn config_file_name(host: &str, target: &str, compiler: &str) -> String {
    format!("{host}.{target}.{}", compiler_suffix(compiler))
}

/// Path of the externally maintained config file. Existence is not checked.
pub fn select_config_file(
    config_dir: &Utf8Path,
    site: &str,
    host: &str,
    target: &str,
    compiler: &str,
) -> Utf8PathBuf {
    config_dir
        .join("config")
        .join(site)
        .join(config_file_name(host, target, compiler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaps_gcc_and_cce() {
        assert_eq!(compiler_suffix("gcc"), "gnu");
        assert_eq!(compiler_suffix("cce"), "cray");
        assert_eq!(compiler_suffix("pgi"), "pgi");
        assert_eq!(compiler_suffix("intel"), "intel");
    }

    #[test]
    fn daint_gpu_gcc_selects_gnu_file() {
        let path = select_config_file(Utf8Path::new("."), "cscs", "daint", "gpu", "gcc");
        assert_eq!(path.as_str(), "./config/cscs/daint.gpu.gnu");
    }

    #[test]
    fn out_of_source_config_dir_is_prefixed() {
        let path = select_config_file(Utf8Path::new("/src/icon"), "cscs", "tsa", "cpu", "pgi");
        assert_eq!(path.as_str(), "/src/icon/config/cscs/tsa.cpu.pgi");
    }
}
