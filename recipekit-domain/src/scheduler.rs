use crate::error::SpecError;
use recipekit_types::plan::CommandLine;

/// Slurm submission parameters for one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitProfile {
    pub account: Option<&'static str>,
    pub constraint: Option<&'static str>,
    pub partition: &'static str,
}

impl SubmitProfile {
    pub fn for_host(host: &str) -> Result<Self, SpecError> {
        match host {
            "daint" => Ok(Self {
                account: Some("g110"),
                constraint: Some("gpu"),
                partition: "debug",
            }),
            "tsa" => Ok(Self {
                account: None,
                constraint: None,
                partition: "debug",
            }),
            other => Err(SpecError::UnknownHost {
                host: other.to_string(),
            }),
        }
    }

    /// `sbatch -W` blocks until the job has finished.
    pub fn sbatch(&self, time_limit: &str, script: &str) -> CommandLine {
        let mut args = vec!["-W".to_string(), format!("--time={time_limit}")];
        if let Some(account) = self.account {
            args.push("-A".to_string());
            args.push(account.to_string());
        }
        if let Some(constraint) = self.constraint {
            args.push("-C".to_string());
            args.push(constraint.to_string());
        }
        args.push("-p".to_string());
        args.push(self.partition.to_string());
        args.push(script.to_string());
        CommandLine::new("sbatch", args)
    }
}
