use super::CliError;
use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tau_trigger_core::{
    CalibrationBundle, TauCandidate, TriggerConfig, TriggerEfficiencyEvaluator, TriggerSfError,
};

/// Flags shared by every subcommand that resolves a configuration.
#[derive(clap::Args, Debug, Clone)]
pub(super) struct ConfigArgs {
    /// Calibration bundle (JSON)
    #[arg(long)]
    pub(super) bundle: PathBuf,

    /// Trigger type: ditau, mutau or etau
    #[arg(long)]
    pub(super) trigger: String,

    /// Data-taking year
    #[arg(long, default_value_t = 2017)]
    pub(super) year: u32,

    /// Tau identification working point
    #[arg(long, default_value = "medium")]
    pub(super) working_point: String,

    /// Tau identification family
    #[arg(long, default_value = "MVAv2")]
    pub(super) id_family: String,
}

impl ConfigArgs {
    pub(super) fn to_config(&self) -> Result<TriggerConfig, CliError> {
        let config = TriggerConfig::from_labels(
            &self.trigger,
            self.year,
            &self.working_point,
            &self.id_family,
        )?;
        Ok(config)
    }
}

pub(super) fn load_bundle(path: &Path) -> Result<CalibrationBundle, CliError> {
    Ok(CalibrationBundle::load(path)?)
}

pub(super) fn load_evaluator(args: &ConfigArgs) -> Result<TriggerEfficiencyEvaluator, CliError> {
    let config = args.to_config()?;
    let bundle = load_bundle(&args.bundle)?;
    Ok(TriggerEfficiencyEvaluator::from_bundle(config, &bundle)?)
}

pub(super) fn read_candidates(path: &Path) -> Result<Vec<TauCandidate>, CliError> {
    let source = fs::read_to_string(path).map_err(|source| TriggerSfError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let candidates = serde_json::from_str(&source).map_err(|source| TriggerSfError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(candidates)
}

pub(super) fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    let rendered =
        serde_json::to_string_pretty(value).context("failed to serialize command output")?;
    Ok(rendered)
}

/// Writes to `output` when given, stdout otherwise.
pub(super) fn emit(rendered: &str, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            let write_error = |source| CliError::Write {
                path: path.to_path_buf(),
                source,
            };
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(write_error)?;
                }
            }
            fs::write(path, format!("{rendered}\n")).map_err(write_error)?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
