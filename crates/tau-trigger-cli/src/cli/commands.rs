use super::CliError;
use super::helpers::*;
use serde::Serialize;
use std::path::PathBuf;
use tau_trigger_core::{TauCandidate, TriggerWeights};

#[derive(clap::Args)]
pub(super) struct EvalArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Tau transverse momentum in GeV
    #[arg(long)]
    pt: f64,

    /// Tau pseudorapidity
    #[arg(long, allow_negative_numbers = true)]
    eta: f64,

    /// Tau azimuthal angle
    #[arg(long, allow_negative_numbers = true)]
    phi: f64,

    /// Reconstructed decay mode (0, 1, 2 or 10)
    #[arg(long)]
    decay_mode: i32,
}

#[derive(clap::Args)]
pub(super) struct BatchArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// JSON array of `{pt, eta, phi, decay_mode}` candidates
    #[arg(long)]
    input: PathBuf,

    /// Output path; results go to stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct CheckArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Debug, Serialize)]
struct BatchRecord {
    pt: f64,
    eta: f64,
    phi: f64,
    #[serde(flatten)]
    weights: TriggerWeights,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    configuration: String,
    year: u32,
    complete: bool,
    missing: Vec<String>,
}

pub(super) fn run_eval_command(args: EvalArgs) -> Result<i32, CliError> {
    let evaluator = load_evaluator(&args.config)?;
    let candidate = TauCandidate::new(args.pt, args.eta, args.phi, args.decay_mode);
    let weights = evaluator.evaluate(&candidate)?;
    emit(&render_json(&weights)?, None)?;
    Ok(0)
}

pub(super) fn run_batch_command(args: BatchArgs) -> Result<i32, CliError> {
    let evaluator = load_evaluator(&args.config)?;
    let candidates = read_candidates(&args.input)?;
    tracing::info!(
        count = candidates.len(),
        input = %args.input.display(),
        "evaluating tau candidates"
    );

    let records = candidates
        .iter()
        .map(|candidate| {
            evaluator.evaluate(candidate).map(|weights| BatchRecord {
                pt: candidate.pt,
                eta: candidate.eta,
                phi: candidate.phi,
                weights,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    emit(&render_json(&records)?, args.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_check_command(args: CheckArgs) -> Result<i32, CliError> {
    let config = args.config.to_config()?;
    let bundle = load_bundle(&args.config.bundle)?;
    let missing = bundle.missing_tables(&config);
    let complete = missing.is_empty();
    if complete {
        // Surfaces kind mismatches and year conflicts in a complete bundle.
        bundle.tables_for(&config)?;
    } else {
        tracing::warn!(
            configuration = %config,
            missing = missing.len(),
            "calibration bundle is incomplete"
        );
    }

    let report = CheckReport {
        configuration: config.table_prefix(),
        year: config.year,
        complete,
        missing,
    };
    emit(&render_json(&report)?, None)?;
    Ok(if complete { 0 } else { 1 })
}
