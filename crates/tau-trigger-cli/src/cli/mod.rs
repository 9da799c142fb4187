mod commands;
mod helpers;

use clap::Parser;
use std::path::PathBuf;
use tau_trigger_core::{ErrorCategory, TriggerSfError};
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();

    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error.diagnostic_line());
            error.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_logging(cli.log_level);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: tracing::Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "tau-trigger-sf",
    version,
    about = "Tau trigger efficiencies and data/MC scale factors"
)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Evaluate efficiencies and scale factors for a single tau
    Eval(commands::EvalArgs),
    /// Evaluate a JSON array of tau candidates
    Batch(commands::BatchArgs),
    /// Report calibration tables missing from a bundle
    Check(commands::CheckArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Eval(args) => commands::run_eval_command(args),
        CliCommand::Batch(args) => commands::run_batch_command(args),
        CliCommand::Check(args) => commands::run_check_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Core(#[from] TriggerSfError),
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Usage(_) => ErrorCategory::InputValidationError,
            Self::Core(error) => error.category(),
            Self::Write { .. } => ErrorCategory::IoSystemError,
            Self::Internal(_) => ErrorCategory::InternalError,
        }
    }

    fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    fn diagnostic_line(&self) -> String {
        match self {
            Self::Core(error) => error.diagnostic_line(),
            Self::Usage(message) => format!(
                "ERROR: [{}] {}",
                self.category().as_str(),
                message.trim_end()
            ),
            Self::Write { .. } => format!("ERROR: [{}] {self}", self.category().as_str()),
            Self::Internal(error) => {
                format!("ERROR: [{}] {error:#}", self.category().as_str())
            }
        }
    }
}
