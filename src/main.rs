use std::process::ExitCode;

use clap::Parser;
use rdf_validation::{CliArgs, LoggingConfig, ValidateConfig, init_logging, run_cli};

/// Load or configuration failure.
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let _guard = match init_logging(LoggingConfig::from_env()) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let outcome = ValidateConfig::from_args(cli).and_then(run_cli);

    match outcome {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "validation aborted");
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
