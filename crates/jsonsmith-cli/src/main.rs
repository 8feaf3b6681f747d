mod args;
mod error;
mod logging;
mod run;
mod settings;

use std::process::ExitCode;

use clap::Parser;

use args::{Cli, Command};
use error::CliResult;
use logging::init_logging;
use run::{RunPlan, run_generate, run_validate};
use settings::load_settings;

fn main() -> ExitCode {
    match execute(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> CliResult<()> {
    let settings = load_settings(cli.config.as_deref())?;
    let log_format = cli.log_format.or(settings.log_format).unwrap_or_default();
    init_logging(cli.verbose, log_format, cli.log_file.as_deref())?;

    match cli.command {
        Command::Generate(args) => run_generate(RunPlan::resolve(args, settings)),
        Command::Validate(args) => run_validate(args),
    }
}
