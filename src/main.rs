use clap::Parser;
use pvectl::cli::{self, Cli, Outcome, error::EXIT_FAILURE, output::print_error};
use std::process::ExitCode;

/// Environment variable with a `tracing` filter directive, e.g. `pvectl=debug`.
const LOG_ENV: &str = "PVECTL_LOG";

/// Logs go to stderr so that stdout stays machine readable. `-v` and `-vv`
/// take precedence over `PVECTL_LOG`.
fn install_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter_layer = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(err.exit_code() as u8);
        }
    };
    install_tracing(cli.verbose);

    match cli::run(cli).await {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Failure) => ExitCode::from(EXIT_FAILURE),
        Err(err) => {
            print_error(&err.to_string());
            ExitCode::from(err.exit_code())
        }
    }
}
