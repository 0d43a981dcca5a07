//! threedmake CLI entry point.

use std::error::Error as _;
use std::process::ExitCode;

use clap::Parser;
use threedmake::cli::{Cli, Driver};
use threedmake::runner::install_handler;
use threedmake::{ui, MakeError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
///
/// Logs go to stderr so they never mix into step output.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("threedmake=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("threedmake=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn report(error: &MakeError, debug: bool) {
    if debug {
        eprintln!("{}", ui::error_line(&error.to_string()));
        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        eprintln!("{:?}", error);
    } else {
        eprintln!("{}", ui::error_line(&error.to_string()));
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    install_handler();

    tracing::debug!("threedmake starting with args: {:?}", cli);

    let (result, debug) = match Driver::from_env() {
        Ok(driver) => driver.run_with_debug(&cli),
        Err(e) => (Err(e), cli.debug),
    };
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(MakeError::Interrupted) => ExitCode::from(MakeError::Interrupted.exit_code()),
        Err(e) => {
            report(&e, debug);
            ExitCode::from(e.exit_code())
        }
    }
}
