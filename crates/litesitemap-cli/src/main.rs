//! litesitemap CLI entry point.

use std::process::ExitCode;

use colored::Colorize;
use litesitemap_cli::error::{CliError, exit_code_from_error};

fn main() -> ExitCode {
    match litesitemap_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = err
                .downcast_ref::<CliError>()
                .map_or_else(|| format!("{err:#}"), ToString::to_string);
            eprintln!("{} {message}", "error:".red().bold());
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
