//! Chassis CLI: run, assemble, disassemble and explain.
//!
//! Exit codes:
//! - `run`: r0 on halt, the fault code (1-6) on a fault
//! - 0: Success for the other commands
//! - 64: Usage, input or assembly error

mod cli;
mod commands;

use clap::error::ErrorKind;
use clap::Parser;
use cli::{Cli, CliCommand};
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Exit status for usage and input errors.
pub const EXIT_USAGE: i32 = 64;

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    // Only fails if a subscriber is already installed.
    let _ = Registry::default().with(filter).with(fmt_layer).try_init();
}

fn main() {
    setup_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    let result = match cli.command {
        CliCommand::Run(args) => commands::run(&args),
        CliCommand::Assemble { input, output } => {
            commands::assemble(&input, output.as_deref()).map(|()| 0)
        }
        CliCommand::Disassemble { input } => commands::disassemble(&input).map(|()| 0),
        CliCommand::Explain { code } => commands::explain(code).map(|()| 0),
    };

    match result {
        Ok(code) | Err(code) => process::exit(code),
    }
}
