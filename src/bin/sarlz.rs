#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use sarlz::cli::args::CliArgs;
use sarlz::cli::{driver, reporter::Reporter};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DIAGNOSTICS_PRESENT: i32 = 1;

fn main() -> Result<()> {
    // SARLZ_LOG / SARLZ_LOG_FORMAT, see src/tracing_config.rs.
    sarlz::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    let outcome = driver::run(&args, &cwd)?;
    if !outcome.output.is_empty() {
        print!("{}", outcome.output);
        if !outcome.output.ends_with('\n') {
            println!();
        }
    }

    if !outcome.diagnostics.is_empty() {
        let reporter = Reporter::new(!args.no_color && std::io::stderr().is_terminal());
        eprintln!("{}", reporter.render(&outcome.diagnostics));
        if let Some(summary) = reporter.summary(&outcome.diagnostics) {
            eprintln!("\n{summary}");
        }
    }

    std::process::exit(if outcome.has_errors() {
        EXIT_DIAGNOSTICS_PRESENT
    } else {
        EXIT_SUCCESS
    });
}
