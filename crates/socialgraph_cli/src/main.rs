//! Shell entry point for the social graph API.
//!
//! Prints every successful response as JSON on stdout. Failures exit
//! non-zero with the `code: message` error on stderr.

use clap::Parser;

mod cli;
mod commands;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    commands::run_command(cli)
}
