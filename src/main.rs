mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use colored::control;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.color {
        control::set_override(true);
    } else if cli.no_color {
        control::set_override(false);
    }

    match cli.command {
        command @ Commands::Parse { .. } => cli::parse::run(command),
        command @ Commands::Build { .. } => cli::build::run_build(command),
        command @ Commands::Format { .. } => cli::build::run_format(command),
        command @ Commands::Minify { .. } => cli::build::run_minify(command),
        command @ Commands::Lex { .. } => cli::lex::run(command),
    }
}
