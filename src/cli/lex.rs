use super::Commands;
use colored::Colorize;
use nginx_conf_parser::builder::lex_dump;
use std::process::ExitCode;

pub fn run(command: Commands) -> ExitCode {
    let Commands::Lex { file } = command else {
        unreachable!("run_lex called with a non-Lex command");
    };

    let source = match std::fs::read_to_string(&file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{} could not read {}: {e}", "error:".red().bold(), file.display());
            return ExitCode::from(2);
        }
    };

    match lex_dump(&source) {
        Ok(dump) => {
            print!("{dump}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {}: {e}", "error:".red().bold(), file.display());
            ExitCode::from(1)
        }
    }
}
