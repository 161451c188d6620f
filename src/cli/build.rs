use super::Commands;
use colored::Colorize;
use nginx_conf_parser::builder::{self, PrettyOptions};
use nginx_conf_parser::parser::ParseOptions;
use nginx_conf_parser::{parse_file, ParseError};
use std::path::Path;
use std::process::ExitCode;

pub fn run_build(command: Commands) -> ExitCode {
    let Commands::Build { file, pretty, indent, tabs } = command else {
        unreachable!("run_build called with a non-Build command");
    };

    let options = ParseOptions::default();
    let outcome = match parse_file(&file, &options) {
        Ok(outcome) => outcome,
        Err(e) => return report_parse_error(&file, &e),
    };

    let text = if pretty {
        builder::build_pretty(&outcome.config, &PrettyOptions { indent_width: indent, use_tabs: tabs })
    } else {
        builder::build_faithful(&outcome.config)
    };
    print!("{text}");
    ExitCode::SUCCESS
}

pub fn run_format(command: Commands) -> ExitCode {
    let Commands::Format { file, indent, tabs, check } = command else {
        unreachable!("run_format called with a non-Format command");
    };

    let options = ParseOptions::default();
    let outcome = match parse_file(&file, &options) {
        Ok(outcome) => outcome,
        Err(e) => return report_parse_error(&file, &e),
    };

    let formatted = builder::build_pretty(&outcome.config, &PrettyOptions { indent_width: indent, use_tabs: tabs });

    if check {
        print!("{formatted}");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = std::fs::write(&file, &formatted) {
        eprintln!("{} could not write {}: {e}", "error:".red().bold(), file.display());
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}

pub fn run_minify(command: Commands) -> ExitCode {
    let Commands::Minify { file } = command else {
        unreachable!("run_minify called with a non-Minify command");
    };

    let options = ParseOptions { comments: false, ..ParseOptions::default() };
    let outcome = match parse_file(&file, &options) {
        Ok(outcome) => outcome,
        Err(e) => return report_parse_error(&file, &e),
    };

    let minified = builder::build_pretty(&outcome.config, &PrettyOptions { indent_width: 0, use_tabs: false });
    print!("{minified}");
    ExitCode::SUCCESS
}

fn report_parse_error(file: &Path, error: &ParseError) -> ExitCode {
    eprintln!("{} {}: {error}", "error:".red().bold(), file.display());
    ExitCode::from(1)
}
