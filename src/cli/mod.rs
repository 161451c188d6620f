pub mod build;
pub mod lex;
pub mod parse;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nginx-conf")]
#[command(author, version, about = "Translate nginx configuration files to and from a structured tree", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Force colored diagnostics
    #[arg(long, global = true, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored diagnostics
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a file (and any files it `include`s) into JSON
    Parse {
        /// Path to the root configuration file, or `-` for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stop at the first error instead of recording it and resuming at
        /// the next statement boundary
        #[arg(long)]
        no_catch: bool,

        /// Do not follow `include` directives; keep their argument verbatim
        #[arg(long = "single-file")]
        single: bool,

        /// Reject directive names absent from the catalog
        #[arg(long)]
        strict: bool,

        /// Skip the context-legality check
        #[arg(long)]
        no_check_ctx: bool,

        /// Skip the argument-count/shape check
        #[arg(long)]
        no_check_args: bool,

        /// Comma-separated directive names to exempt from catalog checks
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,

        /// Emit comment tokens as `#` directives in the resulting tree
        #[arg(long)]
        include_comments: bool,

        /// Concatenate all visited files into one synthetic file, eliding
        /// `include` directives
        #[arg(long)]
        combine: bool,

        /// Pretty-print the JSON payload
        #[arg(long)]
        pretty: bool,
    },
    /// Reconstruct configuration source from a file's parsed tree
    Build {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Re-indent uniformly and apply canonical argument quoting instead
        /// of replaying the original whitespace exactly
        #[arg(long)]
        pretty: bool,

        /// Indent width in spaces (pretty mode only)
        #[arg(long, default_value_t = 4)]
        indent: usize,

        /// Indent with tabs instead of spaces (pretty mode only)
        #[arg(long)]
        tabs: bool,
    },
    /// Dump the raw token stream of a file, one token per line
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Reformat a file in place with canonical indentation and quoting
    Format {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Indent width in spaces
        #[arg(long, default_value_t = 4)]
        indent: usize,

        /// Indent with tabs instead of spaces
        #[arg(long)]
        tabs: bool,

        /// Print the result instead of writing it back to the file
        #[arg(long)]
        check: bool,
    },
    /// Emit the most compact faithful-equivalent source: comments dropped,
    /// blank lines collapsed, uniform single-space indentation
    Minify {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}
