//! refmerge - referent deduplication CLI
//!
//! Runs mention records through a document session and prints one summary
//! per canonical entity.
//!
//! # Usage
//!
//! ```bash
//! # Merge mentions, print one line per entity
//! refmerge resolve mentions.jsonl
//!
//! # With the document text (for script detection and mention snippets)
//! refmerge resolve mentions.jsonl --text document.txt --format json
//!
//! # Show supported kinds
//! refmerge info
//! ```
//!
//! Set `RUST_LOG=debug` to see merge and rejection decisions.

use std::process::ExitCode;

use clap::Parser;

mod commands;
mod output;
mod parser;

use parser::{Cli, Commands};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let result: Result<(), String> = match cli.command {
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Info => commands::info::run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
