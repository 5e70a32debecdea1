//! CLI argument parsing and structure definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands;

/// Referent deduplication - merge entity mentions into canonical identities
#[derive(Parser)]
#[command(name = "refmerge")]
#[command(
    author,
    version,
    about = "Referent deduplication - merge entity mentions into canonical identities",
    long_about = r#"
refmerge - referent deduplication and ontology merging

INPUT:
  One JSON object per line, one line per mention:
    {"kind": "geo", "slots": {"NAME": ["Moscow", "MSK"]}, "begin": 0, "end": 6}
  A slot value {"ref": N} points at the entity of input record N (0-based).

EXAMPLES:
  refmerge resolve mentions.jsonl
  refmerge resolve mentions.jsonl --text document.txt --format json
  refmerge resolve mentions.jsonl --config refmerge.toml
  refmerge info
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register mention records and print the canonical entities
    #[command(visible_alias = "r")]
    Resolve(commands::ResolveArgs),

    /// Show supported kinds and their attribute tables
    Info,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per entity (default)
    #[default]
    Text,
    /// JSON array of entities
    Json,
    /// JSON lines (one entity per line)
    Jsonl,
}
