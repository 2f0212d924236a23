//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// In-memory labeled forest: replay tree API requests, inspect record sets
#[derive(Parser, Debug)]
#[command(name = "rstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config file, layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay request lines (`METHOD PATH [JSON]`) against one tree
    Exec {
        /// Script file (default: stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        script: Option<PathBuf>,
        /// Records file to start from (overrides configured seed)
        #[arg(long, value_hint = ValueHint::FilePath)]
        seed: Option<PathBuf>,
        /// Exit non-zero if any request fails
        #[arg(long)]
        strict: bool,
    },

    /// Show a records file as a tree
    Show {
        /// Records file (default: configured seed)
        #[arg(value_hint = ValueHint::FilePath)]
        records: Option<PathBuf>,
        /// Print nested JSON instead of a diagram
        #[arg(long)]
        json: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print effective settings
    Show,
    /// Print a commented config template
    Template,
    /// Print the global config location
    Path,
}
