//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Assemble recorded markup tokenizer events into a tag tree and inspect it
#[derive(Parser, Debug)]
#[command(name = "tagtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, env = "TAGTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the markup-like rendering of the assembled tree
    Render {
        /// JSON-lines event stream, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        events: PathBuf,
        /// Spaces per nesting level (overrides config)
        #[arg(short, long)]
        indent: Option<usize>,
    },

    /// Print the assembled tree as an outline
    Tree {
        /// JSON-lines event stream, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        events: PathBuf,
    },

    /// List the leaf elements of the assembled tree
    Leaves {
        /// JSON-lines event stream, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        events: PathBuf,
    },

    /// Show size and shape of the assembled tree
    Stats {
        /// JSON-lines event stream, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        events: PathBuf,
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

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print a commented template config
    Template,
    /// Print the global config file location
    Path,
}
