//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::{EntityKind, OrphanPolicy};

/// Fleet hierarchy resolver: group trees, ancestor-preserving search and single selection
#[derive(Parser, Debug)]
#[command(name = "fleettree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Entity records file (JSON array); overrides records_file from config
    #[arg(short, long, global = true, env = "FLEETTREE_RECORDS", value_hint = ValueHint::FilePath)]
    pub records: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the group hierarchy
    Tree {
        /// Keep only groups matching this text (plus their ancestors)
        #[arg(short, long)]
        query: Option<String>,
        /// Expand every group instead of roots only
        #[arg(short, long)]
        all: bool,
        /// Override the orphan policy (drop, promote)
        #[arg(long)]
        orphans: Option<OrphanPolicy>,
    },

    /// List entities of one kind
    List {
        /// vehicle, driver or group
        kind: EntityKind,
        /// Keep only entities matching this text
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Select an entity by id and print the committed selection as JSON
    Select {
        /// Entity id
        id: String,
        /// Kind to select from (default: config default_kind)
        #[arg(short, long)]
        kind: Option<EntityKind>,
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
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
    /// Print a template config file
    Template,
}
