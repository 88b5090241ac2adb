// src/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (optional, defaults to the platform config dir)
    #[arg(long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Submit cards from a JSON card file, verifying every write
    Add {
        /// Path to the JSON card file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Target deck (defaults to the configured deck)
        #[arg(value_name = "DECK")]
        deck: Option<String>,

        /// Bypass Anki's duplicate check for every card
        #[arg(long)]
        allow_duplicates: bool,
    },

    /// Find notes blocking re-submission of a card file's entries
    Ghosts {
        /// Path to the JSON card file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Deck to search (defaults to the configured deck)
        #[arg(value_name = "DECK")]
        deck: Option<String>,

        /// Actually delete the found notes instead of only reporting them
        #[arg(long)]
        live: bool,
    },

    /// Remove duplicate notes from a deck, keeping the most recent copy
    Dedup {
        /// Deck to scan (defaults to the configured deck)
        #[arg(value_name = "DECK")]
        deck: Option<String>,

        /// Actually delete duplicates instead of only reporting them
        #[arg(long)]
        live: bool,
    },

    /// Deduplicate a JSON card file locally, keeping the first of each front
    Clean {
        /// Path to the JSON card file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Where to write the cleaned file (defaults to in-place with backup)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Parse and validate the plain-text fact inbox
    Inbox {
        /// Path to the fact inbox file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List decks known to the running Anki instance
    Decks,

    /// Report whether AnkiConnect is reachable
    Status {
        /// Launch Anki and wait for the endpoint when it is not reachable
        #[arg(long)]
        launch: bool,
    },
}
