//! Command line arguments

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Validate, reconcile and inspect product configuration documents
#[derive(Debug, Parser)]
#[command(name = "pcfg", version, about)]
pub(crate) struct Cli {
    /// Project configuration file (defaults to ./pcfg.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Report model, template and type validation messages
    Validate {
        /// Object to validate, all objects when omitted
        name: Option<String>,
    },

    /// List differences between objects and their product types
    Delta {
        /// Object to check, all objects when omitted
        name: Option<String>,
    },

    /// Reconcile objects with their product types and save the result
    Fix {
        /// Object to fix, all objects when omitted
        name: Option<String>,

        /// Report what would change without writing documents
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the generation effective on a date
    Generation {
        /// Object name
        name: String,

        /// Date to look up (YYYY-MM-DD)
        #[arg(long = "on", value_name = "DATE")]
        on: NaiveDate,
    },

    /// Show the effective content of a property
    Resolve {
        /// Object name
        name: String,

        /// Property name
        property: String,

        /// Resolve in the generation effective on this date
        #[arg(long = "on", value_name = "DATE")]
        on: Option<NaiveDate>,
    },
}
