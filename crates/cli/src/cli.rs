// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

const EXAMPLES_HELP: &str = "\
Examples:
  tether -n sandbox watch counter           Print every counter update
  tether -n sandbox -k soup set counter 5   Write a value
  tether -n sandbox get counter             Print the current value
  tether -c sandbox.toml get counter        Use settings from a file";

#[derive(Parser, Debug)]
#[command(name = "tether", version)]
#[command(about = "Watch and write server-held stores")]
#[command(after_help = EXAMPLES_HELP)]
pub struct Cli {
    /// Read namespace settings from a TOML file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base server URL, without the namespace segment
    #[arg(short, long, global = true)]
    pub url: Option<String>,

    /// Namespace name
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Write key granting write access
    #[arg(short = 'k', long, global = true)]
    pub write_key: Option<String>,

    /// Exchange raw string payloads instead of JSON text
    #[arg(long, global = true)]
    pub raw: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every update of the given stores until interrupted
    Watch {
        /// Store names
        #[arg(required = true)]
        stores: Vec<String>,
    },

    /// Write a value to a store
    Set {
        /// Store name
        store: String,

        /// JSON value (taken verbatim with --raw)
        value: String,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Print the current value of a store
    Get {
        /// Store name
        store: String,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct WaitArgs {
    /// Give up after this many milliseconds
    #[arg(long, default_value = "5000", value_name = "MS")]
    pub timeout_ms: u64,
}

impl WaitArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
