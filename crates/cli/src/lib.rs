// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether-cli: command-line access to tether stores.
//!
//! Settings come from an optional TOML file (see [`NamespaceConfig`]),
//! overridden by command-line flags.

mod cli;
pub mod commands;
pub mod error;

use tether::{Namespace, NamespaceConfig};
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Command, WaitArgs};
pub use error::{Error, Result};

/// Install the log subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the namespace settings from the config file and flags.
pub fn resolve_config(cli: &Cli) -> Result<NamespaceConfig> {
    let mut config = match &cli.config {
        Some(path) => NamespaceConfig::load(path)?,
        None => {
            let name = cli.namespace.clone().ok_or(Error::MissingNamespace)?;
            NamespaceConfig::new(name)
        }
    };
    if let Some(name) = &cli.namespace {
        config.name = name.clone();
    }
    if let Some(url) = &cli.url {
        config.url = url.clone();
    }
    if let Some(key) = &cli.write_key {
        config.write_key = Some(key.clone());
    }
    if cli.raw {
        config.stringify = false;
    }
    config.autoconnect = true;
    config.validate()?;
    Ok(config)
}

/// Run a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Watch { stores } => {
            let ns = Namespace::new(read_only(config));
            finish(&ns, commands::watch(&ns, &stores).await)
        }
        Command::Set { store, value, wait } => {
            // Reject bad input before connecting.
            let value = commands::parse_value(&value, !config.stringify)?;
            let ns = Namespace::new(config);
            finish(&ns, commands::set(&ns, &store, value, wait.timeout()).await)
        }
        Command::Get { store, wait } => {
            let ns = Namespace::new(read_only(config));
            let value = finish(&ns, commands::get(&ns, &store, wait.timeout()).await)?;
            println!("{}", value);
            Ok(())
        }
    }
}

/// Drop the write key. A writing connection lets the server create missing
/// stores from the subscribe snapshot, which reads must never do.
pub fn read_only(mut config: NamespaceConfig) -> NamespaceConfig {
    config.write_key = None;
    config
}

fn finish<T>(ns: &Namespace, outcome: Result<T>) -> Result<T> {
    ns.close();
    outcome
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
