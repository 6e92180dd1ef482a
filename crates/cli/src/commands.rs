// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations.
//!
//! Each command drives a [`Namespace`] that is already connecting; none of
//! them closes it.

use std::time::Duration;

use serde_json::Value;
use tether::Namespace;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// How often readiness is polled.
const READY_POLL: Duration = Duration::from_millis(10);

/// Time given to a queued frame to reach the socket before exit.
const FLUSH_DELAY: Duration = Duration::from_millis(100);

/// One line of `watch` output.
pub fn format_update(store: &str, value: &Value) -> String {
    format!("{} {}", store, value)
}

/// Parse a command-line value. Raw mode takes it verbatim as a string.
pub fn parse_value(input: &str, raw: bool) -> Result<Value> {
    if raw {
        return Ok(Value::String(input.to_string()));
    }
    Ok(serde_json::from_str(input)?)
}

/// Print updates for `stores` until Ctrl-C.
pub async fn watch(ns: &Namespace, stores: &[String]) -> Result<()> {
    for store in stores {
        let name = store.clone();
        ns.subscribe(store, Value::Null, move |value| {
            println!("{}", format_update(&name, &value));
        });
    }
    info!("watching {} store(s), press Ctrl-C to stop", stores.len());
    tokio::signal::ctrl_c().await?;
    debug!("interrupted");
    Ok(())
}

/// Write `value` to `store` once connected.
pub async fn set(ns: &Namespace, store: &str, value: Value, timeout: Duration) -> Result<()> {
    let proxy = ns.writable(store, value.clone());
    wait_ready(ns, timeout).await?;
    proxy.set(value);
    tokio::time::sleep(FLUSH_DELAY).await;
    Ok(())
}

/// Fetch the current value of `store`.
pub async fn get(ns: &Namespace, store: &str, timeout: Duration) -> Result<Value> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    ns.subscribe(store, Value::Null, move |value| {
        let _ = tx.send(value);
    });

    let first = async {
        until_ready(ns).await;
        ns.get(store);
        rx.recv().await
    };
    match tokio::time::timeout(timeout, first).await {
        Ok(Some(value)) => Ok(value),
        Ok(None) | Err(_) => Err(Error::Timeout {
            ms: timeout.as_millis(),
            waiting_for: format!("a value for '{}'", store),
        }),
    }
}

async fn until_ready(ns: &Namespace) {
    while !ns.is_ready() {
        tokio::time::sleep(READY_POLL).await;
    }
}

async fn wait_ready(ns: &Namespace, timeout: Duration) -> Result<()> {
    tokio::time::timeout(timeout, until_ready(ns))
        .await
        .map_err(|_| Error::Timeout {
            ms: timeout.as_millis(),
            waiting_for: format!("a connection to {}", ns.target()),
        })
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
