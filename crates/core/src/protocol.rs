// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for client-server communication.
//!
//! Every frame is a flat JSON object whose `type` field names the variant:
//! - Client sends subscription changes, writes and read requests
//! - Server pushes the authoritative value of a store as an `Update`
//!
//! Payload fields (`initial`, `value`) are always JSON strings; what they
//! contain depends on the namespace's stringify mode (see [`crate::codec`]).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Begin or resume receiving updates for a store.
    ///
    /// The server creates the store from `initial` when it does not exist
    /// yet and the connection is allowed to write.
    Subscribe {
        store: String,
        /// Encoded snapshot value.
        initial: String,
    },

    /// Stop receiving updates for a store.
    Unsubscribe { store: String },

    /// Ask the server to adopt a new value for a store.
    Set { store: String, value: String },

    /// Ask the server for an immediate update of a store.
    Get { store: String },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Authoritative new value for a store.
    Update { store: String, value: String },
}

impl ClientMessage {
    /// Creates a Subscribe message.
    pub fn subscribe(store: impl Into<String>, initial: impl Into<String>) -> Self {
        ClientMessage::Subscribe {
            store: store.into(),
            initial: initial.into(),
        }
    }

    /// Creates an Unsubscribe message.
    pub fn unsubscribe(store: impl Into<String>) -> Self {
        ClientMessage::Unsubscribe {
            store: store.into(),
        }
    }

    /// Creates a Set message.
    pub fn set(store: impl Into<String>, value: impl Into<String>) -> Self {
        ClientMessage::Set {
            store: store.into(),
            value: value.into(),
        }
    }

    /// Creates a Get message.
    pub fn get(store: impl Into<String>) -> Self {
        ClientMessage::Get {
            store: store.into(),
        }
    }

    /// Name of the store this message targets.
    pub fn store(&self) -> &str {
        match self {
            ClientMessage::Subscribe { store, .. }
            | ClientMessage::Unsubscribe { store }
            | ClientMessage::Set { store, .. }
            | ClientMessage::Get { store } => store,
        }
    }

    /// Wire tag of the message.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Subscribe { .. } => "Subscribe",
            ClientMessage::Unsubscribe { .. } => "Unsubscribe",
            ClientMessage::Set { .. } => "Set",
            ClientMessage::Get { .. } => "Get",
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates an Update message.
    pub fn update(store: impl Into<String>, value: impl Into<String>) -> Self {
        ServerMessage::Update {
            store: store.into(),
            value: value.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a frame received from the server.
    ///
    /// Unlike a plain serde call, this separates a frame that is not a
    /// message at all ([`Error::Json`], [`Error::MissingType`]) from a
    /// well-formed message with a tag this client does not know
    /// ([`Error::UnknownMessageType`]).
    pub fn from_json(s: &str) -> Result<Self> {
        let frame: Value = serde_json::from_str(s)?;
        match frame.get("type").and_then(Value::as_str) {
            Some("Update") => {}
            Some(other) => return Err(Error::UnknownMessageType(other.to_string())),
            None => return Err(Error::MissingType),
        }
        Ok(serde_json::from_value(frame)?)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
