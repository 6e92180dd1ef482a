// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Payload encoding for store values.
//!
//! A namespace fixes its mode at construction:
//! - stringify: the value is JSON-encoded and the resulting text is the
//!   payload, so the frame carries JSON text nested inside JSON
//! - raw: text values travel as-is and anything else is coerced to its
//!   JSON text; decoding hands the payload back untouched

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::protocol::ClientMessage;

/// Symmetric encoder/decoder for payload values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    stringify: bool,
}

impl Codec {
    /// Creates a codec in the given mode.
    pub fn new(stringify: bool) -> Self {
        Codec { stringify }
    }

    /// Whether payloads are double-encoded.
    pub fn stringify(&self) -> bool {
        self.stringify
    }

    /// Encodes a value into its payload text.
    pub fn encode_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) if !self.stringify => s.clone(),
            other => other.to_string(),
        }
    }

    /// Decodes payload text back into a value.
    ///
    /// Only fails in stringify mode, when the payload is not JSON text.
    pub fn decode_value(&self, payload: &str) -> Result<Value> {
        if self.stringify {
            Ok(serde_json::from_str(payload)?)
        } else {
            Ok(Value::String(payload.to_string()))
        }
    }

    /// Encodes any serializable value.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(self.encode_value(&serde_json::to_value(value)?))
    }

    /// Decodes a payload into a concrete type.
    pub fn decode<T: DeserializeOwned>(&self, payload: &str) -> Result<T> {
        Ok(serde_json::from_value(self.decode_value(payload)?)?)
    }

    /// Builds a Subscribe message with an encoded snapshot.
    pub fn subscribe(&self, store: &str, initial: &Value) -> ClientMessage {
        ClientMessage::subscribe(store, self.encode_value(initial))
    }

    /// Builds a Set message with an encoded value.
    pub fn set(&self, store: &str, value: &Value) -> ClientMessage {
        ClientMessage::set(store, self.encode_value(value))
    }
}

impl Default for Codec {
    fn default() -> Self {
        Codec::new(true)
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
