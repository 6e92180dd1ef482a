// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether-core: Wire protocol for tether store synchronization
//!
//! This crate provides the message envelope and payload codec shared by the
//! tether client engine and anything that speaks to the same server.

pub mod codec;
pub mod error;
pub mod protocol;

pub use codec::Codec;
pub use error::{Error, Result};
pub use protocol::{ClientMessage, ServerMessage};
