// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    subscribe = { ClientMessage::subscribe("counter", "0"), r#"{"type":"Subscribe","store":"counter","initial":"0"}"# },
    unsubscribe = { ClientMessage::unsubscribe("counter"), r#"{"type":"Unsubscribe","store":"counter"}"# },
    set = { ClientMessage::set("counter", "8"), r#"{"type":"Set","store":"counter","value":"8"}"# },
    get = { ClientMessage::get("counter"), r#"{"type":"Get","store":"counter"}"# },
)]
fn client_message_wire_format(msg: ClientMessage, expected: &str) {
    assert_eq!(msg.to_json().unwrap(), expected);
    assert_eq!(ClientMessage::from_json(expected).unwrap(), msg);
}

#[parameterized(
    subscribe = { ClientMessage::subscribe("a", "1") },
    unsubscribe = { ClientMessage::unsubscribe("a") },
    set = { ClientMessage::set("a", "1") },
    get = { ClientMessage::get("a") },
)]
fn client_message_kind_matches_tag(msg: ClientMessage) {
    let json = msg.to_json().unwrap();
    assert!(json.starts_with(&format!("{{\"type\":\"{}\"", msg.kind())));
}

#[test]
fn client_message_store_name() {
    assert_eq!(ClientMessage::subscribe("a", "1").store(), "a");
    assert_eq!(ClientMessage::get("b").store(), "b");
}

#[test]
fn server_update_parses() {
    let msg = ServerMessage::from_json(r#"{"type":"Update","store":"counter","value":"5"}"#).unwrap();
    assert_eq!(msg, ServerMessage::update("counter", "5"));
}

#[test]
fn server_update_field_order_is_irrelevant() {
    let msg = ServerMessage::from_json(r#"{"value":"\"hi\"","store":"greeting","type":"Update"}"#)
        .unwrap();
    assert_eq!(msg, ServerMessage::update("greeting", "\"hi\""));
}

#[test]
fn server_update_serializes_flat() {
    let json = ServerMessage::update("counter", "5").to_json().unwrap();
    assert_eq!(json, r#"{"type":"Update","store":"counter","value":"5"}"#);
}

#[parameterized(
    not_json = { "{not json" },
    update_missing_value = { r#"{"type":"Update","store":"counter"}"# },
    update_numeric_value = { r#"{"type":"Update","store":"counter","value":5}"# },
)]
fn server_malformed_frame_is_json_error(frame: &str) {
    let err = ServerMessage::from_json(frame).unwrap_err();
    assert!(matches!(err, Error::Json(_)), "got {:?}", err);
}

#[parameterized(
    array = { "[1,2,3]" },
    no_type = { r#"{"store":"counter","value":"5"}"# },
    numeric_type = { r#"{"type":7}"# },
)]
fn server_frame_without_tag(frame: &str) {
    let err = ServerMessage::from_json(frame).unwrap_err();
    assert!(matches!(err, Error::MissingType), "got {:?}", err);
}

#[parameterized(
    pong = { r#"{"type":"Pong","id":1}"#, "Pong" },
    lowercase_update = { r#"{"type":"update","store":"a","value":"1"}"#, "update" },
    client_tag = { r#"{"type":"Subscribe","store":"a","initial":"1"}"#, "Subscribe" },
)]
fn server_unknown_tag(frame: &str, tag: &str) {
    match ServerMessage::from_json(frame).unwrap_err() {
        Error::UnknownMessageType(t) => assert_eq!(t, tag),
        other => panic!("expected unknown type, got {:?}", other),
    }
}
