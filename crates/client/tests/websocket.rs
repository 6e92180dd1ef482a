// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests against an in-process WebSocket server.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tether::{ConnectionState, Namespace, NamespaceConfig};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};

const TIMEOUT: Duration = Duration::from_secs(5);

/// One accepted client connection.
struct Session {
    path: String,
    ws: WebSocketStream<TcpStream>,
}

impl Session {
    async fn next_frame(&mut self) -> String {
        loop {
            let message = tokio::time::timeout(TIMEOUT, self.ws.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("connection ended")
                .expect("read failed");
            match message {
                Message::Text(text) => return text.as_str().to_owned(),
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected message: {:?}", other),
            }
        }
    }

    async fn send(&mut self, frame: &str) {
        self.ws.send(Message::Text(frame.to_owned().into())).await.unwrap();
    }

    async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

/// Loopback server handing each accepted connection to the test.
struct Server {
    port: u16,
    sessions: mpsc::UnboundedReceiver<Session>,
}

impl Server {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, sessions) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let mut path = String::new();
                let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    path = req.uri().path().to_string();
                    Ok(resp)
                };
                let Ok(ws) = accept_hdr_async(stream, callback).await else {
                    continue;
                };
                if tx.send(Session { path, ws }).is_err() {
                    break;
                }
            }
        });

        Server { port, sessions }
    }

    fn url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    async fn accept(&mut self) -> Session {
        tokio::time::timeout(TIMEOUT, self.sessions.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("server stopped")
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn config(server: &Server) -> NamespaceConfig {
    NamespaceConfig::new("sandbox")
        .with_url(server.url())
        .with_write_key("wk")
        .with_retry_delay(Duration::from_millis(100))
}

#[tokio::test]
async fn test_subscribe_update_and_set() {
    let mut server = Server::start().await;
    let ns = Namespace::new(config(&server));
    let counter = ns.writable("counter", 0i64);

    let mut session = server.accept().await;
    assert_eq!(session.path, "/ws/sandbox/wk");
    assert_eq!(
        session.next_frame().await,
        r#"{"type":"Subscribe","store":"counter","initial":"0"}"#
    );

    session
        .send(r#"{"type":"Update","store":"counter","value":"5"}"#)
        .await;
    wait_until(|| counter.get() == 5).await;
    assert!(ns.is_ready());

    counter.update(|v| v + 1);
    assert_eq!(
        session.next_frame().await,
        r#"{"type":"Set","store":"counter","value":"6"}"#
    );

    ns.get("counter");
    assert_eq!(
        session.next_frame().await,
        r#"{"type":"Get","store":"counter"}"#
    );

    ns.close();
}

#[tokio::test]
async fn test_replay_after_server_drop() {
    let mut server = Server::start().await;
    let ns = Namespace::new(config(&server));
    let name = ns.writable("name", String::from("ann"));
    let _score = ns.readable("score", 0u32);

    let mut first = server.accept().await;
    let mut frames = vec![first.next_frame().await, first.next_frame().await];
    frames.sort();
    assert_eq!(
        frames,
        vec![
            r#"{"type":"Subscribe","store":"name","initial":"\"ann\""}"#,
            r#"{"type":"Subscribe","store":"score","initial":"0"}"#,
        ]
    );

    first
        .send(r#"{"type":"Update","store":"name","value":"\"bea\""}"#)
        .await;
    wait_until(|| name.get() == "bea").await;
    first.close().await;
    wait_until(|| !ns.is_ready()).await;

    // Written while disconnected: kept locally, never sent.
    name.set("cy".into());

    let mut second = server.accept().await;
    let mut frames = vec![second.next_frame().await, second.next_frame().await];
    frames.sort();
    assert_eq!(
        frames,
        vec![
            r#"{"type":"Subscribe","store":"name","initial":"\"ann\""}"#,
            r#"{"type":"Subscribe","store":"score","initial":"0"}"#,
        ]
    );
    assert_eq!(name.get(), "cy");

    ns.unsubscribe("score");
    assert_eq!(
        second.next_frame().await,
        r#"{"type":"Unsubscribe","store":"score"}"#
    );

    ns.close();
    wait_until(|| ns.connection_state() == ConnectionState::Disconnected).await;
}

#[tokio::test]
async fn test_retries_until_server_appears() {
    // Reserve a port, then free it so the first attempts are refused.
    let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = probe.local_addr().unwrap().port();
    drop(probe);

    let ns = Namespace::new(
        NamespaceConfig::new("late")
            .with_url(format!("ws://127.0.0.1:{}/ws", port))
            .with_retry_delay(Duration::from_millis(50)),
    );
    let _flag = ns.readable("flag", false);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!ns.is_ready());

    let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
    let (stream, _) = tokio::time::timeout(TIMEOUT, listener.accept())
        .await
        .expect("client never retried")
        .unwrap();
    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
    let frame = tokio::time::timeout(TIMEOUT, ws.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(
        frame.into_text().unwrap().as_str(),
        r#"{"type":"Subscribe","store":"flag","initial":"false"}"#
    );

    ns.close();
}
