//! Gateway test client
//!
//! Spawns the WebSocket gateway on a local port and speaks its JSON frames.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use bazaar_common::AppConfig;
use bazaar_gateway::{create_app, create_gateway_state};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use crate::helpers::get_test_port;

/// How long a test waits for one frame
const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Running gateway instance
pub struct TestGateway {
    pub addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    pub async fn start(config: AppConfig) -> Result<Self> {
        let addr = SocketAddr::from(([127, 0, 0, 1], get_test_port()));

        let state = create_gateway_state(config).await?;
        let app = create_app(state);

        let listener = TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Let the Pub/Sub subscription settle
        tokio::time::sleep(Duration::from_millis(200)).await;

        Ok(Self {
            addr: actual_addr,
            _handle: handle,
        })
    }

    /// Open a socket and consume the HELLO frame
    pub async fn connect(&self) -> Result<GatewayClient> {
        let url = format!("ws://{}/gateway", self.addr);
        let (stream, _) = connect_async(url.as_str()).await?;
        let mut client = GatewayClient { stream };

        let hello = client.recv().await?;
        if hello["op"] != "HELLO" {
            bail!("Expected HELLO, got {hello}");
        }
        Ok(client)
    }

    /// Connect and identify, returning the client after READY
    pub async fn identify(&self, token: &str) -> Result<GatewayClient> {
        let mut client = self.connect().await?;
        client.send(json!({ "op": "IDENTIFY", "d": { "token": token } })).await?;

        let ready = client.recv().await?;
        if ready["op"] != "READY" {
            bail!("Expected READY, got {ready}");
        }
        Ok(client)
    }
}

/// How a socket ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closed {
    /// Server sent a close frame with this code
    Code(u16),
    /// Stream ended without a close frame
    Dropped,
}

pub struct GatewayClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl GatewayClient {
    pub async fn send(&mut self, frame: Value) -> Result<()> {
        self.stream.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    /// Next JSON frame, skipping pings
    pub async fn recv(&mut self) -> Result<Value> {
        loop {
            let msg = tokio::time::timeout(FRAME_TIMEOUT, self.stream.next())
                .await
                .map_err(|_| anyhow!("Timed out waiting for a frame"))?
                .ok_or_else(|| anyhow!("Socket ended"))??;

            match msg {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(frame) => bail!("Socket closed: {frame:?}"),
                _ => continue,
            }
        }
    }

    /// Next `DISPATCH` frame with event name `event`, skipping others
    pub async fn recv_event(&mut self, event: &str) -> Result<Value> {
        loop {
            let frame = self.recv().await?;
            if frame["op"] == "DISPATCH" && frame["t"] == event {
                return Ok(frame["d"].clone());
            }
        }
    }

    /// Wait until the server closes the socket
    pub async fn closed(&mut self) -> Result<Closed> {
        loop {
            let next = tokio::time::timeout(FRAME_TIMEOUT, self.stream.next())
                .await
                .map_err(|_| anyhow!("Timed out waiting for close"))?;

            match next {
                Some(Ok(Message::Close(Some(frame)))) => return Ok(Closed::Code(u16::from(frame.code))),
                Some(Ok(Message::Close(None))) | None | Some(Err(_)) => return Ok(Closed::Dropped),
                Some(Ok(_)) => continue,
            }
        }
    }

    /// Watch `room_id`, returning the server's reply event name
    pub async fn join_room(&mut self, room_id: Uuid) -> Result<String> {
        self.send(json!({ "op": "JOIN_ROOM", "d": { "room_id": room_id } })).await?;

        loop {
            let frame = self.recv().await?;
            if frame["op"] != "DISPATCH" {
                continue;
            }
            if let Some(event) = frame["t"].as_str() {
                if event.starts_with("room:join") && frame["d"]["room_id"] == json!(room_id) {
                    return Ok(event.to_string());
                }
            }
        }
    }
}
