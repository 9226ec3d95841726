use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use judging::dto::judging::ScoreUpdate;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::protocol::{self, CONNECT_FRAME, EnginePacket, PONG_FRAME, SocketPacket};
use crate::error::{ClientError, Result};

/// Receives every `score-update` the connection decodes.
pub type EventSink = Arc<dyn Fn(ScoreUpdate) + Send + Sync>;

/// Called once when the connection ends on its own (server disconnect,
/// socket close or read error). Not called after [`PushConnection::close`].
pub type CloseHook = Arc<dyn Fn() + Send + Sync>;

/// An open push connection. Closing is immediate and idempotent.
pub trait PushConnection: Send {
    fn close(&mut self);
}

#[async_trait::async_trait]
pub trait PushConnector: Send + Sync {
    async fn connect(&self, sink: EventSink, on_close: CloseHook)
    -> Result<Box<dyn PushConnection>>;
}

/// Connects to the fest's Socket.IO server over a WebSocket transport.
pub struct SocketIoConnector {
    origin: String,
}

impl SocketIoConnector {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn handshake_url(&self) -> String {
        let origin = if let Some(rest) = self.origin.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.origin.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.origin.clone()
        };
        format!("{}/socket.io/?EIO=4&transport=websocket", origin)
    }
}

struct SocketIoConnection {
    task: Option<JoinHandle<()>>,
}

impl PushConnection for SocketIoConnection {
    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Push channel closed");
        }
    }
}

impl Drop for SocketIoConnection {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait::async_trait]
impl PushConnector for SocketIoConnector {
    async fn connect(
        &self,
        sink: EventSink,
        on_close: CloseHook,
    ) -> Result<Box<dyn PushConnection>> {
        let url = self.handshake_url();
        info!("Connecting push channel to {}", url);

        let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| ClientError::Channel(format!("connect to {} failed: {}", url, e)))?;
        let (mut write, mut read) = stream.split();

        let task = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let text = match message {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Push channel read failed: {}", e);
                        break;
                    }
                };

                let packet = match protocol::decode(&text) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!("Ignoring malformed frame: {}", e);
                        continue;
                    }
                };

                let reply = match packet {
                    EnginePacket::Open(_) => Some(CONNECT_FRAME),
                    EnginePacket::Ping => Some(PONG_FRAME),
                    EnginePacket::Close => break,
                    EnginePacket::Message(SocketPacket::Disconnect) => break,
                    EnginePacket::Message(SocketPacket::ConnectError(message)) => {
                        warn!("Push channel refused namespace connect: {}", message);
                        break;
                    }
                    EnginePacket::Message(packet) => {
                        if let Some(update) = packet.score_update() {
                            debug!(%update, "score-update received");
                            sink(update);
                        }
                        None
                    }
                    _ => None,
                };

                if let Some(frame) = reply
                    && let Err(e) = write.send(Message::Text(frame.to_string())).await
                {
                    warn!("Push channel write failed: {}", e);
                    break;
                }
            }
            info!("Push channel ended by the server");
            on_close();
        });

        Ok(Box::new(SocketIoConnection { task: Some(task) }))
    }
}
