//! Ways to open a game connection.
//!
//! [`GameConnector`] is the seam the session controller depends on. Two
//! implementations ship with the crate:
//!
//! - [`BridgeConnector`]: dials a bridge process over a transport
//!   (WebSocket by default) and pumps encoded frames both ways.
//! - [`ChannelConnector`]: hands the "bridge side" of each connection to
//!   in-process code as a [`BridgeEnd`]. Used for embedding and tests.

use std::future::Future;
use std::sync::Arc;

use afkbot_protocol::{BotCommand, BotEvent, Codec, ConnectOptions, JsonCodec};
use afkbot_transport::{Connection, Connector, WebSocketConnector};
use tokio::sync::mpsc;

use crate::{Bot, ClientError, Link};

/// Opens game connections.
pub trait GameConnector: Send + Sync + 'static {
    /// Connects to the game server described by `options`.
    fn connect(
        &self,
        options: &ConnectOptions,
    ) -> impl Future<Output = Result<Link, ClientError>> + Send;
}

// ---------------------------------------------------------------------------
// BridgeConnector
// ---------------------------------------------------------------------------

/// Connects through a bridge process reachable over a [`Connector`].
pub struct BridgeConnector<T = WebSocketConnector, C = JsonCodec> {
    url: String,
    transport: T,
    codec: C,
}

impl BridgeConnector {
    /// A WebSocket + JSON bridge at `url` (e.g. `ws://127.0.0.1:3001`).
    pub fn websocket(url: impl Into<String>) -> Self {
        Self::new(url, WebSocketConnector, JsonCodec)
    }
}

impl<T, C> BridgeConnector<T, C> {
    /// A bridge at `url` over a custom transport and codec.
    pub fn new(url: impl Into<String>, transport: T, codec: C) -> Self {
        Self {
            url: url.into(),
            transport,
            codec,
        }
    }

    /// The bridge URL this connector dials.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<T, C> GameConnector for BridgeConnector<T, C>
where
    T: Connector,
    C: Codec + Clone,
{
    async fn connect(&self, options: &ConnectOptions) -> Result<Link, ClientError> {
        let conn = Arc::new(self.transport.connect(&self.url).await?);
        let hello = self.codec.encode(&BotCommand::Connect(options.clone()))?;
        conn.send(&hello).await?;

        tracing::info!(
            conn_id = %conn.id(),
            bridge = %self.url,
            host = %options.host,
            port = options.port,
            "bridge link opened"
        );

        let (bot, mut events, commands, event_tx) = Bot::channel();
        let tasks = events.tasks_mut();
        tasks.spawn(pump_commands(
            Arc::clone(&conn),
            self.codec.clone(),
            commands,
            event_tx.clone(),
        ));
        tasks.spawn(pump_events(conn, self.codec.clone(), event_tx));

        Ok(Link { bot, events })
    }
}

/// Encodes commands from the [`Bot`] handle and writes them to the link.
async fn pump_commands<K: Connection, C: Codec>(
    conn: Arc<K>,
    codec: C,
    mut commands: mpsc::UnboundedReceiver<BotCommand>,
    events: mpsc::UnboundedSender<BotEvent>,
) {
    while let Some(command) = commands.recv().await {
        let frame = match codec.encode(&command) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, ?command, "dropping unencodable command");
                continue;
            }
        };
        if let Err(e) = conn.send(&frame).await {
            // The reader sees the same failure and ends the stream.
            tracing::debug!(conn_id = %conn.id(), error = %e, "bridge send failed");
            let _ = events.send(BotEvent::Error {
                message: e.to_string(),
            });
            break;
        }
    }
    let _ = conn.close().await;
}

/// Reads frames from the link and turns them into [`BotEvent`]s.
///
/// A closed or failed link always ends with a synthetic `End`, so the
/// session sees exactly one disconnect signal either way.
async fn pump_events<K: Connection, C: Codec>(
    conn: Arc<K>,
    codec: C,
    events: mpsc::UnboundedSender<BotEvent>,
) {
    let reason = loop {
        match conn.recv().await {
            Ok(Some(frame)) => match codec.decode::<BotEvent>(&frame) {
                Ok(event) => {
                    let is_end = matches!(event, BotEvent::End { .. });
                    if events.send(event).is_err() || is_end {
                        return;
                    }
                }
                Err(e) => {
                    tracing::debug!(conn_id = %conn.id(), error = %e, "undecodable bridge frame");
                }
            },
            Ok(None) => break Some("bridge closed the connection".to_string()),
            Err(e) => {
                let _ = events.send(BotEvent::Error {
                    message: e.to_string(),
                });
                break Some(e.to_string());
            }
        }
    };
    let _ = events.send(BotEvent::End { reason });
}

// ---------------------------------------------------------------------------
// ChannelConnector
// ---------------------------------------------------------------------------

/// The far side of a [`ChannelConnector`] connection: what a bridge would
/// see.
pub struct BridgeEnd {
    /// The options the bot connected with.
    pub options: ConnectOptions,
    commands: mpsc::UnboundedReceiver<BotCommand>,
    events: mpsc::UnboundedSender<BotEvent>,
}

impl BridgeEnd {
    /// Delivers an event to the bot. Returns `false` if the bot side is gone.
    pub fn emit(&self, event: BotEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Waits for the next command the bot sent.
    ///
    /// Returns `None` once every [`Bot`] handle has been dropped.
    pub async fn next_command(&mut self) -> Option<BotCommand> {
        self.commands.recv().await
    }

    /// Returns a command if one is already queued.
    pub fn try_next_command(&mut self) -> Option<BotCommand> {
        self.commands.try_recv().ok()
    }

    /// Drains every queued command.
    pub fn drain_commands(&mut self) -> Vec<BotCommand> {
        let mut out = Vec::new();
        while let Ok(command) = self.commands.try_recv() {
            out.push(command);
        }
        out
    }
}

/// An in-process [`GameConnector`].
///
/// Every successful `connect` yields a [`BridgeEnd`] on the receiver
/// returned by [`ChannelConnector::new`]. Once that receiver is dropped,
/// `connect` fails with [`ClientError::Closed`].
#[derive(Clone)]
pub struct ChannelConnector {
    bridges: mpsc::UnboundedSender<BridgeEnd>,
}

impl ChannelConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BridgeEnd>) {
        let (bridges, rx) = mpsc::unbounded_channel();
        (Self { bridges }, rx)
    }
}

impl GameConnector for ChannelConnector {
    async fn connect(&self, options: &ConnectOptions) -> Result<Link, ClientError> {
        let (bot, events, commands, event_tx) = Bot::channel();
        let end = BridgeEnd {
            options: options.clone(),
            commands,
            events: event_tx,
        };
        self.bridges.send(end).map_err(|_| ClientError::Closed)?;
        Ok(Link { bot, events })
    }
}
