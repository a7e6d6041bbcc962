//! One live connection attempt and everything it owns.
//!
//! A [`Session`] owns the [`EventStream`] of its link, the handshake task,
//! and every behavior task. It is driven by [`Session::run`] until the
//! connection ends, then consumed by [`Session::teardown`], which aborts
//! and awaits all of its tasks. Nothing it spawned outlives it.
//!
//! ```text
//!   Connecting ──spawn──→ Authenticating ──handshake resolves──→ Active
//!        │                      │                                 │
//!        │                      │ (auto-auth off: straight to Active)
//!        └──────────────────────┴──────────── end ────────────────┴──→ Disconnected
//! ```
//!
//! The phase tracks the handshake only. Idle behaviors start on the first
//! spawn in both `Authenticating` and `Active`, and never wait for the
//! handshake: a server without an auth plugin never answers `/register`.

use std::fmt;
use std::sync::Arc;

use afkbot_behavior::spawn_enabled;
use afkbot_client::{Bot, EventStream, is_offline_message};
use afkbot_protocol::{BotEvent, Position};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::{Authenticated, ChatHandshake, SessionConfig, SessionError};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Authenticating,
    Active,
    Disconnected,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Connecting => "connecting",
            SessionPhase::Authenticating => "authenticating",
            SessionPhase::Active => "active",
            SessionPhase::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// Controller-level view of the current session, published on a `watch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    /// Id of the live session, `None` between sessions.
    pub session: Option<u64>,
    pub phase: SessionPhase,
    /// Sessions created so far (connect attempts that got a link).
    pub sessions_started: u64,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            session: None,
            phase: SessionPhase::Disconnected,
            sessions_started: 0,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disconnect {
    /// The client reported `end`.
    Ended(Option<String>),
    /// The event stream closed without an `end`.
    LinkClosed,
    /// No link could be opened in the first place.
    ConnectFailed(String),
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disconnect::Ended(Some(reason)) => write!(f, "ended: {reason}"),
            Disconnect::Ended(None) => f.write_str("ended"),
            Disconnect::LinkClosed => f.write_str("link closed"),
            Disconnect::ConnectFailed(e) => write!(f, "connect failed: {e}"),
        }
    }
}

/// A single connection's lifetime.
pub struct Session {
    id: u64,
    bot: Bot,
    events: EventStream,
    config: Arc<SessionConfig>,
    status: Arc<watch::Sender<SessionStatus>>,
    phase: SessionPhase,
    home: Option<Position>,
    /// At most one handshake per session.
    handshake: JoinSet<Result<Authenticated, SessionError>>,
    behaviors: JoinSet<()>,
}

impl Session {
    pub(crate) fn new(
        id: u64,
        bot: Bot,
        events: EventStream,
        config: Arc<SessionConfig>,
        status: Arc<watch::Sender<SessionStatus>>,
    ) -> Self {
        let session = Self {
            id,
            bot,
            events,
            config,
            status,
            phase: SessionPhase::Connecting,
            home: None,
            handshake: JoinSet::new(),
            behaviors: JoinSet::new(),
        };
        session.publish();
        session
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Where the bot first spawned in this session.
    pub fn home(&self) -> Option<Position> {
        self.home
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            debug!(session = self.id, from = %self.phase, to = %phase, "session phase");
            self.phase = phase;
            self.publish();
        }
    }

    fn publish(&self) {
        let (id, phase) = (self.id, self.phase);
        self.status.send_modify(|s| {
            s.session = Some(id);
            s.phase = phase;
        });
    }

    /// Processes events until the connection ends.
    pub async fn run(&mut self) -> Disconnect {
        loop {
            tokio::select! {
                event = self.events.next() => match event {
                    Some(BotEvent::End { reason }) => return Disconnect::Ended(reason),
                    Some(event) => self.on_event(event),
                    None => return Disconnect::LinkClosed,
                },
                Some(joined) = self.handshake.join_next(), if !self.handshake.is_empty() => {
                    self.on_handshake_done(joined);
                }
                Some(joined) = self.behaviors.join_next(), if !self.behaviors.is_empty() => {
                    if let Err(e) = joined {
                        error!(session = self.id, error = %e, "behavior task crashed");
                    }
                }
            }
        }
    }

    fn on_event(&mut self, event: BotEvent) {
        match event {
            BotEvent::Spawn { entity } => {
                if self.phase == SessionPhase::Connecting {
                    self.on_spawn(entity.position);
                } else {
                    info!(session = self.id, position = %entity.position, "bot respawned");
                }
            }
            BotEvent::Move { .. } => {}
            BotEvent::Chat { text, sender } => {
                debug!(session = self.id, sender = sender.as_deref().unwrap_or("server"), %text, "chat");
            }
            BotEvent::GoalReached => {
                info!(session = self.id, position = %self.bot.position(), "arrived at target location");
            }
            BotEvent::Death => {
                info!(session = self.id, position = %self.bot.position(), "bot died");
            }
            BotEvent::Kicked { reason } => {
                warn!(session = self.id, %reason, "kicked from server");
            }
            BotEvent::Error { message } => on_client_error(self.id, &message),
            // Handled by `run`.
            BotEvent::End { .. } => {}
        }
    }

    /// First join of this session: handshake and behaviors start together.
    fn on_spawn(&mut self, position: Position) {
        info!(session = self.id, %position, "bot joined the server");
        self.home = Some(position);

        match self.config.auth.clone() {
            Some(auth) => {
                info!(session = self.id, "started auto-auth module");
                self.set_phase(SessionPhase::Authenticating);
                let bot = self.bot.clone();
                self.handshake.spawn(async move {
                    ChatHandshake::new(auth).run(&bot).await
                });
            }
            None => self.set_phase(SessionPhase::Active),
        }

        spawn_enabled(&self.config.behaviors, &self.bot, position, &mut self.behaviors);
    }

    /// The handshake finished, one way or another. Only the outcome is logged.
    fn on_handshake_done(&mut self, joined: Result<Result<Authenticated, SessionError>, JoinError>) {
        match joined {
            Ok(Ok(auth)) => {
                info!(session = self.id, registration = ?auth.registration, "authenticated");
            }
            Ok(Err(e)) => warn!(session = self.id, error = %e, "auto-auth failed"),
            Err(e) => error!(session = self.id, error = %e, "auth task crashed"),
        }
        self.set_phase(SessionPhase::Active);
    }

    /// Cancels every task this session owns and waits for them to stop.
    ///
    /// The bridge is asked to leave the server first; if the link is
    /// already gone that request is simply dropped.
    pub async fn teardown(mut self) {
        self.set_phase(SessionPhase::Disconnected);
        if self.bot.quit().is_err() {
            debug!(session = self.id, "link already closed, quit not sent");
        }
        self.handshake.shutdown().await;
        self.behaviors.shutdown().await;
        self.status.send_modify(|s| s.session = None);
        debug!(session = self.id, "session torn down");
    }
}

/// Logs an error reported by the game client.
///
/// No recovery happens here: a fatal error is followed by `end`, and the
/// controller reacts to that.
pub(crate) fn on_client_error(session: u64, message: &str) {
    error!(session, error = %message, "client error");
    if is_offline_message(message) {
        log_offline_hint();
    }
}

pub(crate) fn log_offline_hint() {
    error!("server offline or unreachable");
    error!("if the server is started on demand, start it first");
}
