//! The top-level loop: connect, run a session, tear it down, wait, repeat.
//!
//! There is no backoff and no attempt limit. Every disconnect, including a
//! connect attempt that fails outright, waits the same fixed delay before
//! the next session is created. Against a server that stays down this means
//! one attempt per delay, forever.

use std::sync::Arc;
use std::time::Duration;

use afkbot_behavior::BehaviorConfig;
use afkbot_client::{ClientError, GameConnector, Link};
use afkbot_protocol::ConnectOptions;
use tokio::sync::watch;
use tokio::time;
use tracing::{error, info};

use crate::session::log_offline_hint;
use crate::{AuthConfig, Disconnect, Session, SessionStatus};

/// Everything a session needs, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub connect: ConnectOptions,
    /// Chat handshake; `None` skips it.
    pub auth: Option<AuthConfig>,
    pub behaviors: BehaviorConfig,
    pub auto_reconnect: bool,
    pub reconnect_delay: Duration,
}

impl SessionConfig {
    /// Delay used when none is configured.
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5_000);

    /// A config with every optional feature off except auto-reconnect.
    pub fn new(connect: ConnectOptions) -> Self {
        Self {
            connect,
            auth: None,
            behaviors: BehaviorConfig::default(),
            auto_reconnect: true,
            reconnect_delay: Self::DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Owns the current [`Session`] and replaces it after every disconnect.
pub struct SessionController<C> {
    connector: C,
    config: Arc<SessionConfig>,
    status: Arc<watch::Sender<SessionStatus>>,
    next_id: u64,
}

impl<C: GameConnector> SessionController<C> {
    pub fn new(connector: C, config: SessionConfig) -> Self {
        let (status, _) = watch::channel(SessionStatus::default());
        Self {
            connector,
            config: Arc::new(config),
            status: Arc::new(status),
            next_id: 1,
        }
    }

    /// Watches the current session's id and phase.
    pub fn status(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Runs sessions back to back. Returns only when auto-reconnect is off.
    pub async fn run(mut self) {
        loop {
            let reason = self.run_once().await;
            if !self.config.auto_reconnect {
                info!(%reason, "bot disconnected, auto-reconnect disabled");
                return;
            }
            info!(
                %reason,
                delay_ms = self.config.reconnect_delay.as_millis() as u64,
                "bot disconnected, reconnecting soon"
            );
            time::sleep(self.config.reconnect_delay).await;
        }
    }

    /// Runs one session from connect to teardown.
    ///
    /// The next session can only be created after this returns, so two
    /// sessions never overlap.
    pub async fn run_once(&mut self) -> Disconnect {
        let mut session = match self.connect().await {
            Ok(session) => session,
            Err(e) => return self.on_connect_failed(e),
        };
        let reason = session.run().await;
        session.teardown().await;
        reason
    }

    async fn connect(&mut self) -> Result<Session, ClientError> {
        let options = &self.config.connect;
        info!(
            username = %options.username,
            host = %options.host,
            port = options.port,
            "connecting"
        );
        let Link { bot, events } = self.connector.connect(options).await?;

        let id = self.next_id;
        self.next_id += 1;
        self.status.send_modify(|s| s.sessions_started += 1);

        Ok(Session::new(
            id,
            bot,
            events,
            Arc::clone(&self.config),
            Arc::clone(&self.status),
        ))
    }

    /// A failed connect gets the same treatment as an error followed by
    /// `end`: log it, then let the reconnect policy decide.
    fn on_connect_failed(&self, e: ClientError) -> Disconnect {
        error!(error = %e, "connect failed");
        if e.is_connection_refused_or_reset() {
            log_offline_hint();
        }
        Disconnect::ConnectFailed(e.to_string())
    }
}
