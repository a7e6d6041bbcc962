//! Chat-based login handshake.
//!
//! Many offline-mode servers run an auth plugin that freezes new players
//! until they type `/register <pw> <pw>` and then `/login <pw>`. The bot
//! does the same and reads the server's answer from chat:
//!
//! ```text
//!   Idle ──/register──→ AwaitingRegisterReply ──ok──→ AwaitingLoginReply ──ok──→ Authenticated
//!                              │                               │
//!                              └──────────── Failed(reason) ←──┘
//! ```
//!
//! # Reply correlation
//!
//! A reply is simply "the next chat line after the command was sent". With
//! the default [`ReplyFilter::AnyLine`] there is no sender or message-type
//! filtering, so an unrelated line that lands first (a join message, another
//! player talking) is taken as the reply and usually fails the step. With
//! the default `reply_timeout` of `None` a server that never answers leaves
//! the handshake waiting until the session ends and aborts it. Both knobs
//! exist to make that behavior a visible choice. Idle behaviors never wait
//! on the handshake either way.

use std::fmt;
use std::time::Duration;

use afkbot_client::{Bot, ChatSubscription, ClientError};
use tokio::time;
use tracing::{debug, info};

use crate::SessionError;

/// Which chat lines count as a handshake reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyFilter {
    /// The very next line, whoever sent it.
    #[default]
    AnyLine,
    /// The next line without a player sender (server/system messages).
    ServerOnly,
}

/// Handshake settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub password: String,
    /// Give up on a step after this long. `None` waits forever.
    pub reply_timeout: Option<Duration>,
    pub reply_filter: ReplyFilter,
}

impl AuthConfig {
    /// Default knobs: no timeout, no filtering.
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            reply_timeout: None,
            reply_filter: ReplyFilter::AnyLine,
        }
    }
}

/// One step of the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    Register,
    Login,
}

impl fmt::Display for AuthStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStep::Register => f.write_str("register"),
            AuthStep::Login => f.write_str("login"),
        }
    }
}

/// Where a handshake currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    AwaitingRegisterReply,
    AwaitingLoginReply,
    Authenticated,
    Failed(String),
}

/// How the register step succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// "successfully registered"
    New,
    /// "already registered": treated exactly like a fresh registration.
    Existing,
}

/// Proof of a completed handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated {
    pub registration: Registration,
}

/// Classifies the reply to `/register`.
///
/// Case-sensitive substring checks, first match wins.
pub fn classify_register(message: &str) -> Result<Registration, SessionError> {
    if message.contains("successfully registered") {
        Ok(Registration::New)
    } else if message.contains("already registered") {
        Ok(Registration::Existing)
    } else {
        Err(SessionError::AuthMismatch {
            step: AuthStep::Register,
            message: message.to_string(),
        })
    }
}

/// Classifies the reply to `/login`.
pub fn classify_login(message: &str) -> Result<(), SessionError> {
    if message.contains("successfully logged in") {
        Ok(())
    } else {
        Err(SessionError::AuthMismatch {
            step: AuthStep::Login,
            message: message.to_string(),
        })
    }
}

/// Runs the register-then-login exchange over chat.
pub struct ChatHandshake {
    config: AuthConfig,
    state: AuthState,
}

impl ChatHandshake {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            state: AuthState::Idle,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Registers, then logs in. Login is never attempted if register fails.
    pub async fn run(&mut self, bot: &Bot) -> Result<Authenticated, SessionError> {
        let result = self.steps(bot).await;
        self.state = match &result {
            Ok(_) => AuthState::Authenticated,
            Err(e) => AuthState::Failed(e.to_string()),
        };
        result
    }

    async fn steps(&mut self, bot: &Bot) -> Result<Authenticated, SessionError> {
        let password = self.config.password.clone();

        self.state = AuthState::AwaitingRegisterReply;
        let reply = self
            .request(bot, AuthStep::Register, format!("/register {password} {password}"))
            .await?;
        let registration = classify_register(&reply)?;
        match registration {
            Registration::New => info!("registration confirmed"),
            Registration::Existing => info!("bot was already registered"),
        }

        self.state = AuthState::AwaitingLoginReply;
        let reply = self
            .request(bot, AuthStep::Login, format!("/login {password}"))
            .await?;
        classify_login(&reply)?;
        info!("login successful");

        Ok(Authenticated { registration })
    }

    /// Sends `command` and waits for the reply line.
    async fn request(
        &self,
        bot: &Bot,
        step: AuthStep,
        command: String,
    ) -> Result<String, SessionError> {
        // Listen first so a fast reply can't slip past.
        let mut listener = bot.subscribe_chat();
        bot.chat(command)?;
        info!(%step, "sent auth command");

        let wait = self.next_reply(&mut listener, step);
        let reply = match self.config.reply_timeout {
            Some(after) => time::timeout(after, wait)
                .await
                .map_err(|_| SessionError::ReplyTimeout { step, after })??,
            None => wait.await?,
        };
        info!(%step, chat = %reply, "chat log");
        Ok(reply)
    }

    async fn next_reply(
        &self,
        listener: &mut ChatSubscription,
        step: AuthStep,
    ) -> Result<String, SessionError> {
        loop {
            let line = listener.next_line().await.ok_or(ClientError::Closed)?;
            match (self.config.reply_filter, &line.sender) {
                (ReplyFilter::ServerOnly, Some(sender)) => {
                    debug!(%step, %sender, "ignoring player chat while waiting for reply");
                }
                _ => return Ok(line.text),
            }
        }
    }
}
