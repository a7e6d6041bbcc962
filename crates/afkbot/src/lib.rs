//! # afkbot
//!
//! Keeps a game account online with nobody at the keyboard.
//!
//! The bot connects through a bridge process, answers the server's
//! `/register` + `/login` prompt over chat, then idles: scripted chat,
//! randomized movement, and walking home when it drifts. When the
//! connection drops it waits a fixed delay and starts a fresh session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use afkbot::prelude::*;
//!
//! # async fn run() -> Result<(), AfkBotError> {
//! let settings = Settings::load("settings.json")?;
//! let connector = BridgeConnector::websocket(settings.bridge.url.clone());
//! SessionController::new(connector, settings.session_config())
//!     .run()
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod health;
pub mod runner;

mod error;
mod logging;

pub use error::AfkBotError;
pub use logging::init_logging;

pub mod prelude {
    pub use crate::AfkBotError;
    pub use crate::config::{ConfigError, Settings};
    pub use afkbot_behavior::{AntiAfkConfig, BehaviorConfig, ChatConfig, DriftConfig};
    pub use afkbot_client::{Bot, BridgeConnector, ChannelConnector, GameConnector, Link};
    pub use afkbot_protocol::{AuthType, BotCommand, BotEvent, ConnectOptions, Position};
    pub use afkbot_session::{
        AuthConfig, Disconnect, SessionConfig, SessionController, SessionPhase, SessionStatus,
    };
}
