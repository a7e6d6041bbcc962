//! Session lifecycle for the AFK bot.
//!
//! This crate ties the lower layers together:
//!
//! 1. **Handshake**: chat-based `/register` then `/login` ([`ChatHandshake`])
//! 2. **Session**: one connection, its handshake and its idle behaviors
//!    ([`Session`])
//! 3. **Reconnection**: a fixed delay between sessions, forever
//!    ([`SessionController`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Binary (above)  ← loads settings, runs the controller
//!     ↕
//! Session Layer (this crate)  ← connect, authenticate, idle, reconnect
//!     ↕
//! Behavior Layer (below)  ← chat loop, anti-afk, drift corrector
//!     ↕
//! Client Layer (below)  ← Bot handle, event stream, bridge connector
//! ```

mod auth;
mod controller;
mod error;
mod session;

pub use auth::{
    AuthConfig, AuthState, AuthStep, Authenticated, ChatHandshake, Registration, ReplyFilter,
    classify_login, classify_register,
};
pub use controller::{SessionConfig, SessionController};
pub use error::SessionError;
pub use session::{Disconnect, Session, SessionPhase, SessionStatus};
