//! Bridge protocol for afkbot.
//!
//! - **Types** ([`BotCommand`], [`BotEvent`], [`Position`], [`Control`]):
//!   what the bot and the bridge say to each other.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   turned into frames.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (frames) → Protocol (BotCommand / BotEvent) → Client (Bot handle)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AuthType, BotCommand, BotEvent, ConnectOptions, Control, EntityState, Position,
};
