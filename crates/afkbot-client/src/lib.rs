//! Game client handle for afkbot.
//!
//! The real game client (protocol, world state, pathfinding) lives in a
//! bridge process. This crate is the bot's view of it:
//!
//! - [`Bot`]: send chat, press controls, look around, set pathfinder goals,
//!   read the entity's last known state
//! - [`EventStream`]: spawn / chat / kick / error / end events, in order
//! - [`GameConnector`]: opens a [`Link`] (a `Bot` plus its `EventStream`)
//!
//! ```text
//! Session (above)  ← drives the EventStream, hands Bot clones to schedulers
//!     ↕
//! Client (this crate)
//!     ↕
//! Protocol + Transport (below)  ← JSON frames over a WebSocket
//! ```

mod bot;
mod connector;
mod error;

pub use bot::{Bot, ChatLine, ChatSubscription, EventStream, Link};
pub use connector::{BridgeConnector, BridgeEnd, ChannelConnector, GameConnector};
pub use error::{ClientError, is_offline_message};
