//! Idle-behavior schedulers for afkbot.
//!
//! Everything the bot does on its own once it is in the world:
//!
//! - [`ChatLoop`]: scripted chat, once or on repeat
//! - [`move_to`]: a single pathfinder goal to a configured spot
//! - [`AntiAfk`]: randomized walking, looking, jumping and sneaking
//! - [`DriftCorrector`]: walks the bot back home if it wandered off
//!
//! Each one is a plain async function or loop over a [`Bot`] handle.
//! [`spawn_enabled`] starts the configured set on a `JoinSet` owned by the
//! session, so aborting that set is the whole cancellation story.

mod anti_afk;
mod chat;
mod error;
mod navigate;

pub use anti_afk::{AntiAfk, AntiAfkConfig, AntiAfkStats, Firing};
pub use chat::{ChatConfig, ChatLoop};
pub use error::BehaviorError;
pub use navigate::{DriftConfig, DriftCorrector, move_to};

use afkbot_client::Bot;
use afkbot_protocol::Position;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Which behaviors run, and how.
///
/// `None` means disabled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BehaviorConfig {
    pub chat: Option<ChatConfig>,
    pub move_to: Option<Position>,
    /// Anti-afk movement. Drift correction is part of the same feature and
    /// runs whenever this is set.
    pub anti_afk: Option<AntiAfkConfig>,
    pub drift: DriftConfig,
}

/// Starts every enabled behavior on `tasks`.
///
/// `home` is where the bot first spawned; the drift corrector returns there.
pub fn spawn_enabled(config: &BehaviorConfig, bot: &Bot, home: Position, tasks: &mut JoinSet<()>) {
    if let Some(chat) = &config.chat {
        info!(
            messages = chat.messages.len(),
            repeat = chat.repeat,
            "started chat-messages module"
        );
        tasks.spawn(ChatLoop::new(chat.clone()).run(bot.clone()));
    }

    if let Some(target) = config.move_to {
        if let Err(e) = move_to(bot, target) {
            warn!(error = %e, "move-to-position failed");
        }
    }

    if let Some(anti_afk) = &config.anti_afk {
        info!(sneak = anti_afk.sneak, %home, "started anti-afk module");
        tasks.spawn(AntiAfk::new(anti_afk.clone()).run(bot.clone()));
        tasks.spawn(DriftCorrector::new(home, config.drift.clone()).run(bot.clone()));
    }
}
