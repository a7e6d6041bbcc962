//! The [`Bot`] handle and its [`EventStream`].
//!
//! A connection is split in two halves:
//!
//! - [`Bot`]: cheap to clone, handed to every scheduler. Sends commands
//!   and reads the last known entity state.
//! - [`EventStream`]: owned by exactly one task (the session loop).
//!   Pulling an event from it also updates the entity state and fans chat
//!   lines out to [`ChatSubscription`]s.
//!
//! Entity state and chat only move forward while someone polls the
//! `EventStream`. That is what makes the session loop the single writer.

use std::sync::Arc;

use afkbot_protocol::{BotCommand, BotEvent, Control, EntityState, Position};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinSet;

use crate::ClientError;

/// How many chat lines a slow subscriber may fall behind before it starts
/// losing the oldest ones.
const CHAT_CAPACITY: usize = 64;

/// One chat line as the game client rendered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub text: String,
    /// `Some(name)` for player chat, `None` for server/system messages.
    pub sender: Option<String>,
}

struct Shared {
    commands: mpsc::UnboundedSender<BotCommand>,
    entity: watch::Sender<EntityState>,
    chat: broadcast::Sender<ChatLine>,
}

/// Handle to a live game connection.
#[derive(Clone)]
pub struct Bot {
    shared: Arc<Shared>,
}

impl Bot {
    /// Creates a bot handle plus the raw ends a connector wires up.
    pub(crate) fn channel() -> (
        Bot,
        EventStream,
        mpsc::UnboundedReceiver<BotCommand>,
        mpsc::UnboundedSender<BotEvent>,
    ) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        let (entity, _) = watch::channel(EntityState::default());
        let (chat, _) = broadcast::channel(CHAT_CAPACITY);

        let bot = Bot {
            shared: Arc::new(Shared {
                commands,
                entity,
                chat,
            }),
        };
        let stream = EventStream {
            bot: bot.clone(),
            events,
            tasks: JoinSet::new(),
        };
        (bot, stream, command_rx, event_tx)
    }

    fn send(&self, command: BotCommand) -> Result<(), ClientError> {
        self.shared
            .commands
            .send(command)
            .map_err(|_| ClientError::Closed)
    }

    /// Sends a chat line (or a `/command`).
    ///
    /// The text is not logged here: auth commands carry the password.
    pub fn chat(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.send(BotCommand::Chat { text: text.into() })
    }

    /// Presses or releases a movement control.
    pub fn set_control(&self, control: Control, state: bool) -> Result<(), ClientError> {
        self.send(BotCommand::SetControl { control, state })
    }

    /// Turns the head to an absolute yaw/pitch (radians).
    pub fn look(&self, yaw: f32, pitch: f32, force: bool) -> Result<(), ClientError> {
        self.send(BotCommand::Look { yaw, pitch, force })
    }

    /// Hands a block goal to the pathfinder.
    pub fn set_goal(&self, goal: Position) -> Result<(), ClientError> {
        self.send(BotCommand::SetGoal { goal })
    }

    /// Asks the game client to leave the server.
    pub fn quit(&self) -> Result<(), ClientError> {
        self.send(BotCommand::Quit)
    }

    /// Last known entity state.
    pub fn entity(&self) -> EntityState {
        *self.shared.entity.borrow()
    }

    /// Last known position.
    pub fn position(&self) -> Position {
        self.shared.entity.borrow().position
    }

    /// Registers a chat listener.
    ///
    /// Only lines that arrive *after* this call are seen, so subscribe
    /// before sending whatever the reply is expected for.
    pub fn subscribe_chat(&self) -> ChatSubscription {
        ChatSubscription {
            rx: self.shared.chat.subscribe(),
        }
    }

    fn apply(&self, event: &BotEvent) {
        match event {
            BotEvent::Spawn { entity } | BotEvent::Move { entity } => {
                self.shared.entity.send_replace(*entity);
            }
            BotEvent::Chat { text, sender } => {
                // No subscribers is fine: nobody is waiting for a reply.
                let _ = self.shared.chat.send(ChatLine {
                    text: text.clone(),
                    sender: sender.clone(),
                });
            }
            _ => {}
        }
    }
}

/// A chat listener created by [`Bot::subscribe_chat`].
pub struct ChatSubscription {
    rx: broadcast::Receiver<ChatLine>,
}

impl ChatSubscription {
    /// Waits for the next chat line.
    ///
    /// Returns `None` once the connection is gone for good.
    pub async fn next_line(&mut self) -> Option<ChatLine> {
        loop {
            match self.rx.recv().await {
                Ok(line) => return Some(line),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "chat listener fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// The receiving half of a game connection.
///
/// Dropping it aborts the tasks pumping the underlying link.
pub struct EventStream {
    bot: Bot,
    events: mpsc::UnboundedReceiver<BotEvent>,
    tasks: JoinSet<()>,
}

impl EventStream {
    /// Waits for the next event and applies it to the bot's state.
    ///
    /// Returns `None` when the link closed without an explicit `End`.
    pub async fn next(&mut self) -> Option<BotEvent> {
        let event = self.events.recv().await?;
        self.bot.apply(&event);
        Some(event)
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut JoinSet<()> {
        &mut self.tasks
    }
}

/// An open game connection: the command handle and its event stream.
pub struct Link {
    pub bot: Bot,
    pub events: EventStream,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commands_reach_the_link() {
        let (bot, _events, mut commands, _tx) = Bot::channel();
        bot.chat("hello").unwrap();
        bot.set_control(Control::Left, true).unwrap();

        assert_eq!(
            commands.recv().await,
            Some(BotCommand::Chat { text: "hello".into() })
        );
        assert_eq!(
            commands.recv().await,
            Some(BotCommand::SetControl { control: Control::Left, state: true })
        );
    }

    #[tokio::test]
    async fn test_send_after_link_dropped_is_closed() {
        let (bot, _events, commands, _tx) = Bot::channel();
        drop(commands);
        assert!(matches!(bot.chat("anyone?"), Err(ClientError::Closed)));
    }

    #[tokio::test]
    async fn test_entity_updates_only_when_polled() {
        let (bot, mut events, _commands, tx) = Bot::channel();
        let entity = EntityState {
            position: Position::new(10.0, 64.0, 10.0),
            yaw: 1.0,
            pitch: 0.0,
        };
        tx.send(BotEvent::Spawn { entity }).unwrap();
        assert_eq!(bot.position(), Position::default());

        events.next().await.unwrap();
        assert_eq!(bot.entity(), entity);
    }

    #[tokio::test]
    async fn test_chat_subscription_sees_only_later_lines() {
        let (bot, mut events, _commands, tx) = Bot::channel();

        tx.send(BotEvent::Chat { text: "before".into(), sender: None }).unwrap();
        events.next().await.unwrap();

        let mut sub = bot.subscribe_chat();
        tx.send(BotEvent::Chat { text: "after".into(), sender: Some("steve".into()) }).unwrap();
        events.next().await.unwrap();

        let line = sub.next_line().await.unwrap();
        assert_eq!(line.text, "after");
        assert_eq!(line.sender.as_deref(), Some("steve"));
    }

    #[tokio::test]
    async fn test_stream_ends_when_sender_dropped() {
        let (_bot, mut events, _commands, tx) = Bot::channel();
        drop(tx);
        assert!(events.next().await.is_none());
    }
}
