//! Scripted chat messages.

use std::time::Duration;

use afkbot_client::Bot;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::BehaviorError;

/// Chat-message settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Messages, in the order they are sent.
    pub messages: Vec<String>,
    /// Cycle through the list forever instead of sending it once.
    pub repeat: bool,
    /// Gap between two repeated messages.
    pub repeat_delay: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            repeat: false,
            repeat_delay: Duration::from_secs(60),
        }
    }
}

impl ChatConfig {
    /// Shortest accepted repeat delay.
    pub const MIN_REPEAT_DELAY: Duration = Duration::from_secs(1);

    /// Clamp out-of-range values. A zero delay would spin the interval.
    pub fn validated(mut self) -> Self {
        if self.repeat && self.repeat_delay < Self::MIN_REPEAT_DELAY {
            warn!(
                delay_ms = self.repeat_delay.as_millis() as u64,
                "chat repeat delay too short, clamping to 1s"
            );
            self.repeat_delay = Self::MIN_REPEAT_DELAY;
        }
        self
    }
}

/// Sends the configured messages, once or on a fixed cadence.
///
/// In repeat mode the first message goes out one full `repeat_delay` after
/// start, then one per delay, wrapping around the list.
pub struct ChatLoop {
    config: ChatConfig,
    next: usize,
}

impl ChatLoop {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config: config.validated(),
            next: 0,
        }
    }

    /// The message the next tick sends; advances the cursor (mod length).
    pub fn next_message(&mut self) -> Option<&str> {
        let len = self.config.messages.len();
        if len == 0 {
            return None;
        }
        let index = self.next;
        self.next = (index + 1) % len;
        Some(&self.config.messages[index])
    }

    /// Runs the loop. Returns immediately when repeat is off.
    pub async fn run(mut self, bot: Bot) {
        if self.config.messages.is_empty() {
            warn!("chat messages enabled but the message list is empty");
            return;
        }

        if !self.config.repeat {
            for message in &self.config.messages {
                send(&bot, message);
            }
            return;
        }

        let delay = self.config.repeat_delay;
        let mut interval = time::interval_at(Instant::now() + delay, delay);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Some(message) = self.next_message() {
                send(&bot, message);
            }
        }
    }
}

fn send(bot: &Bot, message: &str) {
    match bot.chat(message) {
        Ok(()) => debug!(message, "chat message sent"),
        Err(e) => warn!(error = %BehaviorError::from(e), "chat message failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(messages: &[&str], repeat: bool) -> ChatConfig {
        ChatConfig {
            messages: messages.iter().map(|m| m.to_string()).collect(),
            repeat,
            repeat_delay: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_cursor_wraps_around() {
        let mut chat = ChatLoop::new(config(&["a", "b"], true));
        let sent: Vec<String> = (0..5)
            .map(|_| chat.next_message().unwrap().to_string())
            .collect();
        assert_eq!(sent, ["a", "b", "a", "b", "a"]);
    }

    #[test]
    fn test_empty_list_has_no_message() {
        let mut chat = ChatLoop::new(config(&[], true));
        assert!(chat.next_message().is_none());
    }

    #[test]
    fn test_zero_delay_is_clamped() {
        let cfg = ChatConfig {
            repeat_delay: Duration::ZERO,
            ..config(&["a"], true)
        }
        .validated();
        assert_eq!(cfg.repeat_delay, ChatConfig::MIN_REPEAT_DELAY);
    }

    #[test]
    fn test_zero_delay_kept_when_not_repeating() {
        let cfg = ChatConfig {
            repeat_delay: Duration::ZERO,
            ..config(&["a"], false)
        }
        .validated();
        assert_eq!(cfg.repeat_delay, Duration::ZERO);
    }
}
