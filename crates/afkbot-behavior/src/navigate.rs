//! Pathfinder goals: the one-shot move-to-position and the periodic drift
//! corrector that walks the bot back home.

use std::time::Duration;

use afkbot_client::Bot;
use afkbot_protocol::Position;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::BehaviorError;

/// Sends one pathfinder goal to `target`. Fire-and-forget: an unreachable
/// target is the pathfinder's problem, not retried here.
pub fn move_to(bot: &Bot, target: Position) -> Result<(), BehaviorError> {
    info!(%target, "moving to configured position");
    bot.set_goal(target)?;
    Ok(())
}

/// Drift-correction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftConfig {
    /// How often the distance to home is checked.
    pub period: Duration,
    /// Distance from home beyond which the bot is sent back.
    pub threshold: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(300),
            threshold: 3.0,
        }
    }
}

/// Periodically returns the bot to where it first spawned.
pub struct DriftCorrector {
    home: Position,
    config: DriftConfig,
}

impl DriftCorrector {
    pub fn new(home: Position, config: DriftConfig) -> Self {
        Self { home, config }
    }

    pub fn home(&self) -> Position {
        self.home
    }

    /// The goal to issue for `current`, or `None` when close enough.
    pub fn check(&self, current: Position) -> Option<Position> {
        (current.distance_to(&self.home) > self.config.threshold).then(|| self.home.floor())
    }

    /// Checks once per period, forever. The first check is one period in.
    pub async fn run(self, bot: Bot) {
        let period = self.config.period.max(Duration::from_millis(1));
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let current = bot.position();
            let Some(goal) = self.check(current) else {
                continue;
            };
            match bot.set_goal(goal) {
                Ok(()) => info!(
                    %goal,
                    distance = current.distance_to(&self.home),
                    "drifted from start position, returning"
                ),
                Err(e) => warn!(error = %BehaviorError::from(e), "drift correction failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corrector() -> DriftCorrector {
        DriftCorrector::new(Position::new(0.0, 0.0, 0.0), DriftConfig::default())
    }

    #[test]
    fn test_far_from_home_goes_back() {
        assert_eq!(
            corrector().check(Position::new(3.0, 0.0, 4.0)),
            Some(Position::new(0.0, 0.0, 0.0))
        );
    }

    #[test]
    fn test_close_to_home_stays() {
        assert_eq!(corrector().check(Position::new(2.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(corrector().check(Position::new(3.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_goal_is_floored_home() {
        let c = DriftCorrector::new(Position::new(10.7, 64.0, -5.2), DriftConfig::default());
        assert_eq!(
            c.check(Position::new(100.0, 64.0, 0.0)),
            Some(Position::new(10.0, 64.0, -6.0))
        );
    }
}
