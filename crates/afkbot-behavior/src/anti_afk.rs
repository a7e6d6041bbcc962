//! Randomized anti-idle movement.
//!
//! Servers kick players that stand perfectly still. Every few seconds the
//! bot takes a short walk in a random direction, sometimes turns its head,
//! jumps or sneaks, then waits a random pause before the next firing.
//!
//! # Loop shape
//!
//! ```text
//! sleep(first_delay)
//! loop {
//!     plan   ── all randomness drawn up front
//!     perform ── errors are logged, never propagated
//!     sleep(pause)   ← always reached, whatever perform did
//! }
//! ```
//!
//! The reschedule sits after the error boundary, so a failing firing can
//! never end the chain.

use std::ops::Range;
use std::time::Duration;

use afkbot_client::Bot;
use afkbot_protocol::Control;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time;
use tracing::{debug, warn};

use crate::BehaviorError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Anti-afk settings. Defaults reproduce the classic afk-bot timings.
#[derive(Debug, Clone, PartialEq)]
pub struct AntiAfkConfig {
    /// Allow the occasional sneak.
    pub sneak: bool,
    /// Delay between spawn and the first firing.
    pub first_delay: Duration,
    /// How long a walk is held, in milliseconds (half-open).
    pub walk_ms: Range<u64>,
    /// Pause between firings, in milliseconds (half-open).
    pub pause_ms: Range<u64>,
    /// Probability of turning the head on a firing.
    pub look_chance: f64,
    /// Largest yaw change in degrees, either way.
    pub max_yaw_delta_deg: f32,
    /// Probability of a jump on a firing.
    pub jump_chance: f64,
    pub jump_hold: Duration,
    /// Probability of a sneak on a firing (only when `sneak` is on).
    pub sneak_chance: f64,
    pub sneak_hold: Duration,
}

impl Default for AntiAfkConfig {
    fn default() -> Self {
        Self {
            sneak: false,
            first_delay: Duration::from_millis(5_000),
            walk_ms: 500..1_500,
            pause_ms: 5_000..15_000,
            look_chance: 0.6,
            max_yaw_delta_deg: 45.0,
            jump_chance: 0.2,
            jump_hold: Duration::from_millis(300),
            sneak_chance: 0.1,
            sneak_hold: Duration::from_millis(500),
        }
    }
}

impl AntiAfkConfig {
    /// Fix anything that would make the random draws panic.
    ///
    /// - empty ranges are widened to one millisecond
    /// - probabilities are clamped to `0.0..=1.0`
    /// - the yaw limit is made non-negative
    pub fn validated(mut self) -> Self {
        if self.walk_ms.is_empty() {
            self.walk_ms = self.walk_ms.start..self.walk_ms.start + 1;
        }
        if self.pause_ms.is_empty() {
            self.pause_ms = self.pause_ms.start..self.pause_ms.start + 1;
        }
        self.look_chance = self.look_chance.clamp(0.0, 1.0);
        self.jump_chance = self.jump_chance.clamp(0.0, 1.0);
        self.sneak_chance = self.sneak_chance.clamp(0.0, 1.0);
        self.max_yaw_delta_deg = self.max_yaw_delta_deg.abs();
        self
    }
}

// ---------------------------------------------------------------------------
// Firing plan
// ---------------------------------------------------------------------------

/// What one firing will do, decided before anything is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Firing {
    pub direction: Control,
    pub walk_for: Duration,
    /// Yaw change in radians, if the head turns this time.
    pub yaw_delta: Option<f32>,
    pub jump: bool,
    pub sneak: bool,
    /// Wait before the next firing.
    pub pause: Duration,
}

/// Counters kept across firings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AntiAfkStats {
    pub firings: u64,
    /// Firings whose actions hit an error.
    pub failed: u64,
    /// Next firings scheduled. Equal to `firings` by construction.
    pub reschedules: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// The anti-idle loop.
pub struct AntiAfk<R = StdRng> {
    config: AntiAfkConfig,
    rng: R,
    stats: AntiAfkStats,
}

impl AntiAfk<StdRng> {
    /// An anti-afk loop seeded from the OS.
    pub fn new(config: AntiAfkConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// An anti-afk loop with a fixed seed, for reproducible runs.
    pub fn seeded(config: AntiAfkConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> AntiAfk<R> {
    pub fn with_rng(config: AntiAfkConfig, rng: R) -> Self {
        Self {
            config: config.validated(),
            rng,
            stats: AntiAfkStats::default(),
        }
    }

    pub fn stats(&self) -> &AntiAfkStats {
        &self.stats
    }

    /// Draws the next firing.
    pub fn plan(&mut self) -> Firing {
        let cfg = &self.config;
        let rng = &mut self.rng;

        let direction = Control::DIRECTIONS[rng.random_range(0..Control::DIRECTIONS.len())];
        let walk_for = Duration::from_millis(rng.random_range(cfg.walk_ms.clone()));

        let yaw_delta = rng.random_bool(cfg.look_chance).then(|| {
            let max = cfg.max_yaw_delta_deg;
            rng.random_range(-max..=max).to_radians()
        });

        let jump = rng.random_bool(cfg.jump_chance);
        let sneak = cfg.sneak && rng.random_bool(cfg.sneak_chance);
        let pause = Duration::from_millis(rng.random_range(cfg.pause_ms.clone()));

        Firing {
            direction,
            walk_for,
            yaw_delta,
            jump,
            sneak,
            pause,
        }
    }

    /// Performs one firing and returns the pause before the next one.
    ///
    /// Never fails: action errors are logged and counted, and the next
    /// firing is scheduled regardless.
    pub async fn fire(&mut self, bot: &Bot) -> Duration {
        let firing = self.plan();
        self.stats.firings += 1;

        if let Err(e) = perform(bot, &firing, &self.config).await {
            self.stats.failed += 1;
            warn!(error = %e, "anti-afk firing failed");
        }

        self.stats.reschedules += 1;
        debug!(
            pause_ms = firing.pause.as_millis() as u64,
            firing = self.stats.firings,
            "anti-afk rescheduled"
        );
        firing.pause
    }
}

impl<R: Rng + Send + 'static> AntiAfk<R> {
    /// Runs forever; cancel by aborting the task.
    pub async fn run(mut self, bot: Bot) {
        time::sleep(self.config.first_delay).await;
        loop {
            let pause = self.fire(&bot).await;
            time::sleep(pause).await;
        }
    }
}

async fn perform(bot: &Bot, firing: &Firing, cfg: &AntiAfkConfig) -> Result<(), BehaviorError> {
    hold(bot, firing.direction, firing.walk_for).await?;

    if let Some(delta) = firing.yaw_delta {
        let entity = bot.entity();
        bot.look(entity.yaw + delta, entity.pitch, true)?;
    }
    if firing.jump {
        hold(bot, Control::Jump, cfg.jump_hold).await?;
    }
    if firing.sneak {
        hold(bot, Control::Sneak, cfg.sneak_hold).await?;
    }
    Ok(())
}

/// Presses `control`, waits, releases it.
async fn hold(bot: &Bot, control: Control, duration: Duration) -> Result<(), BehaviorError> {
    bot.set_control(control, true)?;
    time::sleep(duration).await;
    bot.set_control(control, false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let cfg = AntiAfkConfig::default();
        assert_eq!(cfg.first_delay, Duration::from_secs(5));
        assert_eq!(cfg.walk_ms, 500..1_500);
        assert_eq!(cfg.pause_ms, 5_000..15_000);
        assert!(!cfg.sneak);
    }

    #[test]
    fn test_validated_repairs_bad_values() {
        let cfg = AntiAfkConfig {
            walk_ms: 800..800,
            look_chance: 1.7,
            jump_chance: -0.5,
            max_yaw_delta_deg: -30.0,
            ..AntiAfkConfig::default()
        }
        .validated();
        assert_eq!(cfg.walk_ms, 800..801);
        assert_eq!(cfg.look_chance, 1.0);
        assert_eq!(cfg.jump_chance, 0.0);
        assert_eq!(cfg.max_yaw_delta_deg, 30.0);
    }

    #[test]
    fn test_plan_stays_in_bounds() {
        let mut afk = AntiAfk::seeded(
            AntiAfkConfig {
                sneak: true,
                ..AntiAfkConfig::default()
            },
            7,
        );
        let max_yaw = 45f32.to_radians();
        for _ in 0..500 {
            let f = afk.plan();
            assert!(Control::DIRECTIONS.contains(&f.direction));
            assert!(f.walk_for >= Duration::from_millis(500));
            assert!(f.walk_for < Duration::from_millis(1_500));
            assert!(f.pause >= Duration::from_millis(5_000));
            assert!(f.pause < Duration::from_millis(15_000));
            if let Some(delta) = f.yaw_delta {
                assert!(delta.abs() <= max_yaw + f32::EPSILON);
            }
        }
    }

    #[test]
    fn test_no_sneak_unless_enabled() {
        let mut afk = AntiAfk::seeded(
            AntiAfkConfig {
                sneak: false,
                sneak_chance: 1.0,
                ..AntiAfkConfig::default()
            },
            3,
        );
        assert!((0..200).all(|_| !afk.plan().sneak));
    }

    #[test]
    fn test_same_seed_same_plan() {
        let mut a = AntiAfk::seeded(AntiAfkConfig::default(), 99);
        let mut b = AntiAfk::seeded(AntiAfkConfig::default(), 99);
        for _ in 0..20 {
            assert_eq!(a.plan(), b.plan());
        }
    }
}
