//! Unified error type for the afkbot binary and library facade.
//!
//! Only startup and the health endpoint can fail the process. Everything
//! below the facade (link, handshake, behaviors) is logged where it happens
//! and never surfaces here.

use crate::config::ConfigError;

/// Top-level error for the `afkbot` binary.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum AfkBotError {
    /// The settings document is missing or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The health endpoint could not bind or serve.
    #[error("health endpoint: {0}")]
    Io(#[from] std::io::Error),
}
