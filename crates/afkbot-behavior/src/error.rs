//! Error types for the behavior schedulers.

use afkbot_client::ClientError;

/// Something went wrong inside one scheduler firing.
///
/// These never escape the scheduler: each firing catches, logs, and moves
/// on to its next run.
#[derive(Debug, thiserror::Error)]
pub enum BehaviorError {
    /// A command could not be delivered to the game client.
    #[error("behavior command failed: {0}")]
    Client(#[from] ClientError),
}
