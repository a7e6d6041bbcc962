//! Runs the bot next to its health endpoint.

use afkbot_client::GameConnector;
use afkbot_session::SessionController;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tracing::info;

use crate::{AfkBotError, health};

/// Serves the health endpoint and runs `controller`.
///
/// A controller that stops (auto-reconnect off) does not end the process:
/// the health endpoint keeps answering. Only a failing health server
/// returns.
pub async fn run<C: GameConnector>(
    controller: SessionController<C>,
    listener: TcpListener,
) -> Result<(), AfkBotError> {
    let mut health = tokio::spawn(health::serve(listener));

    tokio::select! {
        () = controller.run() => {
            info!("bot offline, auto-reconnect disabled; health endpoint stays up");
        }
        served = &mut health => return health_exit(served),
    }
    health_exit(health.await)
}

fn health_exit(served: Result<std::io::Result<()>, JoinError>) -> Result<(), AfkBotError> {
    match served {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(std::io::Error::other(e).into()),
    }
}
