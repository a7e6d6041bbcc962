use std::process::ExitCode;

use afkbot::config::{self, Settings};
use afkbot::{AfkBotError, health, init_logging, runner};
use afkbot_client::BridgeConnector;
use afkbot_session::SessionController;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AfkBotError> {
    let path = config::resolve_path(
        std::env::args().nth(1),
        std::env::var(config::CONFIG_ENV).ok(),
    );
    info!(path = %path.display(), "loading settings");
    let settings = Settings::load(&path)?;

    let listener = health::bind(settings.web.port).await?;

    let connector = BridgeConnector::websocket(settings.bridge.url.clone());
    info!(bridge = %connector.url(), "afkbot starting");
    let controller = SessionController::new(connector, settings.session_config());

    runner::run(controller, listener).await
}
