use anyhow::Result;
use callisto::cli::{run_session, Cli, DemoBot};
use callisto::{logging, Client, WebSocketConnector};
use clap::Parser;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init(config.log_level);
    info!(
        "Starting {} against {}",
        config.bot.username, config.websocket.uri
    );

    let mut client = Client::new(config, WebSocketConnector::new());
    DemoBot::new(cli.prefix.clone()).register(&mut client);

    if !client.connect() {
        anyhow::bail!("Could not start a connection; see the log for details");
    }

    let interrupted = tokio::select! {
        result = run_session(&mut client) => {
            result?;
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        info!("Interrupted, disconnecting");
        client.disconnect();
        // Let the close handshake finish before exiting
        if tokio::time::timeout(Duration::from_secs(5), run_session(&mut client))
            .await
            .is_err()
        {
            warn!("Server did not acknowledge the close in time");
        }
    }

    info!("Goodbye");
    Ok(())
}
