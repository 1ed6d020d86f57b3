//! Entry point: load config, build the broker client, and run the bridge.

use privatepub::config::Config;
use privatepub::{create_app, AppState, PubSubClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = PubSubClient::new(config.client.clone())?;
    let state = AppState::new(config.app_key.clone(), client);
    let app = create_app(state);

    tracing::info!(addr = %config.server_addr, broker = %config.client.server, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
