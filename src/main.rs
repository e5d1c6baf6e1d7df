use std::sync::Arc;

use papertrade::api::routes::{AppState, app_router};
use papertrade::config::Config;
use papertrade::ledger::PgLedger;
use papertrade::persistence::create_pool_and_migrate;
use papertrade::quotes::IexClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "papertrade=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let pool = create_pool_and_migrate(&config.database_url).await?;
    let quotes = IexClient::new(config.quote_api_url.clone(), config.api_key.clone())?;

    let app_state = AppState {
        ledger: Arc::new(PgLedger::new(pool)),
        quotes: Arc::new(quotes),
        jwt_secret: config.jwt_secret.clone(),
        starting_cash: config.starting_cash,
    };

    let app = app_router(app_state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
