mod app;
mod billing;
mod config;
mod error;
mod extractors;
mod google;
mod health;
mod models;
mod plans;
mod state;
mod store;
#[cfg(test)]
mod testing;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "listingdesk=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env();
    let app_state = AppState::init(config).await;

    // Runs before the listener binds, so nothing else writes plans yet.
    plans::seed_if_empty(
        app_state.store.as_ref(),
        &app_state.sink,
        &app_state.config.stripe,
    )
    .await;

    app::serve(app::build_app(app_state)).await
}
