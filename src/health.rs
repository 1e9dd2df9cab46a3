use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

const SET: &str = "✅ Set";
const NOT_SET: &str = "❌ Not Set";
const MAX_LISTED_COLLECTIONS: usize = 10;

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/test", get(store_diagnostics))
}

#[derive(Debug, Serialize)]
pub struct RootStatus {
    pub message: &'static str,
    pub stripe: bool,
    pub customer_portal: bool,
}

pub async fn root(State(state): State<AppState>) -> Json<RootStatus> {
    Json(RootStatus {
        message: "Backend ready",
        stripe: state.payments.is_configured(),
        customer_portal: state.config.stripe.customer_portal_url.is_some(),
    })
}

#[derive(Debug, Serialize)]
pub struct StoreDiagnostics {
    pub backend: &'static str,
    pub database: String,
    pub database_url: &'static str,
    pub database_name: &'static str,
    pub connection_status: &'static str,
    pub collections: Vec<String>,
}

fn set_or_not(value: &Option<String>) -> &'static str {
    if value.is_some() {
        SET
    } else {
        NOT_SET
    }
}

/// Human-oriented store report. Never fails; problems show up in the text.
pub async fn store_diagnostics(State(state): State<AppState>) -> Json<StoreDiagnostics> {
    let mut report = StoreDiagnostics {
        backend: "✅ Running",
        database: "❌ Not Available".into(),
        database_url: set_or_not(&state.config.store.url),
        database_name: set_or_not(&state.config.store.database),
        connection_status: "Not Connected",
        collections: Vec::new(),
    };

    if state.store.database_name().is_some() {
        report.connection_status = "Connected";
        match state.store.list_collection_names().await {
            Ok(mut names) => {
                names.truncate(MAX_LISTED_COLLECTIONS);
                report.collections = names;
                report.database = "✅ Connected & Working".into();
            }
            Err(e) => {
                warn!(error = %e, "collection listing failed");
                let short: String = e.to_string().chars().take(50).collect();
                report.database = format!("⚠️ Connected but Error: {short}");
            }
        }
    } else {
        report.database = "⚠️ Available but not initialized".into();
    }

    Json(report)
}
