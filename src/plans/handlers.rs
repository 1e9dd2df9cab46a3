use axum::{extract::State, routing::get, Json, Router};
use tracing::{instrument, warn};

use super::dto::PlanView;
use super::services::list_plans;
use crate::state::AppState;

pub fn plan_routes() -> Router<AppState> {
    Router::new().route("/api/plans", get(get_plans))
}

/// Every stored plan in insertion order. An unreachable store reads as an
/// empty catalog.
#[instrument(skip(state))]
pub async fn get_plans(State(state): State<AppState>) -> Json<Vec<PlanView>> {
    match list_plans(state.store.as_ref()).await {
        Ok(plans) => Json(plans),
        Err(e) => {
            warn!(error = %e, "plan catalog unavailable; returning empty list");
            Json(Vec::new())
        }
    }
}
