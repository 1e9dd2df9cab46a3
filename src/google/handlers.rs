use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{LocationsResponse, OAuthCallbackRequest, OAuthCallbackResponse, OAuthUrlResponse};
use super::services::AuthorizationUrl;
use crate::{error::ApiError, extractors::ValidJson, state::AppState};

pub fn google_routes() -> Router<AppState> {
    Router::new()
        .route("/api/google/oauth/url", get(oauth_url))
        .route("/api/google/oauth/callback", post(oauth_callback))
        .route("/api/google/locations", get(list_locations))
}

pub async fn oauth_url(State(state): State<AppState>) -> Json<OAuthUrlResponse> {
    let body = match state.google.authorization_url() {
        AuthorizationUrl::Ready(url) => OAuthUrlResponse {
            ready: true,
            url: Some(url.into()),
            message: None,
        },
        AuthorizationUrl::NotConfigured(message) => OAuthUrlResponse {
            ready: false,
            url: None,
            message: Some(message),
        },
    };
    Json(body)
}

#[instrument(skip_all)]
pub async fn oauth_callback(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<OAuthCallbackRequest>,
) -> Result<Json<OAuthCallbackResponse>, ApiError> {
    let tokens = state.google.exchange_code(&payload.code).await?;
    Ok(Json(OAuthCallbackResponse {
        connected: true,
        tokens,
    }))
}

pub async fn list_locations(State(state): State<AppState>) -> Json<LocationsResponse> {
    let (connected, locations) = state.google.connected_locations().await;
    Json(LocationsResponse {
        connected,
        locations,
    })
}
