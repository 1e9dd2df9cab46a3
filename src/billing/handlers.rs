use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument};

use super::dto::{
    CheckoutSessionResponse, CreateCheckoutSessionRequest, CreatePortalSessionRequest,
    PortalSessionResponse, WebhookAck,
};
use super::gateway::CheckoutParams;
use super::webhook::{WebhookOutcome, SIGNATURE_HEADER};
use crate::{error::ApiError, extractors::ValidJson, state::AppState};

pub fn stripe_routes() -> Router<AppState> {
    Router::new()
        .route("/api/stripe/create-checkout-session", post(create_checkout_session))
        .route("/api/stripe/create-portal-session", post(create_portal_session))
        .route("/api/stripe/webhook", post(stripe_webhook))
}

#[instrument(skip(state, payload))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateCheckoutSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>, ApiError> {
    let params = CheckoutParams {
        price_id: payload.price_id,
        customer_email: payload.customer_email.trim().to_string(),
        success_url: payload.success_url,
        cancel_url: payload.cancel_url,
    };
    let session = state.payments.create_checkout_session(&params).await?;
    info!(session_id = %session.id, "checkout session issued");
    Ok(Json(CheckoutSessionResponse {
        id: session.id,
        url: session.url,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_portal_session(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreatePortalSessionRequest>,
) -> Result<Json<PortalSessionResponse>, ApiError> {
    let session = state
        .payments
        .create_portal_session(&payload.customer_id, &payload.return_url)
        .await?;
    Ok(Json(PortalSessionResponse { url: session.url }))
}

#[instrument(skip_all)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let outcome = state.webhooks.process(&body, signature).await?;
    let skipped = matches!(outcome, WebhookOutcome::Skipped).then_some(true);
    Ok(Json(WebhookAck {
        received: true,
        skipped,
    }))
}
