mod dto;
pub mod gateway;
pub mod handlers;
pub mod webhook;

use crate::state::AppState;
use axum::Router;

pub use gateway::{PaymentGateway, StripeGateway};
pub use webhook::WebhookProcessor;

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("Stripe not configured")]
    NotConfigured,

    #[error("{0}")]
    Request(String),

    #[error("{0}")]
    InvalidSignature(String),

    #[error("{0}")]
    InvalidPayload(String),
}

pub type BillingResult<T> = Result<T, BillingError>;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::stripe_routes())
}
