mod dto;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use services::GoogleOAuth;

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("Failed to exchange code")]
    TokenExchangeFailed(String),
}

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::google_routes())
}
