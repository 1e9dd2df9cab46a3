use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{billing::BillingError, google::OAuthError, store::StoreError};

/// Failures surfaced to HTTP callers. Integration errors convert into this at
/// the handler boundary; nothing below the API layer builds responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    ConfigurationMissing(String),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("{0}")]
    ExternalService(String),

    #[error("Database not configured")]
    StoreUnavailable,

    #[error("{0}")]
    SignatureInvalid(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ConfigurationMissing(_)
            | ApiError::ValidationFailed(_)
            | ApiError::ExternalService(_)
            | ApiError::SignatureInvalid(_) => StatusCode::BAD_REQUEST,
            ApiError::StoreUnavailable | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable => ApiError::StoreUnavailable,
            StoreError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(e: BillingError) -> Self {
        match e {
            BillingError::NotConfigured => ApiError::ConfigurationMissing(e.to_string()),
            BillingError::Request(msg) => ApiError::ExternalService(msg),
            BillingError::InvalidSignature(msg) | BillingError::InvalidPayload(msg) => {
                ApiError::SignatureInvalid(msg)
            }
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::NotConfigured => ApiError::ConfigurationMissing(e.to_string()),
            OAuthError::TokenExchangeFailed(ref detail) => {
                tracing::debug!(%detail, "token exchange failure detail");
                ApiError::ExternalService(e.to_string())
            }
        }
    }
}
