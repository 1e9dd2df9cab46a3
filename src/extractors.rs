use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Shape checks a request body must pass before any integration is called.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// JSON body that has been deserialized and validated. Either failure becomes
/// `ApiError::ValidationFailed`.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::ValidationFailed(rejection.body_text()))?;
        body.validate().map_err(ApiError::ValidationFailed)?;
        Ok(ValidJson(body))
    }
}
