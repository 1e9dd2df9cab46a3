use serde::{Deserialize, Serialize};

use crate::extractors::Validate;
use crate::models::{is_valid_email, require};

#[derive(Debug, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    pub price_id: String,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl Validate for CreateCheckoutSessionRequest {
    fn validate(&self) -> Result<(), String> {
        require("price_id", &self.price_id)?;
        if !is_valid_email(self.customer_email.trim()) {
            return Err("customer_email: value is not a valid email address".into());
        }
        require("success_url", &self.success_url)?;
        require("cancel_url", &self.cancel_url)
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePortalSessionRequest {
    pub customer_id: String,
    pub return_url: String,
}

impl Validate for CreatePortalSessionRequest {
    fn validate(&self) -> Result<(), String> {
        require("customer_id", &self.customer_id)?;
        require("return_url", &self.return_url)
    }
}

#[derive(Debug, Serialize)]
pub struct PortalSessionResponse {
    pub url: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
}
