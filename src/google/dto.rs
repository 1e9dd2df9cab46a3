use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extractors::Validate;
use crate::models::require;

#[derive(Debug, Serialize)]
pub struct OAuthUrlResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackRequest {
    pub code: String,
}

impl Validate for OAuthCallbackRequest {
    fn validate(&self) -> Result<(), String> {
        require("code", &self.code)
    }
}

#[derive(Debug, Serialize)]
pub struct OAuthCallbackResponse {
    pub connected: bool,
    pub tokens: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    #[serde(rename = "storeCode")]
    pub store_code: String,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub connected: bool,
    pub locations: Vec<Location>,
}
