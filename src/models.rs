//! Document shapes. The store does not enforce them; they are checked with
//! `validate()` right before a write.

// Account, subscription and connection shapes are written by other services.
#![allow(dead_code)]

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

/// Account record (collection `appuser`). Registration lives outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppUser {
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub stripe_customer_id: Option<String>,
    #[serde(default = "default_subscription_status")]
    pub subscription_status: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

fn default_subscription_status() -> String {
    "inactive".into()
}

impl AppUser {
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_email(&self.email) {
            return Err("Invalid email".into());
        }
        require("password_hash", &self.password_hash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Month,
    Year,
}

impl BillingInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            BillingInterval::Month => "month",
            BillingInterval::Year => "year",
        }
    }
}

/// Catalog entry (collection `plan`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub interval: BillingInterval,
    pub stripe_price_id: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Plan {
    pub fn validate(&self) -> Result<(), String> {
        require("name", &self.name)?;
        require("stripe_price_id", &self.stripe_price_id)?;
        if self.price_cents < 0 {
            return Err("price_cents must be non-negative".into());
        }
        Ok(())
    }
}

/// Provider subscription mirror (collection `subscription`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: String,
    pub stripe_subscription_id: String,
    pub stripe_customer_id: String,
    pub status: String,
    pub plan_price_id: String,
    pub current_period_end: Option<i64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Subscription {
    pub fn validate(&self) -> Result<(), String> {
        require("user_id", &self.user_id)?;
        require("stripe_subscription_id", &self.stripe_subscription_id)?;
        require("stripe_customer_id", &self.stripe_customer_id)?;
        require("status", &self.status)?;
        require("plan_price_id", &self.plan_price_id)
    }
}

/// Identity-provider link for a user (collection `googleconnection`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConnection {
    pub user_id: String,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    pub token_expiry: Option<i64>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl GoogleConnection {
    pub fn validate(&self) -> Result<(), String> {
        require("user_id", &self.user_id)?;
        if self.access_token.is_none() && self.refresh_token.is_none() {
            return Err("a connection needs an access or refresh token".into());
        }
        Ok(())
    }
}

/// Audit copy of an accepted webhook (collection `stripeevent`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
}

impl StripeEvent {
    pub fn validate(&self) -> Result<(), String> {
        require("type", &self.event_type)
    }
}
