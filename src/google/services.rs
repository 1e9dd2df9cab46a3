use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, instrument, warn};
use url::Url;

use super::dto::Location;
use super::OAuthError;
use crate::config::GoogleConfig;
use crate::store::{BestEffortSink, DocumentStore, GOOGLE_CONNECTION};

pub const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/business.manage",
    "openid",
    "email",
    "profile",
];

pub const REDACTED: &str = "***";

pub const NOT_CONFIGURED_HINT: &str =
    "Google OAuth not configured. Add GOOGLE_CLIENT_ID/SECRET/REDIRECT_URI.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationUrl {
    Ready(Url),
    /// Configuration is incomplete; carries a remediation hint.
    NotConfigured(String),
}

/// Replace every value but `scope` with [`REDACTED`].
pub fn mask_tokens(tokens: &Map<String, Value>) -> Map<String, Value> {
    tokens
        .iter()
        .map(|(k, v)| {
            let shown = if k == "scope" {
                v.clone()
            } else {
                Value::String(REDACTED.into())
            };
            (k.clone(), shown)
        })
        .collect()
}

/// Authorization-code flow against Google plus the connected-location listing.
#[derive(Clone)]
pub struct GoogleOAuth {
    config: GoogleConfig,
    http: reqwest::Client,
    store: Arc<dyn DocumentStore>,
    sink: BestEffortSink,
}

impl GoogleOAuth {
    pub fn new(config: GoogleConfig, store: Arc<dyn DocumentStore>) -> Self {
        let sink = BestEffortSink::new(store.clone());
        Self {
            config,
            http: reqwest::Client::new(),
            store,
            sink,
        }
    }

    pub fn authorization_url(&self) -> AuthorizationUrl {
        let (Some(client_id), Some(redirect_uri)) = (
            self.config.client_id.as_deref(),
            self.config.redirect_uri.as_deref(),
        ) else {
            return AuthorizationUrl::NotConfigured(NOT_CONFIGURED_HINT.into());
        };

        let mut url = match Url::parse(&self.config.auth_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "GOOGLE_AUTH_URL is not a valid url");
                return AuthorizationUrl::NotConfigured(format!("Invalid GOOGLE_AUTH_URL: {e}"));
            }
        };
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("access_type", "offline")
            // forces a refresh token even when the user consented before
            .append_pair("prompt", "consent");
        AuthorizationUrl::Ready(url)
    }

    /// Trade an authorization code for tokens. The raw token response is
    /// stored best-effort; the caller only gets the masked copy.
    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<Map<String, Value>, OAuthError> {
        let (Some(client_id), Some(client_secret), Some(redirect_uri)) = (
            self.config.client_id.as_deref(),
            self.config.client_secret.as_deref(),
            self.config.redirect_uri.as_deref(),
        ) else {
            return Err(OAuthError::NotConfigured);
        };

        let form = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "token endpoint rejected the code");
            return Err(OAuthError::TokenExchangeFailed(format!(
                "token endpoint returned {status}"
            )));
        }

        let tokens = match response.json::<Value>().await {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(OAuthError::TokenExchangeFailed(
                    "token response is not an object".into(),
                ))
            }
            Err(e) => {
                return Err(OAuthError::TokenExchangeFailed(format!(
                    "token response unreadable: {e}"
                )))
            }
        };

        self.sink
            .record(GOOGLE_CONNECTION, Value::Object(tokens.clone()))
            .await;
        info!(fields = tokens.len(), "google account connected");
        Ok(mask_tokens(&tokens))
    }

    /// Placeholder listing: real data needs the Business Profile API. Returns
    /// two demo locations once any connection has been stored.
    pub async fn connected_locations(&self) -> (bool, Vec<Location>) {
        let connections = match self.store.count_all(GOOGLE_CONNECTION).await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "connection lookup failed; reporting disconnected");
                0
            }
        };
        if connections == 0 {
            return (false, Vec::new());
        }
        (
            true,
            vec![
                Location {
                    name: "Demo Location A".into(),
                    store_code: "A001".into(),
                },
                Location {
                    name: "Demo Location B".into(),
                    store_code: "B002".into(),
                },
            ],
        )
    }
}
