use serde::Deserialize;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub customer_portal_url: Option<String>,
    pub price_starter: String,
    pub price_growth: String,
    pub webhook_tolerance_secs: u64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            webhook_secret: None,
            customer_portal_url: None,
            price_starter: "price_XXXX_starter".into(),
            price_growth: "price_XXXX_growth".into(),
            webhook_tolerance_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub auth_url: String,
    pub token_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            auth_url: GOOGLE_AUTH_URL.into(),
            token_url: GOOGLE_TOKEN_URL.into(),
        }
    }
}

/// Process-wide settings, read once at startup. Every credential is optional;
/// a missing one switches the matching feature to "not configured".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub stripe: StripeConfig,
    pub google: GoogleConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // blank values behave like unset ones
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let store = StoreConfig {
            url: var("DATABASE_URL"),
            database: var("DATABASE_NAME"),
        };

        let stripe = StripeConfig {
            secret_key: var("STRIPE_SECRET_KEY"),
            webhook_secret: var("STRIPE_WEBHOOK_SECRET"),
            customer_portal_url: var("STRIPE_CUSTOMER_PORTAL_URL"),
            price_starter: var("STRIPE_PRICE_STARTER").unwrap_or(defaults.stripe.price_starter),
            price_growth: var("STRIPE_PRICE_GROWTH").unwrap_or(defaults.stripe.price_growth),
            webhook_tolerance_secs: var("STRIPE_WEBHOOK_TOLERANCE_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(defaults.stripe.webhook_tolerance_secs),
        };

        let google = GoogleConfig {
            client_id: var("GOOGLE_CLIENT_ID"),
            client_secret: var("GOOGLE_CLIENT_SECRET"),
            redirect_uri: var("GOOGLE_REDIRECT_URI"),
            auth_url: var("GOOGLE_AUTH_URL").unwrap_or(defaults.google.auth_url),
            token_url: var("GOOGLE_TOKEN_URL").unwrap_or(defaults.google.token_url),
        };

        Self {
            store,
            stripe,
            google,
        }
    }
}
