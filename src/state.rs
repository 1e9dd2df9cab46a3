use std::sync::Arc;

use crate::billing::{PaymentGateway, StripeGateway, WebhookProcessor};
use crate::config::AppConfig;
use crate::google::GoogleOAuth;
use crate::store::{self, BestEffortSink, DocumentStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub sink: BestEffortSink,
    pub payments: Arc<dyn PaymentGateway>,
    pub webhooks: Arc<WebhookProcessor>,
    pub google: Arc<GoogleOAuth>,
}

impl AppState {
    /// Connect the store and build every integration from `config`. Nothing
    /// here fails; unconfigured pieces report themselves at request time.
    pub async fn init(config: AppConfig) -> Self {
        let store = store::connect(&config.store).await;
        let payments = Arc::new(StripeGateway::new(config.stripe.secret_key.as_deref()))
            as Arc<dyn PaymentGateway>;
        Self::from_parts(config, store, payments)
    }

    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        let sink = BestEffortSink::new(store.clone());
        let webhooks = Arc::new(WebhookProcessor::new(
            config.stripe.webhook_secret.clone(),
            config.stripe.webhook_tolerance_secs,
            sink.clone(),
        ));
        let google = Arc::new(GoogleOAuth::new(config.google.clone(), store.clone()));

        Self {
            config: Arc::new(config),
            store,
            sink,
            payments,
            webhooks,
            google,
        }
    }

    /// Default configuration over an empty in-memory store and an
    /// unconfigured fake gateway.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::billing::gateway::fake::FakeGateway;
        use crate::store::memory::MemoryStore;

        Self::from_parts(
            AppConfig::default(),
            Arc::new(MemoryStore::default()),
            Arc::new(FakeGateway::default()),
        )
    }

    #[cfg(test)]
    pub fn with_payments(mut self, payments: Arc<dyn PaymentGateway>) -> Self {
        self.payments = payments;
        self
    }
}
