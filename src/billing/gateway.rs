//! Payment provider seam. Handlers talk to [`PaymentGateway`]; the live
//! implementation wraps `async-stripe` and is only usable when a secret key
//! was configured.

use axum::async_trait;
use tracing::{debug, instrument};

use super::{BillingError, BillingResult};

pub const SESSION_ID_PLACEHOLDER: &str = "session_id={CHECKOUT_SESSION_ID}";

#[derive(Debug, Clone)]
pub struct CheckoutParams {
    pub price_id: String,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSession {
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Subscription-mode checkout for a single price, quantity 1.
    async fn create_checkout_session(&self, params: &CheckoutParams)
        -> BillingResult<CheckoutSession>;

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> BillingResult<PortalSession>;
}

/// Append the provider's session-id template so the success page can look the
/// session up after the redirect.
pub fn with_session_placeholder(success_url: &str) -> String {
    let sep = if success_url.contains('?') { '&' } else { '?' };
    format!("{success_url}{sep}{SESSION_ID_PLACEHOLDER}")
}

fn request_error(e: stripe::StripeError) -> BillingError {
    match e {
        stripe::StripeError::Stripe(req) => {
            let fallback = format!("stripe returned {}", req.http_status);
            BillingError::Request(req.message.unwrap_or(fallback))
        }
        other => BillingError::Request(other.to_string()),
    }
}

#[derive(Clone)]
pub struct StripeGateway {
    client: Option<stripe::Client>,
}

impl StripeGateway {
    pub fn new(secret_key: Option<&str>) -> Self {
        Self {
            client: secret_key.map(|key| stripe::Client::new(key)),
        }
    }

    fn client(&self) -> BillingResult<&stripe::Client> {
        self.client.as_ref().ok_or(BillingError::NotConfigured)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    #[instrument(skip(self, params), fields(price_id = %params.price_id))]
    async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> BillingResult<CheckoutSession> {
        let client = self.client()?;
        let success_url = with_session_placeholder(&params.success_url);

        let mut create = stripe::CreateCheckoutSession::new();
        create.mode = Some(stripe::CheckoutSessionMode::Subscription);
        create.payment_method_types =
            Some(vec![stripe::CreateCheckoutSessionPaymentMethodTypes::Card]);
        create.line_items = Some(vec![stripe::CreateCheckoutSessionLineItems {
            price: Some(params.price_id.clone()),
            quantity: Some(1),
            ..Default::default()
        }]);
        create.customer_email = Some(params.customer_email.as_str());
        create.success_url = Some(success_url.as_str());
        create.cancel_url = Some(params.cancel_url.as_str());

        let session = stripe::CheckoutSession::create(client, create)
            .await
            .map_err(request_error)?;
        let url = session
            .url
            .ok_or_else(|| BillingError::Request("Checkout session URL missing".into()))?;

        debug!(session_id = %session.id, "checkout session created");
        Ok(CheckoutSession {
            id: session.id.to_string(),
            url,
        })
    }

    #[instrument(skip(self, return_url))]
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> BillingResult<PortalSession> {
        let client = self.client()?;
        let customer = customer_id
            .parse::<stripe::CustomerId>()
            .map_err(|e| BillingError::Request(format!("Invalid customer ID: {e}")))?;

        let mut create = stripe::CreateBillingPortalSession::new(customer);
        create.return_url = Some(return_url);

        let session = stripe::BillingPortalSession::create(client, create)
            .await
            .map_err(request_error)?;

        debug!(session_id = %session.id, "portal session created");
        Ok(PortalSession { url: session.url })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_appended_as_query() {
        assert_eq!(
            with_session_placeholder("https://app.example/success"),
            "https://app.example/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(
            with_session_placeholder("https://app.example/success?plan=growth"),
            "https://app.example/success?plan=growth&session_id={CHECKOUT_SESSION_ID}"
        );
    }

    #[tokio::test]
    async fn unconfigured_gateway_refuses_every_call() {
        let gateway = StripeGateway::new(None);
        assert!(!gateway.is_configured());
        let params = CheckoutParams {
            price_id: "price_1".into(),
            customer_email: "owner@shop.example".into(),
            success_url: "https://app.example/ok".into(),
            cancel_url: "https://app.example/cancel".into(),
        };
        assert!(matches!(
            gateway.create_checkout_session(&params).await,
            Err(BillingError::NotConfigured)
        ));
        assert!(matches!(
            gateway.create_portal_session("cus_1", "https://app.example").await,
            Err(BillingError::NotConfigured)
        ));
    }

    #[test]
    fn configured_gateway_reports_ready() {
        assert!(StripeGateway::new(Some("sk_test_123")).is_configured());
    }
}
