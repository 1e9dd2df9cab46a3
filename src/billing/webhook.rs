//! Inbound Stripe webhooks.
//!
//! Signatures are checked locally against the raw body: the `Stripe-Signature`
//! header carries `t=<unix seconds>` and one or more `v1=<hex>` entries, each an
//! HMAC-SHA256 of `"<t>.<body>"` keyed with the endpoint secret.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::{BillingError, BillingResult};
use crate::models::StripeEvent;
use crate::store::{BestEffortSink, STRIPE_EVENT};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Event types kept in the audit collection; anything else is acknowledged
/// and dropped.
pub const RECORDED_EVENT_TYPES: [&str; 4] = [
    "checkout.session.completed",
    "customer.subscription.created",
    "customer.subscription.updated",
    "customer.subscription.deleted",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// No secret configured; nothing was verified or stored.
    Skipped,
    Recorded(String),
    /// Verified and recordable, but the audit write failed.
    Dropped(String),
    Ignored(String),
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> BillingResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = v.parse::<i64>().ok(),
            Some(("v1", v)) => signatures.push(v.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        BillingError::InvalidSignature("Unable to extract timestamp from header".into())
    })?;
    if signatures.is_empty() {
        return Err(BillingError::InvalidSignature(
            "No signatures found with expected scheme".into(),
        ));
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Hex HMAC-SHA256 of `"<timestamp>.<payload>"`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> BillingResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::InvalidSignature("Invalid webhook secret".into()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify `payload` against the signature header and parse it as JSON.
pub fn verify_event(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    now: i64,
    tolerance_secs: u64,
) -> BillingResult<Value> {
    let header = header
        .ok_or_else(|| BillingError::InvalidSignature("Missing Stripe-Signature header".into()))?;
    let parsed = parse_signature_header(header)?;

    if now.abs_diff(parsed.timestamp) > tolerance_secs {
        return Err(BillingError::InvalidSignature(
            "Timestamp outside the tolerance zone".into(),
        ));
    }

    let expected = hex::decode(compute_signature(secret, parsed.timestamp, payload)?)
        .map_err(|_| BillingError::InvalidSignature("Invalid webhook secret".into()))?;
    let matched = parsed.signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|provided| expected.ct_eq(&provided).unwrap_u8() == 1)
            .unwrap_or(false)
    });
    if !matched {
        return Err(BillingError::InvalidSignature(
            "No signatures found matching the expected signature for payload".into(),
        ));
    }

    serde_json::from_slice(payload)
        .map_err(|e| BillingError::InvalidPayload(format!("Invalid payload: {e}")))
}

/// Verifies deliveries (when a secret is configured) and records the
/// subscription lifecycle events in the audit collection.
#[derive(Clone)]
pub struct WebhookProcessor {
    secret: Option<String>,
    tolerance_secs: u64,
    sink: BestEffortSink,
}

impl WebhookProcessor {
    pub fn new(secret: Option<String>, tolerance_secs: u64, sink: BestEffortSink) -> Self {
        Self {
            secret,
            tolerance_secs,
            sink,
        }
    }

    pub async fn process(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> BillingResult<WebhookOutcome> {
        let Some(secret) = self.secret.as_deref() else {
            debug!("webhook secret not set; accepting delivery unverified");
            return Ok(WebhookOutcome::Skipped);
        };

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let event = verify_event(payload, signature, secret, now, self.tolerance_secs)?;

        let event_type = event
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if !RECORDED_EVENT_TYPES.contains(&event_type.as_str()) {
            debug!(%event_type, "webhook event acknowledged without recording");
            return Ok(WebhookOutcome::Ignored(event_type));
        }

        let record = StripeEvent {
            event_type: event_type.clone(),
            data: event
                .get("data")
                .and_then(|d| d.get("object"))
                .cloned()
                .unwrap_or(Value::Null),
        };
        if let Err(e) = record.validate() {
            warn!(error = %e, "webhook event not recordable");
            return Ok(WebhookOutcome::Ignored(event_type));
        }
        let document = match serde_json::to_value(&record) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "webhook event not serializable");
                return Ok(WebhookOutcome::Dropped(event_type));
            }
        };

        match self.sink.record(STRIPE_EVENT, document).await {
            Some(id) => {
                info!(%event_type, %id, "webhook event recorded");
                Ok(WebhookOutcome::Recorded(event_type))
            }
            None => Ok(WebhookOutcome::Dropped(event_type)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::{memory::MemoryStore, DisabledStore, DocumentStore};
    use serde_json::json;
    use std::sync::Arc;

    pub(crate) const SECRET: &str = "whsec_test_secret";

    pub(crate) fn sign(payload: &[u8], timestamp: i64) -> String {
        let sig = compute_signature(SECRET, timestamp, payload).unwrap();
        format!("t={timestamp},v1={sig}")
    }

    fn now() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }

    fn subscription_event() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": "customer.subscription.updated",
            "data": { "object": { "id": "sub_1", "status": "active" } }
        }))
        .unwrap()
    }

    fn processor(store: Arc<dyn DocumentStore>, secret: Option<&str>) -> WebhookProcessor {
        WebhookProcessor::new(secret.map(str::to_owned), 300, BestEffortSink::new(store))
    }

    #[test]
    fn valid_signature_parses_event() {
        let payload = subscription_event();
        let header = sign(&payload, 1_700_000_000);
        let event = verify_event(&payload, Some(&header), SECRET, 1_700_000_010, 300).unwrap();
        assert_eq!(event["type"], "customer.subscription.updated");
    }

    #[test]
    fn any_matching_v1_entry_is_accepted() {
        let payload = subscription_event();
        let good = compute_signature(SECRET, 1_700_000_000, &payload).unwrap();
        let header = format!("t=1700000000,v1={},v1={good},v0=abc", "00".repeat(32));
        assert!(verify_event(&payload, Some(&header), SECRET, 1_700_000_000, 300).is_ok());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let payload = subscription_event();
        let header = sign(&payload, 1_700_000_000);
        let mut tampered = payload.clone();
        tampered.extend_from_slice(b" ");
        let err = verify_event(&tampered, Some(&header), SECRET, 1_700_000_000, 300).unwrap_err();
        assert!(matches!(err, BillingError::InvalidSignature(_)));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = subscription_event();
        let header = sign(&payload, 1_700_000_000);
        let err = verify_event(&payload, Some(&header), SECRET, 1_700_001_000, 300).unwrap_err();
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        let payload = b"{}";
        for header in [
            format!("t={},v1=00", i64::MIN),
            format!("t={},v1=00", i64::MAX),
        ] {
            let err = verify_event(payload, Some(&header), SECRET, 1_700_000_000, 300).unwrap_err();
            assert!(matches!(err, BillingError::InvalidSignature(_)));
        }
        let err = verify_event(payload, Some("t=0,v1=00"), SECRET, i64::MIN, 300).unwrap_err();
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn missing_or_malformed_header_is_rejected() {
        let payload = subscription_event();
        assert!(verify_event(&payload, None, SECRET, 0, 300).is_err());
        assert!(verify_event(&payload, Some("v1=abcd"), SECRET, 0, 300).is_err());
        assert!(verify_event(&payload, Some("t=0"), SECRET, 0, 300).is_err());
    }

    #[tokio::test]
    async fn without_secret_delivery_is_skipped() {
        let store = Arc::new(MemoryStore::default());
        let outcome = processor(store.clone(), None)
            .process(b"not even json", None)
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Skipped);
        assert_eq!(store.count_all(STRIPE_EVENT).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn lifecycle_events_are_recorded() {
        let store = Arc::new(MemoryStore::default());
        let payload = subscription_event();
        let header = sign(&payload, now());
        let outcome = processor(store.clone(), Some(SECRET))
            .process(&payload, Some(&header))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Recorded("customer.subscription.updated".into())
        );
        let docs = store.find_all(STRIPE_EVENT).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["type"], "customer.subscription.updated");
        assert_eq!(docs[0]["data"]["id"], "sub_1");
    }

    #[tokio::test]
    async fn other_events_are_acknowledged_but_not_stored() {
        let store = Arc::new(MemoryStore::default());
        let payload = serde_json::to_vec(&json!({
            "type": "invoice.paid",
            "data": { "object": { "id": "in_1" } }
        }))
        .unwrap();
        let header = sign(&payload, now());
        let outcome = processor(store.clone(), Some(SECRET))
            .process(&payload, Some(&header))
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Ignored("invoice.paid".into()));
        assert_eq!(store.count_all(STRIPE_EVENT).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn storage_failure_still_acknowledges() {
        let payload = subscription_event();
        let header = sign(&payload, now());
        let outcome = processor(Arc::new(DisabledStore), Some(SECRET))
            .process(&payload, Some(&header))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Dropped("customer.subscription.updated".into())
        );
    }

    #[tokio::test]
    async fn redelivery_inserts_a_duplicate() {
        let store = Arc::new(MemoryStore::default());
        let payload = subscription_event();
        let header = sign(&payload, now());
        let p = processor(store.clone(), Some(SECRET));
        p.process(&payload, Some(&header)).await.unwrap();
        p.process(&payload, Some(&header)).await.unwrap();
        assert_eq!(store.count_all(STRIPE_EVENT).await.unwrap(), 2);
    }
}
