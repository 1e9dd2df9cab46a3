use serde_json::Value;
use tracing::{info, warn};

use super::dto::PlanView;
use crate::config::StripeConfig;
use crate::models::{BillingInterval, Plan};
use crate::store::{BestEffortSink, DocumentStore, StoreResult, PLAN};

/// The two plans a fresh catalog starts with.
pub fn built_in_plans(stripe: &StripeConfig) -> Vec<Plan> {
    vec![
        Plan {
            name: "Starter".into(),
            description: Some("For small businesses getting started".into()),
            price_cents: 1900,
            interval: BillingInterval::Month,
            stripe_price_id: stripe.price_starter.clone(),
            features: vec![
                "Connect 1 Google Business Profile".into(),
                "Basic analytics".into(),
                "Email support".into(),
            ],
            created_at: None,
            updated_at: None,
        },
        Plan {
            name: "Growth".into(),
            description: Some("For growing teams managing multiple locations".into()),
            price_cents: 4900,
            interval: BillingInterval::Month,
            stripe_price_id: stripe.price_growth.clone(),
            features: vec![
                "Connect up to 5 locations".into(),
                "Posts & hours management".into(),
                "Priority support".into(),
            ],
            created_at: None,
            updated_at: None,
        },
    ]
}

/// Insert the built-in plans when the catalog is empty. Returns how many were
/// written; every failure is logged and swallowed.
pub async fn seed_if_empty(
    store: &dyn DocumentStore,
    sink: &BestEffortSink,
    stripe: &StripeConfig,
) -> usize {
    let existing = match store.count_all(PLAN).await {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "plan seeding skipped");
            return 0;
        }
    };
    if existing > 0 {
        return 0;
    }

    let mut inserted = 0;
    for plan in built_in_plans(stripe) {
        if let Err(e) = plan.validate() {
            warn!(plan = %plan.name, error = %e, "built-in plan rejected");
            continue;
        }
        let document = match serde_json::to_value(&plan) {
            Ok(v) => v,
            Err(e) => {
                warn!(plan = %plan.name, error = %e, "built-in plan not serializable");
                continue;
            }
        };
        if sink.record(PLAN, document).await.is_some() {
            inserted += 1;
        }
    }
    info!(inserted, "plan catalog seeded");
    inserted
}

fn plan_view(doc: &Value) -> PlanView {
    let str_field = |key: &str| doc.get(key).and_then(Value::as_str).map(str::to_owned);
    PlanView {
        id: str_field("_id").unwrap_or_default(),
        name: str_field("name").unwrap_or_default(),
        description: str_field("description"),
        price_cents: doc.get("price_cents").and_then(Value::as_i64).unwrap_or(0),
        interval: str_field("interval").unwrap_or_else(|| BillingInterval::Month.as_str().into()),
        features: doc
            .get("features")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

pub async fn list_plans(store: &dyn DocumentStore) -> StoreResult<Vec<PlanView>> {
    let docs = store.find_all(PLAN).await?;
    Ok(docs.iter().map(plan_view).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{memory::MemoryStore, DisabledStore};
    use serde_json::json;
    use std::sync::Arc;

    fn memory() -> (Arc<MemoryStore>, BestEffortSink) {
        let store = Arc::new(MemoryStore::default());
        let sink = BestEffortSink::new(store.clone());
        (store, sink)
    }

    #[tokio::test]
    async fn seeding_twice_inserts_two_plans_total() {
        let (store, sink) = memory();
        let cfg = StripeConfig::default();
        assert_eq!(seed_if_empty(store.as_ref(), &sink, &cfg).await, 2);
        assert_eq!(seed_if_empty(store.as_ref(), &sink, &cfg).await, 0);
        assert_eq!(store.count_all(PLAN).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn seeded_plans_use_configured_price_ids() {
        let (store, sink) = memory();
        let cfg = StripeConfig {
            price_starter: "price_live_s".into(),
            ..StripeConfig::default()
        };
        seed_if_empty(store.as_ref(), &sink, &cfg).await;
        let docs = store.find_all(PLAN).await.unwrap();
        assert_eq!(docs[0]["stripe_price_id"], "price_live_s");
        assert_eq!(docs[1]["stripe_price_id"], "price_XXXX_growth");
    }

    #[tokio::test]
    async fn seeding_against_disabled_store_is_silent() {
        let store = Arc::new(DisabledStore);
        let sink = BestEffortSink::new(store.clone());
        assert_eq!(seed_if_empty(store.as_ref(), &sink, &StripeConfig::default()).await, 0);
    }

    #[tokio::test]
    async fn seeded_catalog_lists_in_order() {
        let (store, sink) = memory();
        seed_if_empty(store.as_ref(), &sink, &StripeConfig::default()).await;
        let plans = list_plans(store.as_ref()).await.unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].name, "Starter");
        assert_eq!(plans[0].price_cents, 1900);
        assert_eq!(plans[0].interval, "month");
        assert_eq!(
            plans[0].features,
            vec!["Connect 1 Google Business Profile", "Basic analytics", "Email support"]
        );
        assert_eq!(plans[1].name, "Growth");
        assert_eq!(plans[1].price_cents, 4900);
        assert_eq!(plans[1].features[1], "Posts & hours management");
    }

    #[tokio::test]
    async fn sparse_documents_get_defaults() {
        let (store, _) = memory();
        store.insert(PLAN, json!({ "name": "Legacy" })).await.unwrap();
        let plans = list_plans(store.as_ref()).await.unwrap();
        assert_eq!(plans[0].description, None);
        assert!(plans[0].features.is_empty());
        assert_eq!(plans[0].price_cents, 0);
        assert_eq!(plans[0].interval, "month");
        assert!(!plans[0].id.is_empty());
    }
}
