use serde::Serialize;

/// Public view of a catalog entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub interval: String,
    pub features: Vec<String>,
}
