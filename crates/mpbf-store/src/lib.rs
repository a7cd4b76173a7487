//! # mpbf-store
//!
//! The relational store boundary of the MPBF assistant. The pipeline does
//! not own persistent data; it mutates externally owned tables (`orders`,
//! `production_orders`, `rolls`, `customers`, `customer_products`,
//! `machines`, `maintenance_requests`, `quality_checks`) through the
//! `FactoryStore` seam.
//!
//! Two implementations: `PgStore` over sqlx/Postgres with bound
//! parameters only, and `InMemoryStore` for tests and offline demos.

pub mod error;
pub mod memory;
pub mod pg;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use pg::PgStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of a freshly created record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
    /// Database primary key.
    pub id: i64,
    /// Human-facing identifier embedded in the success message (order
    /// number, roll number, or the key itself).
    pub identifier: String,
}

/// A customer reference used to enrich clarification messages with
/// example values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: i64,
    pub name: String,
}

/// Snapshot of the factory's KPIs, fed to the classifier as context and
/// rendered by the performance report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub active_orders: i64,
    /// Production rate in kg/hour over the recent window.
    pub production_rate: f64,
    /// Quality pass rate, percent.
    pub quality_score: f64,
    pub waste_percentage: f64,
    pub active_machines: i64,
    pub maintenance_machines: i64,
}

impl KpiSnapshot {
    /// Short textual snapshot for the classifier prompt.
    pub fn to_context(&self) -> String {
        format!(
            "active orders: {}; production rate: {:.1} kg/h; quality score: {:.1}%; \
             waste: {:.1}%; machines active: {}; machines in maintenance: {}",
            self.active_orders,
            self.production_rate,
            self.quality_score,
            self.waste_percentage,
            self.active_machines,
            self.maintenance_machines
        )
    }
}

/// The data seam the executor writes through.
///
/// Every method performs exactly one parameterized statement (or one
/// read). Transaction semantics are the database's own; the pipeline adds
/// no locking of its own and concurrent conflicting writes are
/// last-write-wins by design.
#[async_trait]
pub trait FactoryStore: Send + Sync {
    async fn insert_order(&self, order_number: &str, params: &Value)
    -> Result<NewRecord, StoreError>;

    /// Update scalar fields of an order. Absent fields keep their value.
    async fn update_order(&self, order_id: i64, changes: &Value) -> Result<(), StoreError>;

    async fn delete_order(&self, order_id: i64) -> Result<(), StoreError>;

    async fn insert_roll(&self, roll_number: &str, params: &Value)
    -> Result<NewRecord, StoreError>;

    async fn insert_customer(&self, params: &Value) -> Result<NewRecord, StoreError>;

    async fn insert_machine(&self, params: &Value) -> Result<NewRecord, StoreError>;

    async fn insert_customer_product(&self, params: &Value) -> Result<NewRecord, StoreError>;

    async fn insert_maintenance_request(&self, params: &Value) -> Result<NewRecord, StoreError>;

    async fn insert_quality_check(&self, params: &Value) -> Result<NewRecord, StoreError>;

    async fn kpi_snapshot(&self) -> Result<KpiSnapshot, StoreError>;

    /// First few customers, for example values in clarifications.
    async fn sample_customers(&self, limit: i64) -> Result<Vec<CustomerRef>, StoreError>;

    /// Loosely related read-only data for keywords the generic fallback
    /// matched in the message.
    async fn keyword_snapshot(&self, keywords: &[&str]) -> Result<Value, StoreError>;
}

/// Read a string parameter.
pub fn param_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key)?.as_str().filter(|s| !s.is_empty())
}

/// Read an integer parameter, accepting numbers and numeric strings (the
/// classifier emits both).
pub fn param_i64(params: &Value, key: &str) -> Option<i64> {
    match params.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a float parameter, accepting numbers and numeric strings.
pub fn param_f64(params: &Value, key: &str) -> Option<f64> {
    match params.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
