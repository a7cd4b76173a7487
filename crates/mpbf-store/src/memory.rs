//! In-memory factory store for tests and local development.

use crate::error::StoreError;
use crate::{CustomerRef, FactoryStore, KpiSnapshot, NewRecord, param_f64, param_i64, param_str};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct State {
    next_id: i64,
    orders: Vec<Value>,
    rolls: Vec<Value>,
    customers: Vec<Value>,
    machines: Vec<Value>,
    customer_products: Vec<Value>,
    maintenance_requests: Vec<Value>,
    quality_checks: Vec<Value>,
    kpi: KpiSnapshot,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Factory store with no persistence. Behaves like [`crate::PgStore`]
/// for the validation paths the pipeline exercises.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning only means some caller panicked mid-write; the state is
    // plain JSON values and stays usable, so recover rather than propagate.
    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Override the snapshot returned by `kpi_snapshot`.
    pub fn set_kpi(&self, kpi: KpiSnapshot) {
        self.write().kpi = kpi;
    }

    pub fn orders(&self) -> Vec<Value> {
        self.read().orders.clone()
    }

    pub fn rolls(&self) -> Vec<Value> {
        self.read().rolls.clone()
    }

    pub fn customers(&self) -> Vec<Value> {
        self.read().customers.clone()
    }

    pub fn machines(&self) -> Vec<Value> {
        self.read().machines.clone()
    }

    pub fn maintenance_requests(&self) -> Vec<Value> {
        self.read().maintenance_requests.clone()
    }

    pub fn quality_checks(&self) -> Vec<Value> {
        self.read().quality_checks.clone()
    }

    pub fn customer_products(&self) -> Vec<Value> {
        self.read().customer_products.clone()
    }
}

#[async_trait]
impl FactoryStore for InMemoryStore {
    async fn insert_order(
        &self,
        order_number: &str,
        params: &Value,
    ) -> Result<NewRecord, StoreError> {
        let customer_id = param_i64(params, "customer_id");
        let customer_name = param_str(params, "customer_name").map(String::from);
        if customer_id.is_none() && customer_name.is_none() {
            return Err(StoreError::missing("customer_id or customer_name"));
        }
        let delivery_date =
            param_str(params, "delivery_date").ok_or_else(|| StoreError::missing("delivery_date"))?;

        let mut state = self.write();
        let id = state.allocate_id();
        state.orders.push(json!({
            "id": id,
            "order_number": order_number,
            "customer_id": customer_id,
            "customer_name": customer_name,
            "delivery_date": delivery_date,
            "notes": param_str(params, "notes"),
            "status": "pending",
        }));
        Ok(NewRecord {
            id,
            identifier: order_number.to_string(),
        })
    }

    async fn update_order(&self, order_id: i64, changes: &Value) -> Result<(), StoreError> {
        let mut state = self.write();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.get("id").and_then(Value::as_i64) == Some(order_id))
            .ok_or(StoreError::NotFound {
                table: "orders",
                id: order_id,
            })?;
        for key in ["delivery_date", "notes", "status"] {
            if let Some(value) = param_str(changes, key) {
                order[key] = json!(value);
            }
        }
        Ok(())
    }

    async fn delete_order(&self, order_id: i64) -> Result<(), StoreError> {
        let mut state = self.write();
        let before = state.orders.len();
        state
            .orders
            .retain(|o| o.get("id").and_then(Value::as_i64) != Some(order_id));
        if state.orders.len() == before {
            return Err(StoreError::NotFound {
                table: "orders",
                id: order_id,
            });
        }
        Ok(())
    }

    async fn insert_roll(&self, roll_number: &str, params: &Value) -> Result<NewRecord, StoreError> {
        let production_order_id = param_i64(params, "production_order_id")
            .ok_or_else(|| StoreError::missing("production_order_id"))?;
        let weight =
            param_f64(params, "weight").ok_or_else(|| StoreError::missing("weight"))?;

        let mut state = self.write();
        let id = state.allocate_id();
        state.rolls.push(json!({
            "id": id,
            "roll_number": roll_number,
            "production_order_id": production_order_id,
            "weight_kg": weight,
            "waste_kg": param_f64(params, "waste").unwrap_or(0.0),
            "stage": "film",
        }));
        Ok(NewRecord {
            id,
            identifier: roll_number.to_string(),
        })
    }

    async fn insert_customer(&self, params: &Value) -> Result<NewRecord, StoreError> {
        let name = param_str(params, "name").ok_or_else(|| StoreError::missing("name"))?;
        let phone = param_str(params, "phone").ok_or_else(|| StoreError::missing("phone"))?;

        let mut state = self.write();
        let id = state.allocate_id();
        state.customers.push(json!({
            "id": id,
            "name": name,
            "phone": phone,
            "city": param_str(params, "city"),
            "address": param_str(params, "address"),
        }));
        Ok(NewRecord {
            id,
            identifier: id.to_string(),
        })
    }

    async fn insert_machine(&self, params: &Value) -> Result<NewRecord, StoreError> {
        let name = param_str(params, "name").ok_or_else(|| StoreError::missing("name"))?;
        let section =
            param_str(params, "section").ok_or_else(|| StoreError::missing("section"))?;

        let mut state = self.write();
        let id = state.allocate_id();
        state.machines.push(json!({
            "id": id,
            "name": name,
            "machine_type": param_str(params, "machine_type"),
            "section": section,
            "status": "active",
        }));
        Ok(NewRecord {
            id,
            identifier: id.to_string(),
        })
    }

    async fn insert_customer_product(&self, params: &Value) -> Result<NewRecord, StoreError> {
        let customer_id = param_i64(params, "customer_id")
            .ok_or_else(|| StoreError::missing("customer_id"))?;
        let category =
            param_str(params, "category").ok_or_else(|| StoreError::missing("category"))?;

        let mut state = self.write();
        let id = state.allocate_id();
        state.customer_products.push(json!({
            "id": id,
            "customer_id": customer_id,
            "category": category,
            "size_caption": param_str(params, "size_caption"),
            "thickness": param_f64(params, "thickness"),
            "material": param_str(params, "material"),
            "unit_weight_kg": param_f64(params, "unit_weight_kg"),
        }));
        Ok(NewRecord {
            id,
            identifier: id.to_string(),
        })
    }

    async fn insert_maintenance_request(&self, params: &Value) -> Result<NewRecord, StoreError> {
        let machine_id =
            param_i64(params, "machine_id").ok_or_else(|| StoreError::missing("machine_id"))?;
        let description =
            param_str(params, "description").ok_or_else(|| StoreError::missing("description"))?;

        let mut state = self.write();
        let id = state.allocate_id();
        state.maintenance_requests.push(json!({
            "id": id,
            "machine_id": machine_id,
            "description": description,
            "status": "open",
        }));
        Ok(NewRecord {
            id,
            identifier: id.to_string(),
        })
    }

    async fn insert_quality_check(&self, params: &Value) -> Result<NewRecord, StoreError> {
        let production_order_id = param_i64(params, "production_order_id")
            .ok_or_else(|| StoreError::missing("production_order_id"))?;
        let status = param_str(params, "status").ok_or_else(|| StoreError::missing("status"))?;

        let mut state = self.write();
        let id = state.allocate_id();
        state.quality_checks.push(json!({
            "id": id,
            "production_order_id": production_order_id,
            "status": status,
            "notes": param_str(params, "notes"),
            "checked_by": param_str(params, "checked_by"),
        }));
        Ok(NewRecord {
            id,
            identifier: id.to_string(),
        })
    }

    async fn kpi_snapshot(&self) -> Result<KpiSnapshot, StoreError> {
        Ok(self.read().kpi.clone())
    }

    async fn sample_customers(&self, limit: i64) -> Result<Vec<CustomerRef>, StoreError> {
        let state = self.read();
        Ok(state
            .customers
            .iter()
            .take(limit.max(0) as usize)
            .filter_map(|c| {
                Some(CustomerRef {
                    id: c.get("id")?.as_i64()?,
                    name: c.get("name")?.as_str()?.to_string(),
                })
            })
            .collect())
    }

    async fn keyword_snapshot(&self, keywords: &[&str]) -> Result<Value, StoreError> {
        let state = self.read();
        let mut snapshot = serde_json::Map::new();
        for keyword in keywords {
            let value = match *keyword {
                "orders" => json!({
                    "total": state.orders.len(),
                    "recent": state.orders.iter().rev().take(5).collect::<Vec<_>>(),
                }),
                "customers" => json!({ "total": state.customers.len() }),
                "machines" => json!({ "machines": state.machines }),
                "maintenance" => json!({
                    "open_requests": state
                        .maintenance_requests
                        .iter()
                        .filter(|r| r.get("status").and_then(Value::as_str) == Some("open"))
                        .count(),
                }),
                "quality" | "rolls" | "production" => json!(state.kpi),
                _ => continue,
            };
            snapshot.insert((*keyword).to_string(), value);
        }
        Ok(Value::Object(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn order_lifecycle() {
        let store = InMemoryStore::new();
        let record = store
            .insert_order("ORD-1", &json!({"customer_name": "شركة النور", "delivery_date": "2026-09-15"}))
            .await
            .unwrap();
        assert_eq!(record.identifier, "ORD-1");

        store
            .update_order(record.id, &json!({"status": "in_production"}))
            .await
            .unwrap();
        assert_eq!(
            store.orders()[0]["status"],
            json!("in_production")
        );

        store.delete_order(record.id).await.unwrap();
        assert!(store.orders().is_empty());
    }

    #[tokio::test]
    async fn update_missing_order_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.update_order(99, &json!({"status": "done"})).await;
        assert!(matches!(
            err,
            Err(StoreError::NotFound { table: "orders", id: 99 })
        ));
    }

    #[tokio::test]
    async fn order_requires_a_customer_reference() {
        let store = InMemoryStore::new();
        let err = store
            .insert_order("ORD-2", &json!({"delivery_date": "2026-09-15"}))
            .await;
        assert!(matches!(err, Err(StoreError::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn roll_accepts_numeric_strings() {
        let store = InMemoryStore::new();
        let record = store
            .insert_roll(
                "ROLL-1",
                &json!({"production_order_id": "7", "weight": "120.5"}),
            )
            .await
            .unwrap();
        assert_eq!(record.identifier, "ROLL-1");
        assert_eq!(store.rolls()[0]["weight_kg"], json!(120.5));
    }

    #[tokio::test]
    async fn keyword_snapshot_ignores_unknown_keywords() {
        let store = InMemoryStore::new();
        let snapshot = store
            .keyword_snapshot(&["orders", "weather"])
            .await
            .unwrap();
        assert!(snapshot.get("orders").is_some());
        assert!(snapshot.get("weather").is_none());
    }

    #[tokio::test]
    async fn survives_a_poisoned_lock() {
        let store = InMemoryStore::new();
        store
            .insert_customer(&json!({"name": "c0", "phone": "0500000000"}))
            .await
            .unwrap();

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.state.write().unwrap();
            panic!("poison the lock");
        }));

        assert_eq!(store.customers().len(), 1);
        store
            .insert_customer(&json!({"name": "c1", "phone": "0500000001"}))
            .await
            .unwrap();
        assert_eq!(store.customers().len(), 2);
    }

    #[tokio::test]
    async fn sample_customers_respects_limit() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store
                .insert_customer(&json!({"name": format!("c{i}"), "phone": "0500000000"}))
                .await
                .unwrap();
        }
        let sample = store.sample_customers(3).await.unwrap();
        assert_eq!(sample.len(), 3);
    }
}
