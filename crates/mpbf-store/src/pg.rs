//! Postgres implementation of the factory store.
//!
//! Every statement uses bound parameters - values never reach the SQL
//! text. The schema is owned by the surrounding application; this module
//! only writes and reads it.

use crate::error::StoreError;
use crate::{CustomerRef, FactoryStore, KpiSnapshot, NewRecord, param_f64, param_i64, param_str};
use async_trait::async_trait;
use mpbf_core::DatabaseConfig;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::debug;

/// Factory store backed by Postgres.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a new pool from configuration. Lifecycle is owned by the
    /// host application; nothing connects at module load.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (the host may share it).
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Close the pool. Idempotent.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl FactoryStore for PgStore {
    async fn insert_order(
        &self,
        order_number: &str,
        params: &Value,
    ) -> Result<NewRecord, StoreError> {
        let customer_id = param_i64(params, "customer_id");
        let customer_name = param_str(params, "customer_name");
        if customer_id.is_none() && customer_name.is_none() {
            return Err(StoreError::missing("customer_id or customer_name"));
        }
        let delivery_date =
            param_str(params, "delivery_date").ok_or_else(|| StoreError::missing("delivery_date"))?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (order_number, customer_id, customer_name, delivery_date, notes, status) \
             VALUES ($1, $2, $3, $4, $5, 'pending') RETURNING id",
        )
        .bind(order_number)
        .bind(customer_id)
        .bind(customer_name)
        .bind(delivery_date)
        .bind(param_str(params, "notes"))
        .fetch_one(&self.pool)
        .await?;

        debug!(order_number, id, "order inserted");
        Ok(NewRecord {
            id,
            identifier: order_number.to_string(),
        })
    }

    async fn update_order(&self, order_id: i64, changes: &Value) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET \
               delivery_date = COALESCE($2, delivery_date), \
               notes = COALESCE($3, notes), \
               status = COALESCE($4, status) \
             WHERE id = $1",
        )
        .bind(order_id)
        .bind(param_str(changes, "delivery_date"))
        .bind(param_str(changes, "notes"))
        .bind(param_str(changes, "status"))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                table: "orders",
                id: order_id,
            });
        }
        Ok(())
    }

    async fn delete_order(&self, order_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
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

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO rolls (roll_number, production_order_id, weight_kg, waste_kg, stage) \
             VALUES ($1, $2, $3, $4, 'film') RETURNING id",
        )
        .bind(roll_number)
        .bind(production_order_id)
        .bind(weight)
        .bind(param_f64(params, "waste").unwrap_or(0.0))
        .fetch_one(&self.pool)
        .await?;

        Ok(NewRecord {
            id,
            identifier: roll_number.to_string(),
        })
    }

    async fn insert_customer(&self, params: &Value) -> Result<NewRecord, StoreError> {
        let name = param_str(params, "name").ok_or_else(|| StoreError::missing("name"))?;
        let phone = param_str(params, "phone").ok_or_else(|| StoreError::missing("phone"))?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO customers (name, phone, city, address) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(name)
        .bind(phone)
        .bind(param_str(params, "city"))
        .bind(param_str(params, "address"))
        .fetch_one(&self.pool)
        .await?;

        Ok(NewRecord {
            id,
            identifier: id.to_string(),
        })
    }

    async fn insert_machine(&self, params: &Value) -> Result<NewRecord, StoreError> {
        let name = param_str(params, "name").ok_or_else(|| StoreError::missing("name"))?;
        let section =
            param_str(params, "section").ok_or_else(|| StoreError::missing("section"))?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO machines (name, machine_type, section, status) \
             VALUES ($1, $2, $3, 'active') RETURNING id",
        )
        .bind(name)
        .bind(param_str(params, "machine_type"))
        .bind(section)
        .fetch_one(&self.pool)
        .await?;

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

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO customer_products \
               (customer_id, category, size_caption, thickness, material, unit_weight_kg) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(customer_id)
        .bind(category)
        .bind(param_str(params, "size_caption"))
        .bind(param_f64(params, "thickness"))
        .bind(param_str(params, "material"))
        .bind(param_f64(params, "unit_weight_kg"))
        .fetch_one(&self.pool)
        .await?;

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

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO maintenance_requests (machine_id, description, status) \
             VALUES ($1, $2, 'open') RETURNING id",
        )
        .bind(machine_id)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(NewRecord {
            id,
            identifier: id.to_string(),
        })
    }

    async fn insert_quality_check(&self, params: &Value) -> Result<NewRecord, StoreError> {
        let production_order_id = param_i64(params, "production_order_id")
            .ok_or_else(|| StoreError::missing("production_order_id"))?;
        let status = param_str(params, "status").ok_or_else(|| StoreError::missing("status"))?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO quality_checks (production_order_id, status, notes, checked_by) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(production_order_id)
        .bind(status)
        .bind(param_str(params, "notes"))
        .bind(param_str(params, "checked_by"))
        .fetch_one(&self.pool)
        .await?;

        Ok(NewRecord {
            id,
            identifier: id.to_string(),
        })
    }

    async fn kpi_snapshot(&self) -> Result<KpiSnapshot, StoreError> {
        let active_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE status IN ('pending', 'in_production')",
        )
        .fetch_one(&self.pool)
        .await?;

        let production_rate: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(weight_kg), 0)::float8 / 24.0 FROM rolls \
             WHERE created_at > now() - interval '24 hours'",
        )
        .fetch_one(&self.pool)
        .await?;

        let quality_score: f64 = sqlx::query_scalar(
            "SELECT COALESCE(100.0 * AVG(CASE WHEN status = 'passed' THEN 1 ELSE 0 END), 100.0)::float8 \
             FROM quality_checks WHERE checked_at > now() - interval '7 days'",
        )
        .fetch_one(&self.pool)
        .await?;

        let waste_percentage: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(waste_kg) * 100.0 / NULLIF(SUM(weight_kg), 0), 0)::float8 \
             FROM rolls WHERE created_at > now() - interval '7 days'",
        )
        .fetch_one(&self.pool)
        .await?;

        let active_machines: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM machines WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;

        let maintenance_machines: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM machines WHERE status = 'maintenance'")
                .fetch_one(&self.pool)
                .await?;

        Ok(KpiSnapshot {
            active_orders,
            production_rate,
            quality_score,
            waste_percentage,
            active_machines,
            maintenance_machines,
        })
    }

    async fn sample_customers(&self, limit: i64) -> Result<Vec<CustomerRef>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM customers ORDER BY id LIMIT $1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| CustomerRef {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn keyword_snapshot(&self, keywords: &[&str]) -> Result<Value, StoreError> {
        let mut snapshot = serde_json::Map::new();

        for keyword in keywords {
            let value = match *keyword {
                "orders" => {
                    let recent: Value = sqlx::query_scalar(
                        "SELECT COALESCE(jsonb_agg(t), '[]'::jsonb) FROM \
                         (SELECT order_number, customer_name, delivery_date, status \
                          FROM orders ORDER BY id DESC LIMIT 5) t",
                    )
                    .fetch_one(&self.pool)
                    .await?;
                    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
                        .fetch_one(&self.pool)
                        .await?;
                    json!({ "total": total, "recent": recent })
                }
                "customers" => {
                    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
                        .fetch_one(&self.pool)
                        .await?;
                    json!({ "total": total })
                }
                "machines" => {
                    let recent: Value = sqlx::query_scalar(
                        "SELECT COALESCE(jsonb_agg(t), '[]'::jsonb) FROM \
                         (SELECT name, section, status FROM machines ORDER BY id LIMIT 10) t",
                    )
                    .fetch_one(&self.pool)
                    .await?;
                    json!({ "machines": recent })
                }
                "maintenance" => {
                    let open: i64 = sqlx::query_scalar(
                        "SELECT COUNT(*) FROM maintenance_requests WHERE status = 'open'",
                    )
                    .fetch_one(&self.pool)
                    .await?;
                    json!({ "open_requests": open })
                }
                "quality" | "rolls" | "production" => json!(self.kpi_snapshot().await?),
                _ => continue,
            };
            snapshot.insert((*keyword).to_string(), value);
        }

        Ok(Value::Object(snapshot))
    }
}
