//! Per-entity field extraction.
//!
//! Each extractor issues a constrained prompt asking the model for one
//! fixed JSON shape. Missing fields come back null and are dropped;
//! unknown keys are dropped too. The caller validates completeness
//! against the action's required fields before any write is attempted.

use crate::client::{CompletionClient, clean_json_response};
use crate::error::LlmError;
use crate::{prompts, schema};
use mpbf_core::Action;
use std::sync::Arc;
use tracing::debug;

/// Entities the pipeline knows how to extract fields for.
///
/// Each variant's schema covers every key the mapped actions require, so
/// a value the model recovers is never dropped as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Customer,
    Order,
    Roll,
    Maintenance,
    Machine,
    QualityCheck,
    CustomerProduct,
}

impl EntityKind {
    /// The entity an action's parameters describe, when re-extraction
    /// from free text is possible for it.
    pub fn for_action(action: Action) -> Option<Self> {
        match action {
            Action::CreateCustomer => Some(Self::Customer),
            Action::CreateOrder | Action::UpdateOrder | Action::DeleteOrder => Some(Self::Order),
            Action::CreateRoll => Some(Self::Roll),
            Action::CreateMaintenance => Some(Self::Maintenance),
            Action::CreateMachine => Some(Self::Machine),
            Action::CreateQualityCheck => Some(Self::QualityCheck),
            Action::CreateCustomerProduct => Some(Self::CustomerProduct),
            Action::AnalyzePerformance => None,
        }
    }

    /// Keys this entity's schema knows. Anything else the model emits is
    /// dropped.
    fn known_keys(self) -> &'static [&'static str] {
        match self {
            Self::Customer => &["name", "phone", "city", "address"],
            Self::Order => &[
                "order_id",
                "customer_id",
                "customer_name",
                "delivery_date",
                "notes",
                "products",
            ],
            Self::Roll => &["production_order_id", "weight", "waste", "roll_number"],
            Self::Maintenance => &["machine_id", "description"],
            Self::Machine => &["name", "machine_type", "section"],
            Self::QualityCheck => &["production_order_id", "status", "notes", "checked_by"],
            Self::CustomerProduct => &[
                "customer_id",
                "category",
                "size_caption",
                "thickness",
                "material",
                "unit_weight_kg",
            ],
        }
    }
}

/// Pulls structured entity fields out of unstructured text.
pub struct FieldExtractor {
    client: Arc<dyn CompletionClient>,
}

impl FieldExtractor {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Extract the fields of one entity from free text.
    ///
    /// Returns only fields actually present: nulls and empty strings are
    /// dropped, never invented. Required fields explicit in the text are
    /// always recovered (the prompt forbids omission); ambiguous text may
    /// vary between calls, which is acceptable.
    pub async fn extract(
        &self,
        kind: EntityKind,
        text: &str,
    ) -> Result<serde_json::Map<String, serde_json::Value>, LlmError> {
        let raw = self
            .client
            .complete(&prompts::extractor_system(kind), text, true)
            .await?;

        let mut value: serde_json::Value = serde_json::from_str(clean_json_response(&raw))?;

        // Drop keys outside the schema before validating, so a chatty
        // model does not fail the whole extraction.
        if let Some(map) = value.as_object_mut() {
            let known = kind.known_keys();
            map.retain(|key, _| known.contains(&key.as_str()));
        }

        schema::validate(schema::entity_validator(kind), &value)?;

        let map = value
            .as_object()
            .cloned()
            .ok_or_else(|| LlmError::InvalidResponse("extraction was not an object".to_string()))?;

        let fields: serde_json::Map<String, serde_json::Value> = map
            .into_iter()
            .filter(|(_, v)| !v.is_null() && v.as_str() != Some(""))
            .collect();

        debug!(?kind, field_count = fields.len(), "extracted fields");
        Ok(fields)
    }
}
