//! JSON schemas for LLM output.
//!
//! Model output is untrusted: every JSON payload is validated against one
//! of these compiled schemas before it is used. A payload that fails
//! validation is treated exactly like a failed call.

use crate::error::LlmError;
use crate::extractor::EntityKind;
use jsonschema::Validator;
use serde_json::{Value, json};
use std::sync::LazyLock;

static INTENT_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    compile(&json!({
        "type": "object",
        "required": ["intent"],
        "properties": {
            "intent": { "type": "string", "minLength": 1 },
            "action": { "type": ["string", "null"] },
            "requiresDatabase": { "type": "boolean" },
            "requestsReport": { "type": "boolean" },
            "reportType": { "type": ["string", "null"] },
            "parameters": { "type": "object" },
            "confidence": { "type": "number" },
            "missingInfo": { "type": "array", "items": { "type": "string" } }
        }
    }))
});

static CUSTOMER_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    compile(&json!({
        "type": "object",
        "properties": {
            "name": { "type": ["string", "null"] },
            "phone": { "type": ["string", "null"] },
            "city": { "type": ["string", "null"] },
            "address": { "type": ["string", "null"] }
        }
    }))
});

static ORDER_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    compile(&json!({
        "type": "object",
        "properties": {
            "order_id": { "type": ["integer", "string", "null"] },
            "customer_id": { "type": ["integer", "string", "null"] },
            "customer_name": { "type": ["string", "null"] },
            "delivery_date": { "type": ["string", "null"] },
            "notes": { "type": ["string", "null"] },
            "products": { "type": ["array", "null"] }
        }
    }))
});

static ROLL_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    compile(&json!({
        "type": "object",
        "properties": {
            "production_order_id": { "type": ["integer", "string", "null"] },
            "weight": { "type": ["number", "string", "null"] },
            "waste": { "type": ["number", "string", "null"] },
            "roll_number": { "type": ["string", "null"] }
        }
    }))
});

static MAINTENANCE_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    compile(&json!({
        "type": "object",
        "properties": {
            "machine_id": { "type": ["integer", "string", "null"] },
            "description": { "type": ["string", "null"] }
        }
    }))
});

static MACHINE_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    compile(&json!({
        "type": "object",
        "properties": {
            "name": { "type": ["string", "null"] },
            "machine_type": { "type": ["string", "null"] },
            "section": { "type": ["string", "null"] }
        }
    }))
});

static QUALITY_CHECK_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    compile(&json!({
        "type": "object",
        "properties": {
            "production_order_id": { "type": ["integer", "string", "null"] },
            "status": { "type": ["string", "null"] },
            "notes": { "type": ["string", "null"] },
            "checked_by": { "type": ["string", "null"] }
        }
    }))
});

static CUSTOMER_PRODUCT_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    compile(&json!({
        "type": "object",
        "properties": {
            "customer_id": { "type": ["integer", "string", "null"] },
            "category": { "type": ["string", "null"] },
            "size_caption": { "type": ["string", "null"] },
            "thickness": { "type": ["number", "string", "null"] },
            "material": { "type": ["string", "null"] },
            "unit_weight_kg": { "type": ["number", "string", "null"] }
        }
    }))
});

fn compile(schema: &Value) -> Validator {
    // Schemas are static literals; a compile failure is a programming
    // error caught by the tests below.
    jsonschema::validator_for(schema).expect("static schema must compile")
}

/// Validator for the intent classification payload.
pub fn intent_validator() -> &'static Validator {
    &INTENT_VALIDATOR
}

/// Validator for one entity's extraction payload.
pub fn entity_validator(kind: EntityKind) -> &'static Validator {
    match kind {
        EntityKind::Customer => &CUSTOMER_VALIDATOR,
        EntityKind::Order => &ORDER_VALIDATOR,
        EntityKind::Roll => &ROLL_VALIDATOR,
        EntityKind::Maintenance => &MAINTENANCE_VALIDATOR,
        EntityKind::Machine => &MACHINE_VALIDATOR,
        EntityKind::QualityCheck => &QUALITY_CHECK_VALIDATOR,
        EntityKind::CustomerProduct => &CUSTOMER_PRODUCT_VALIDATOR,
    }
}

/// Validate a payload, collecting every violation into one error.
pub fn validate(validator: &Validator, instance: &Value) -> Result<(), LlmError> {
    if validator.is_valid(instance) {
        return Ok(());
    }
    let messages: Vec<String> = validator
        .iter_errors(instance)
        .take(5)
        .map(|e| e.to_string())
        .collect();
    Err(LlmError::SchemaViolation(messages.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_schema_accepts_full_payload() {
        let payload = json!({
            "intent": "create",
            "action": "create_customer",
            "requiresDatabase": true,
            "requestsReport": false,
            "reportType": null,
            "parameters": { "name": "شركة النور", "phone": "0501234567" },
            "confidence": 0.93,
            "missingInfo": []
        });
        assert!(validate(intent_validator(), &payload).is_ok());
    }

    #[test]
    fn intent_schema_rejects_wrong_types() {
        let payload = json!({
            "intent": "create",
            "requiresDatabase": "yes",
            "confidence": "high"
        });
        let err = validate(intent_validator(), &payload).unwrap_err();
        assert!(matches!(err, LlmError::SchemaViolation(_)));
    }

    #[test]
    fn intent_schema_requires_intent() {
        assert!(validate(intent_validator(), &json!({ "confidence": 0.5 })).is_err());
    }

    #[test]
    fn entity_schemas_compile_and_accept_partial_fields() {
        for kind in [
            EntityKind::Customer,
            EntityKind::Order,
            EntityKind::Roll,
            EntityKind::Maintenance,
            EntityKind::Machine,
            EntityKind::QualityCheck,
            EntityKind::CustomerProduct,
        ] {
            assert!(validate(entity_validator(kind), &json!({})).is_ok());
        }
        assert!(
            validate(
                entity_validator(EntityKind::Customer),
                &json!({ "name": "Al-Noor", "phone": null })
            )
            .is_ok()
        );
        assert!(
            validate(
                entity_validator(EntityKind::Customer),
                &json!({ "name": 42 })
            )
            .is_err()
        );
    }
}
