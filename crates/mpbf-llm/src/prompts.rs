//! Prompt templates.
//!
//! All prompts pin the model to a fixed JSON contract. The classifier
//! prompt embeds the closed action registry so the model never invents a
//! tag, and the KPI snapshot so report-style questions can be grounded.

use crate::extractor::EntityKind;
use mpbf_core::Action;

/// System prompt for intent classification.
pub fn intent_system() -> String {
    let tags: Vec<&str> = Action::ALL.iter().map(|a| a.tag()).collect();
    format!(
        r#"You are the command interpreter for a plastic-bag factory management system.
Users write in Arabic or English. Classify each message into a structured intent.

KNOWN ACTION TAGS (use exactly one of these, or null):
{tags}

RESPONSE FORMAT - respond ONLY with a single JSON object:
{{
  "intent": "query" | "create" | "update" | "delete" | "report" | "help" | "unknown",
  "action": "<one of the known tags, or null>",
  "requiresDatabase": true | false,
  "requestsReport": true | false,
  "reportType": "<string or null>",
  "parameters": {{ "<field>": "<value extracted from the message>" }},
  "confidence": <number between 0 and 1>,
  "missingInfo": ["<human-readable names of required fields absent from the message>"]
}}

RULES:
- Extract parameter values exactly as written; never invent values.
- Messages unrelated to factory operations get intent "unknown" and requiresDatabase false.
- Dates go into parameters as ISO strings when the user names one.
No markdown, no text outside the JSON."#,
        tags = tags.join(", ")
    )
}

/// User prompt for intent classification: the message plus the current
/// KPI snapshot of the factory.
pub fn intent_user(message: &str, context: &str) -> String {
    format!(
        "CURRENT SYSTEM STATE:\n{context}\n\nUSER MESSAGE:\n{message}"
    )
}

/// System prompt for extracting one entity's fields.
pub fn extractor_system(kind: EntityKind) -> String {
    let (entity, fields) = match kind {
        EntityKind::Customer => (
            "customer",
            r#""name": string|null, "phone": string|null, "city": string|null, "address": string|null"#,
        ),
        EntityKind::Order => (
            "sales order",
            r#""order_id": integer|null, "customer_id": integer|null, "customer_name": string|null, "delivery_date": string|null, "notes": string|null, "products": array|null"#,
        ),
        EntityKind::Roll => (
            "production roll",
            r#""production_order_id": integer|null, "weight": number|null, "waste": number|null, "roll_number": string|null"#,
        ),
        EntityKind::Maintenance => (
            "maintenance request",
            r#""machine_id": integer|null, "description": string|null"#,
        ),
        EntityKind::Machine => (
            "machine",
            r#""name": string|null, "machine_type": string|null, "section": string|null"#,
        ),
        EntityKind::QualityCheck => (
            "quality check",
            r#""production_order_id": integer|null, "status": string|null, "notes": string|null, "checked_by": string|null"#,
        ),
        EntityKind::CustomerProduct => (
            "customer product",
            r#""customer_id": integer|null, "category": string|null, "size_caption": string|null, "thickness": number|null, "material": string|null, "unit_weight_kg": number|null"#,
        ),
    };
    format!(
        r#"Extract {entity} fields from the user's text (Arabic or English).
Respond ONLY with a JSON object of this exact shape:
{{ {fields} }}
Fields not present in the text must be null. Never invent values.
No markdown, no text outside the JSON."#
    )
}

/// System prompt for composing a natural-language answer from a read-only
/// data snapshot (generic fallback for unregistered commands).
pub fn compose_system(arabic: bool) -> &'static str {
    if arabic {
        "أنت مساعد مصنع أكياس بلاستيكية. أجب عن سؤال المستخدم بإيجاز بالعربية \
         مستنداً فقط إلى البيانات المرفقة. إن لم تكف البيانات فقل ذلك."
    } else {
        "You are a plastic-bag factory assistant. Answer the user's question \
         briefly in English using only the attached data. If the data is not \
         enough to answer, say so."
    }
}

/// User prompt for the compose step.
pub fn compose_user(message: &str, snapshot: &str) -> String {
    format!("DATA:\n{snapshot}\n\nQUESTION:\n{message}")
}
