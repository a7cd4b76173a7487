//! Bilingual user-facing message catalog.
//!
//! Every string the pipeline sends back to an operator comes from here,
//! in the language detected from the operator's own message. Raw error
//! codes and stack traces never pass through this module; execution
//! failures carry only the operator-level error text.

use crate::{Action, Language};

/// Response to a command the classifier could not make sense of.
pub fn did_not_understand(language: Language) -> String {
    match language {
        Language::Arabic => {
            "عذراً، لم أفهم طلبك. جرّب مثلاً: \"سجل عميل جديد\" أو \"اعرض أداء الإنتاج\".".to_string()
        }
        Language::English => {
            "Sorry, I didn't understand that. Try something like \"register a new customer\" or \"show production performance\".".to_string()
        }
    }
}

/// Generic informative reply for commands outside the factory domain.
pub fn outside_domain(language: Language) -> String {
    match language {
        Language::Arabic => {
            "أستطيع مساعدتك في إدارة المصنع: الطلبات، أوامر التشغيل، العملاء، المكائن، الصيانة والجودة.".to_string()
        }
        Language::English => {
            "I can help with factory operations: orders, production orders, customers, machines, maintenance and quality checks.".to_string()
        }
    }
}

/// Clarification listing the missing required fields, optionally enriched
/// with example values drawn from existing records.
pub fn clarification(language: Language, missing: &[&str], examples: Option<&str>) -> String {
    let fields = missing.join(language.separator());
    let mut text = match language {
        Language::Arabic => format!("لإكمال العملية أحتاج إلى: {}.", fields),
        Language::English => format!("To complete this I still need: {}.", fields),
    };
    if let Some(examples) = examples {
        text.push(' ');
        match language {
            Language::Arabic => text.push_str(&format!("أمثلة من السجلات الحالية: {}.", examples)),
            Language::English => text.push_str(&format!("Examples from existing records: {}.", examples)),
        }
    }
    text
}

/// Human-readable summary of a pending mutating action, shown to the
/// operator before they confirm.
pub fn confirmation_summary(
    language: Language,
    action: Action,
    parameters: &serde_json::Value,
) -> String {
    let details = parameter_lines(parameters, language);
    match language {
        Language::Arabic => format!(
            "سأقوم بـ{}{}. هل تريد التأكيد؟",
            action_title(action, language),
            details
        ),
        Language::English => format!(
            "I will {}{}. Do you want to confirm?",
            action_title(action, language),
            details
        ),
    }
}

/// Success message for a completed mutating action, embedding the record
/// identifier.
pub fn action_succeeded(language: Language, action: Action, identifier: &str) -> String {
    match (language, action.operation()) {
        (Language::Arabic, "update") => format!("تم تحديث {} ({}) بنجاح.", action_title(action, language), identifier),
        (Language::Arabic, "delete") => format!("تم حذف {} ({}) بنجاح.", action_title(action, language), identifier),
        (Language::Arabic, _) => format!("تم {} بنجاح. المعرف: {}.", action_title(action, language), identifier),
        (Language::English, "update") => format!("Updated successfully ({}).", identifier),
        (Language::English, "delete") => format!("Deleted successfully ({}).", identifier),
        (Language::English, _) => format!("Done, {} succeeded. Identifier: {}.", action_title(action, language), identifier),
    }
}

/// Failure message for a mutating action. `detail` is operator-level
/// error text, not a stack trace.
pub fn action_failed(language: Language, action: Action, detail: &str) -> String {
    match language {
        Language::Arabic => format!("تعذر تنفيذ {}: {}", action_title(action, language), detail),
        Language::English => format!("Could not {}: {}", action_title(action, language), detail),
    }
}

/// Rejection for a confirmation payload whose action tag is not in the
/// registry.
pub fn unknown_action(language: Language) -> String {
    match language {
        Language::Arabic => "هذه العملية غير مدعومة.".to_string(),
        Language::English => "This operation is not supported.".to_string(),
    }
}

/// Short localized verb phrase per action, used inside summaries and
/// success/failure messages.
pub fn action_title(action: Action, language: Language) -> &'static str {
    match (action, language) {
        (Action::CreateOrder, Language::Arabic) => "إنشاء طلب جديد",
        (Action::CreateOrder, Language::English) => "create a new order",
        (Action::UpdateOrder, Language::Arabic) => "الطلب",
        (Action::UpdateOrder, Language::English) => "update the order",
        (Action::DeleteOrder, Language::Arabic) => "الطلب",
        (Action::DeleteOrder, Language::English) => "delete the order",
        (Action::CreateRoll, Language::Arabic) => "تسجيل رول جديد",
        (Action::CreateRoll, Language::English) => "register a new roll",
        (Action::CreateMaintenance, Language::Arabic) => "فتح بلاغ صيانة",
        (Action::CreateMaintenance, Language::English) => "open a maintenance request",
        (Action::CreateCustomer, Language::Arabic) => "تسجيل عميل جديد",
        (Action::CreateCustomer, Language::English) => "register a new customer",
        (Action::CreateQualityCheck, Language::Arabic) => "تسجيل فحص جودة",
        (Action::CreateQualityCheck, Language::English) => "record a quality check",
        (Action::CreateCustomerProduct, Language::Arabic) => "إضافة منتج للعميل",
        (Action::CreateCustomerProduct, Language::English) => "add a customer product",
        (Action::CreateMachine, Language::Arabic) => "إضافة مكينة",
        (Action::CreateMachine, Language::English) => "add a machine",
        (Action::AnalyzePerformance, Language::Arabic) => "تحليل الأداء",
        (Action::AnalyzePerformance, Language::English) => "analyze performance",
    }
}

impl Language {
    fn separator(self) -> &'static str {
        match self {
            Language::Arabic => "، ",
            Language::English => ", ",
        }
    }
}

/// Render scalar parameters as a localized detail suffix.
fn parameter_lines(parameters: &serde_json::Value, language: Language) -> String {
    let Some(map) = parameters.as_object() else {
        return String::new();
    };
    let rendered: Vec<String> = map
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) if !s.is_empty() => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some(format!("{}: {}", key, value))
        })
        .collect();
    if rendered.is_empty() {
        String::new()
    } else {
        format!(" ({})", rendered.join(language.separator()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clarification_enumerates_fields() {
        let text = clarification(
            Language::Arabic,
            &["معرف العميل أو اسمه", "تاريخ التسليم"],
            None,
        );
        assert!(text.contains("معرف العميل أو اسمه"));
        assert!(text.contains("تاريخ التسليم"));
    }

    #[test]
    fn clarification_appends_examples() {
        let text = clarification(
            Language::English,
            &["customer id or name"],
            Some("1 (Al-Noor Co), 2 (Delta Pack)"),
        );
        assert!(text.contains("customer id or name"));
        assert!(text.contains("Al-Noor Co"));
    }

    #[test]
    fn summary_includes_parameters() {
        let text = confirmation_summary(
            Language::Arabic,
            Action::CreateCustomer,
            &json!({"name": "شركة النور", "phone": "0501234567"}),
        );
        assert!(text.contains("تسجيل عميل جديد"));
        assert!(text.contains("شركة النور"));
        assert!(text.contains("0501234567"));
    }

    #[test]
    fn success_embeds_identifier() {
        let text = action_succeeded(Language::English, Action::CreateOrder, "ORD-1024");
        assert!(text.contains("ORD-1024"));
        let text = action_succeeded(Language::Arabic, Action::CreateCustomer, "17");
        assert!(text.contains("17"));
    }
}
