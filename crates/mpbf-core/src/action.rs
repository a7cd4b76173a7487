//! The closed action registry.
//!
//! Dispatch is by exact tag lookup against this enum. Unrecognized tags
//! are rejected explicitly instead of falling through substring checks,
//! so one action name being a substring of another can never misroute.

use crate::Language;
use serde::{Deserialize, Serialize};

/// Every operation the executor knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateOrder,
    UpdateOrder,
    DeleteOrder,
    CreateRoll,
    CreateMaintenance,
    CreateCustomer,
    CreateQualityCheck,
    /// Registry tag `add_product`.
    CreateCustomerProduct,
    /// Registry tag `add_machine`.
    CreateMachine,
    AnalyzePerformance,
}

/// A field an action cannot run without.
///
/// `keys` are the accepted parameter names (any one satisfies the
/// requirement, e.g. a customer may be referenced by id or by name).
#[derive(Debug, Clone, Copy)]
pub struct RequiredField {
    pub keys: &'static [&'static str],
    pub name_en: &'static str,
    pub name_ar: &'static str,
}

impl RequiredField {
    /// Display name in the given language.
    pub fn display(&self, language: Language) -> &'static str {
        match language {
            Language::Arabic => self.name_ar,
            Language::English => self.name_en,
        }
    }

    /// Whether `parameters` satisfies this field via any accepted key.
    pub fn satisfied_by(&self, parameters: &serde_json::Value) -> bool {
        self.keys.iter().any(|key| {
            parameters
                .get(key)
                .is_some_and(|v| !v.is_null() && v.as_str() != Some(""))
        })
    }
}

impl Action {
    /// All registered actions, used when listing tags for the classifier
    /// prompt.
    pub const ALL: &'static [Action] = &[
        Action::CreateOrder,
        Action::UpdateOrder,
        Action::DeleteOrder,
        Action::CreateRoll,
        Action::CreateMaintenance,
        Action::CreateCustomer,
        Action::CreateQualityCheck,
        Action::CreateCustomerProduct,
        Action::CreateMachine,
        Action::AnalyzePerformance,
    ];

    /// Canonical registry tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::CreateOrder => "create_order",
            Self::UpdateOrder => "update_order",
            Self::DeleteOrder => "delete_order",
            Self::CreateRoll => "create_roll",
            Self::CreateMaintenance => "create_maintenance",
            Self::CreateCustomer => "create_customer",
            Self::CreateQualityCheck => "create_quality_check",
            Self::CreateCustomerProduct => "add_product",
            Self::CreateMachine => "add_machine",
            Self::AnalyzePerformance => "analyze_performance",
        }
    }

    /// Parse a classifier tag. Exact match only; unknown tags are `None`
    /// and must be handled by the generic fallback, never executed.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.tag() == tag)
    }

    /// Table this action mutates or reads.
    pub fn table(self) -> Option<&'static str> {
        match self {
            Self::CreateOrder | Self::UpdateOrder | Self::DeleteOrder => Some("orders"),
            Self::CreateRoll => Some("rolls"),
            Self::CreateMaintenance => Some("maintenance_requests"),
            Self::CreateCustomer => Some("customers"),
            Self::CreateQualityCheck => Some("quality_checks"),
            Self::CreateCustomerProduct => Some("customer_products"),
            Self::CreateMachine => Some("machines"),
            Self::AnalyzePerformance => None,
        }
    }

    /// Whether this action writes to the database. Mutating actions must
    /// pass the confirmation gate before reaching the executor.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::AnalyzePerformance)
    }

    /// Operation verb for outcome reporting and the learning log.
    pub fn operation(self) -> &'static str {
        match self {
            Self::UpdateOrder => "update",
            Self::DeleteOrder => "delete",
            Self::AnalyzePerformance => "select",
            _ => "insert",
        }
    }

    /// Fields the executor refuses to run without.
    pub fn required_fields(self) -> &'static [RequiredField] {
        match self {
            Self::CreateCustomer => &[
                RequiredField {
                    keys: &["name"],
                    name_en: "customer name",
                    name_ar: "اسم العميل",
                },
                RequiredField {
                    keys: &["phone"],
                    name_en: "phone number",
                    name_ar: "رقم الهاتف",
                },
            ],
            Self::CreateOrder => &[
                RequiredField {
                    keys: &["customer_id", "customer_name"],
                    name_en: "customer id or name",
                    name_ar: "معرف العميل أو اسمه",
                },
                RequiredField {
                    keys: &["delivery_date"],
                    name_en: "delivery date",
                    name_ar: "تاريخ التسليم",
                },
            ],
            Self::UpdateOrder | Self::DeleteOrder => &[RequiredField {
                keys: &["order_id"],
                name_en: "order id",
                name_ar: "رقم الطلب",
            }],
            Self::CreateRoll => &[
                RequiredField {
                    keys: &["production_order_id"],
                    name_en: "production order id",
                    name_ar: "رقم أمر التشغيل",
                },
                RequiredField {
                    keys: &["weight"],
                    name_en: "roll weight",
                    name_ar: "وزن الرول",
                },
            ],
            Self::CreateMaintenance => &[
                RequiredField {
                    keys: &["machine_id"],
                    name_en: "machine id",
                    name_ar: "رقم المكينة",
                },
                RequiredField {
                    keys: &["description"],
                    name_en: "issue description",
                    name_ar: "وصف العطل",
                },
            ],
            Self::CreateQualityCheck => &[
                RequiredField {
                    keys: &["production_order_id"],
                    name_en: "production order id",
                    name_ar: "رقم أمر التشغيل",
                },
                RequiredField {
                    keys: &["status"],
                    name_en: "check result",
                    name_ar: "نتيجة الفحص",
                },
            ],
            Self::CreateCustomerProduct => &[
                RequiredField {
                    keys: &["customer_id"],
                    name_en: "customer id",
                    name_ar: "معرف العميل",
                },
                RequiredField {
                    keys: &["category"],
                    name_en: "product category",
                    name_ar: "فئة المنتج",
                },
            ],
            Self::CreateMachine => &[
                RequiredField {
                    keys: &["name"],
                    name_en: "machine name",
                    name_ar: "اسم المكينة",
                },
                RequiredField {
                    keys: &["section"],
                    name_en: "section (film, printing, cutting)",
                    name_ar: "القسم (فيلم، طباعة، تقطيع)",
                },
            ],
            Self::AnalyzePerformance => &[],
        }
    }

    /// Missing required fields, localized for the clarification message.
    pub fn missing_fields(
        self,
        parameters: &serde_json::Value,
        language: Language,
    ) -> Vec<&'static str> {
        self.required_fields()
            .iter()
            .filter(|f| !f.satisfied_by(parameters))
            .map(|f| f.display(language))
            .collect()
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
