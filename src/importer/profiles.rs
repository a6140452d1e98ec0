// ==========================================
// Logistics Sync - per-kind import profiles
// ==========================================
// The engine is written once; each of the six import
// pipelines is a configuration value here, not a copy of
// the engine. Label variants track how the upstream system
// renamed columns over the years (including one production
// typo that shipped and never got fixed).
// ==========================================

use crate::domain::{ComparePolicy, FieldType, RecordKind};
use crate::importer::schema::FieldSpec;

// ==========================================
// KindProfile - one pipeline's configuration
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct KindProfile {
    pub kind: RecordKind,
    /// Header tokens the encoding normalizer validates the
    /// legacy decode against.
    pub header_tokens: &'static [&'static str],
    pub fields: &'static [FieldSpec],
    /// Ordered field names whose canonical values form the
    /// business key.
    pub key_fields: &'static [&'static str],
    /// Identifier field checked against the counterparty
    /// reference set.
    pub referential_field: Option<&'static str>,
    pub compare_policy: ComparePolicy,
    /// Field carrying the record's document date, used for
    /// the windowed index load. Registry kinds have none.
    pub date_field: Option<&'static str>,
}

pub fn profile_for(kind: RecordKind) -> &'static KindProfile {
    match kind {
        RecordKind::Orders => &ORDERS,
        RecordKind::StockItems => &STOCK_ITEMS,
        RecordKind::FinanceDocs => &FINANCE_DOCS,
        RecordKind::Complaints => &COMPLAINTS,
        RecordKind::Vehicles => &VEHICLES,
        RecordKind::Trailers => &TRAILERS,
    }
}

// ==========================================
// Orders
// ==========================================
static ORDERS: KindProfile = KindProfile {
    kind: RecordKind::Orders,
    header_tokens: &["Филиал", "ИНН", "Номер", "Branch", "TIN"],
    fields: &[
        FieldSpec {
            name: "branch",
            labels: &["Филиал", "Подразделение", "Branch"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "doc_type",
            labels: &["Вид документа", "Тип документа", "DocType"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "doc_number",
            labels: &["Номер документа", "Номер", "Number"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "payer_tin",
            labels: &["ИНН плательщика", "ИНН", "TIN", "INN"],
            required: true,
            value_type: FieldType::Identifier,
        },
        FieldSpec {
            name: "doc_date",
            labels: &["Дата документа", "Дата", "Date"],
            required: true,
            value_type: FieldType::Date,
        },
        FieldSpec {
            name: "qty",
            labels: &["Количество", "Колличество", "Кол-во", "Qty"],
            required: false,
            value_type: FieldType::Int,
        },
        FieldSpec {
            name: "amount",
            labels: &["Сумма", "Сумма документа", "Amount"],
            required: false,
            value_type: FieldType::Decimal,
        },
        FieldSpec {
            name: "deadline",
            labels: &["Срок доставки", "Крайний срок", "Deadline"],
            required: false,
            value_type: FieldType::Date,
        },
        FieldSpec {
            name: "done",
            labels: &["Выполнен", "Исполнен", "Done"],
            required: false,
            value_type: FieldType::Bool,
        },
    ],
    key_fields: &["branch", "doc_type", "doc_number", "payer_tin"],
    referential_field: Some("payer_tin"),
    compare_policy: ComparePolicy::AlwaysWrite,
    date_field: Some("doc_date"),
};

// ==========================================
// Stock items (daily balances)
// ==========================================
static STOCK_ITEMS: KindProfile = KindProfile {
    kind: RecordKind::StockItems,
    header_tokens: &["Склад", "ИНН", "Warehouse", "Branch", "TIN"],
    fields: &[
        FieldSpec {
            name: "warehouse",
            labels: &["Склад", "Филиал", "Warehouse", "Branch"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "owner_tin",
            labels: &["ИНН владельца", "ИНН", "TIN", "INN"],
            required: true,
            value_type: FieldType::Identifier,
        },
        FieldSpec {
            name: "doc_date",
            labels: &["Дата остатка", "Дата", "Date"],
            required: true,
            value_type: FieldType::Date,
        },
        FieldSpec {
            name: "qty",
            labels: &["Количество", "Колличество", "Qty"],
            required: false,
            value_type: FieldType::Int,
        },
        FieldSpec {
            name: "weight",
            labels: &["Вес", "Вес кг", "Weight"],
            required: false,
            value_type: FieldType::Decimal,
        },
    ],
    key_fields: &["warehouse", "owner_tin", "doc_date"],
    referential_field: Some("owner_tin"),
    compare_policy: ComparePolicy::AlwaysWrite,
    date_field: Some("doc_date"),
};

// ==========================================
// Finance documents
// ==========================================
// The only kind that compares before writing: amount is its
// single mutable field and the extract is large, so skipping
// no-op updates is worth the asymmetry with the other kinds.
static FINANCE_DOCS: KindProfile = KindProfile {
    kind: RecordKind::FinanceDocs,
    header_tokens: &["Филиал", "ИНН", "Сумма", "Branch", "TIN"],
    fields: &[
        FieldSpec {
            name: "branch",
            labels: &["Филиал", "Branch"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "doc_number",
            labels: &["Номер документа", "Номер", "Number"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "doc_date",
            labels: &["Дата документа", "Дата", "Date"],
            required: true,
            value_type: FieldType::Date,
        },
        FieldSpec {
            name: "tin",
            labels: &["ИНН контрагента", "ИНН", "TIN", "INN"],
            required: true,
            value_type: FieldType::Identifier,
        },
        FieldSpec {
            name: "amount",
            labels: &["Сумма", "Amount"],
            required: false,
            value_type: FieldType::Decimal,
        },
        FieldSpec {
            name: "paid",
            labels: &["Оплачен", "Paid"],
            required: false,
            value_type: FieldType::Bool,
        },
    ],
    key_fields: &["branch", "doc_number", "doc_date", "tin"],
    referential_field: Some("tin"),
    compare_policy: ComparePolicy::SkipIfUnchanged { field: "amount" },
    date_field: Some("doc_date"),
};

// ==========================================
// Complaints
// ==========================================
static COMPLAINTS: KindProfile = KindProfile {
    kind: RecordKind::Complaints,
    header_tokens: &["Филиал", "ИНН", "претензи", "Branch", "TIN"],
    fields: &[
        FieldSpec {
            name: "branch",
            labels: &["Филиал", "Branch"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "claim_number",
            labels: &["Номер претензии", "Номер", "Claim"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "tin",
            labels: &["ИНН контрагента", "ИНН", "TIN", "INN"],
            required: true,
            value_type: FieldType::Identifier,
        },
        FieldSpec {
            name: "opened_at",
            labels: &["Дата претензии", "Дата", "Date"],
            required: true,
            value_type: FieldType::Date,
        },
        FieldSpec {
            name: "status",
            labels: &["Статус", "Status"],
            required: false,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "resolved_at",
            labels: &["Дата решения", "Дата завершения", "Resolved"],
            required: false,
            value_type: FieldType::Date,
        },
    ],
    key_fields: &["branch", "claim_number", "tin"],
    referential_field: Some("tin"),
    compare_policy: ComparePolicy::AlwaysWrite,
    date_field: Some("opened_at"),
};

// ==========================================
// Vehicle registry
// ==========================================
static VEHICLES: KindProfile = KindProfile {
    kind: RecordKind::Vehicles,
    header_tokens: &["Гос номер", "Госномер", "ИНН", "Филиал", "RegNumber", "TIN"],
    fields: &[
        FieldSpec {
            name: "branch",
            labels: &["Филиал", "Подразделение", "Branch"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "reg_number",
            labels: &["Гос номер", "Госномер", "Рег номер", "RegNumber"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "owner_tin",
            labels: &["ИНН владельца", "ИНН", "TIN", "INN"],
            required: true,
            value_type: FieldType::Identifier,
        },
        FieldSpec {
            name: "brand",
            labels: &["Марка", "Brand"],
            required: false,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "model",
            labels: &["Модель", "Model"],
            required: false,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "year",
            labels: &["Год выпуска", "Год", "Year"],
            required: false,
            value_type: FieldType::Int,
        },
    ],
    key_fields: &["branch", "reg_number", "owner_tin"],
    referential_field: Some("owner_tin"),
    compare_policy: ComparePolicy::AlwaysWrite,
    date_field: None,
};

// ==========================================
// Trailer registry
// ==========================================
static TRAILERS: KindProfile = KindProfile {
    kind: RecordKind::Trailers,
    header_tokens: &["Гос номер", "Госномер", "ИНН", "Филиал", "RegNumber", "TIN"],
    fields: &[
        FieldSpec {
            name: "branch",
            labels: &["Филиал", "Подразделение", "Branch"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "reg_number",
            labels: &["Гос номер прицепа", "Гос номер", "Госномер", "RegNumber"],
            required: true,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "owner_tin",
            labels: &["ИНН владельца", "ИНН", "TIN", "INN"],
            required: true,
            value_type: FieldType::Identifier,
        },
        FieldSpec {
            name: "brand",
            labels: &["Марка", "Brand"],
            required: false,
            value_type: FieldType::Text,
        },
        FieldSpec {
            name: "capacity",
            labels: &["Грузоподъемность", "Грузоподъёмность", "Capacity"],
            required: false,
            value_type: FieldType::Decimal,
        },
    ],
    key_fields: &["branch", "reg_number", "owner_tin"],
    referential_field: Some("owner_tin"),
    compare_policy: ComparePolicy::AlwaysWrite,
    date_field: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(profile: &'a KindProfile, name: &str) -> Option<&'a FieldSpec> {
        profile.fields.iter().find(|f| f.name == name)
    }

    #[test]
    fn test_profiles_are_internally_consistent() {
        for kind in RecordKind::ALL {
            let profile = profile_for(kind);
            assert_eq!(profile.kind, kind);
            assert!(
                (3..=4).contains(&profile.key_fields.len()),
                "{kind}: business key must be 3-4 fields"
            );

            for key_field in profile.key_fields {
                let spec = field(profile, key_field)
                    .unwrap_or_else(|| panic!("{kind}: key field {key_field} not declared"));
                assert!(spec.required, "{kind}: key field {key_field} must be required");
            }

            if let Some(ref_field) = profile.referential_field {
                let spec = field(profile, ref_field).unwrap();
                assert_eq!(spec.value_type, FieldType::Identifier);
            }

            if let Some(date_field) = profile.date_field {
                let spec = field(profile, date_field).unwrap();
                assert_eq!(spec.value_type, FieldType::Date);
            }

            if let ComparePolicy::SkipIfUnchanged { field: cmp } = profile.compare_policy {
                assert!(field(profile, cmp).is_some());
            }
        }
    }

    #[test]
    fn test_only_finance_compares_before_write() {
        for kind in RecordKind::ALL {
            let profile = profile_for(kind);
            match kind {
                RecordKind::FinanceDocs => assert_eq!(
                    profile.compare_policy,
                    ComparePolicy::SkipIfUnchanged { field: "amount" }
                ),
                _ => assert_eq!(profile.compare_policy, ComparePolicy::AlwaysWrite),
            }
        }
    }

    #[test]
    fn test_registry_keys_are_branch_scoped() {
        // registry rows are unique per branch, not globally
        for kind in [RecordKind::Vehicles, RecordKind::Trailers] {
            assert_eq!(
                profile_for(kind).key_fields,
                &["branch", "reg_number", "owner_tin"]
            );
        }
    }

    #[test]
    fn test_registry_kinds_have_no_window_field() {
        assert!(profile_for(RecordKind::Vehicles).date_field.is_none());
        assert!(profile_for(RecordKind::Trailers).date_field.is_none());
    }
}
