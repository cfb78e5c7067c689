use serde::{Deserialize, Serialize};

/// The owning set an analytic entry belongs to: a per-company template
/// configuration, or one of the document line types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntryOrigin {
    TemplateCompany(String),
    InvoiceLine(String),
    SaleLine(String),
    PurchaseLine(String),
}

impl EntryOrigin {
    /// The `origin_kind` column value.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::TemplateCompany(_) => "template_company",
            Self::InvoiceLine(_) => "invoice_line",
            Self::SaleLine(_) => "sale_line",
            Self::PurchaseLine(_) => "purchase_line",
        }
    }

    /// The `origin_id` column value.
    pub fn id(&self) -> &str {
        match self {
            Self::TemplateCompany(id)
            | Self::InvoiceLine(id)
            | Self::SaleLine(id)
            | Self::PurchaseLine(id) => id,
        }
    }
}

/// AnalyticEntry — one (root, account) slot on an owning set. The root
/// is unique within the set; propagation overwrites the account rather
/// than adding a second entry for the same root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticEntry {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// ROOT account id this slot is for.
    pub root: String,

    /// Chosen account under that root. None while unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Owning set reference.
    pub origin: EntryOrigin,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_tagged_encoding() {
        let origin = EntryOrigin::TemplateCompany("tc1".into());
        let json = serde_json::to_value(&origin).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "template_company", "id": "tc1"})
        );
        let back: EntryOrigin = serde_json::from_value(json).unwrap();
        assert_eq!(back, origin);
        assert_eq!(origin.kind_str(), "template_company");
        assert_eq!(origin.id(), "tc1");
    }

    #[test]
    fn entry_json_roundtrip() {
        let e = AnalyticEntry {
            id: "e1".into(),
            root: "r1".into(),
            account: Some("a1".into()),
            origin: EntryOrigin::SaleLine("sl1".into()),
            created_by: None,
            create_at: None,
            update_at: None,
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: AnalyticEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }
}
