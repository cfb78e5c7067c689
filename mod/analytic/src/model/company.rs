use serde::{Deserialize, Serialize};

/// Company — an operating entity. Analytic configuration, documents and
/// accounts are scoped to companies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    pub name: String,

    /// ISO currency code (e.g. "USD").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}
