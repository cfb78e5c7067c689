use serde::{Deserialize, Serialize};

/// TemplateCompany — the per-(template, company) analytic configuration
/// record. At most one row exists per pair; its analytic entries hold
/// the chosen account for each root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCompany {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// Template id.
    pub template: String,

    /// Company id.
    pub company: String,

    /// Provenance: who created the row. Migrated rows inherit the
    /// earliest creator among their legacy entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}
