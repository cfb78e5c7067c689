use serde::{Deserialize, Serialize};

/// Analytic account kind.
///
/// ROOT accounts are the top-level categories; an owning set (a line or
/// a configuration) holds at most one entry per root. VIEW accounts
/// group without being postable; NORMAL accounts are the selectable
/// leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Root,
    View,
    Normal,
}

impl Default for AccountKind {
    fn default() -> Self {
        Self::Normal
    }
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "ROOT",
            Self::View => "VIEW",
            Self::Normal => "NORMAL",
        }
    }
}

/// AnalyticAccount — a cost/revenue dimension tag, organized in trees
/// under a ROOT category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticAccount {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub kind: AccountKind,

    /// Id of the ROOT account this account belongs to. None for roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Parent account in the tree. None for roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Owning company. None for accounts shared across companies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}
