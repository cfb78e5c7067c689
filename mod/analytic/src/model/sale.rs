use serde::{Deserialize, Serialize};

/// Sale — a sale order document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// Selling company id.
    pub company: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// SaleLine — a product line on a sale order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// Parent sale id.
    pub sale: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}
