use serde::{Deserialize, Serialize};

/// Invoice — a customer/supplier invoice document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// Issuing company id.
    pub company: String,

    /// Counterparty name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// InvoiceLine — a product line on an invoice. Unlike sale and purchase
/// lines, an invoice line may carry its own company, which takes
/// precedence over the invoice's when resolving analytic configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// Parent invoice id.
    pub invoice: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    #[serde(default)]
    pub quantity: f64,

    /// Line-level company override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}
