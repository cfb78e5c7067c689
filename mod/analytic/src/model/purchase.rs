use serde::{Deserialize, Serialize};

/// Purchase — a purchase order document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// Buying company id.
    pub company: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// PurchaseLine — a product line on a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// Parent purchase id.
    pub purchase: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// Purchase request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Draft,
    Purchased,
}

impl Default for RequestState {
    fn default() -> Self {
        Self::Draft
    }
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Purchased => "PURCHASED",
        }
    }
}

/// PurchaseRequest — a demand for a product that @create-purchase turns
/// into a purchase order with one line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// UUID primary key.
    #[serde(default)]
    pub id: String,

    /// Requesting company id.
    pub company: String,

    /// Requested product id.
    pub product: String,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default)]
    pub state: RequestState,

    /// Purchase created from this request, once purchased.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}
