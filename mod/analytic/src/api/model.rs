//! Request bodies and query parameters for the analytic API.

use serde::Deserialize;

use openledger_core::ListParams;

use crate::model::AccountKind;

/// Build ListParams from optional query fields.
pub(super) fn page(limit: Option<usize>, offset: Option<usize>) -> ListParams {
    let mut params = ListParams::default();
    if let Some(limit) = limit {
        params.limit = limit;
    }
    if let Some(offset) = offset {
        params.offset = offset;
    }
    params
}

/// Query parameters carrying the caller's operating company.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtxQuery {
    #[serde(default)]
    pub company: Option<String>,
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

/// Body for `POST /companies`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub name: String,

    #[serde(default)]
    pub currency: Option<String>,
}

/// Query parameters for `GET /companies`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListQuery {
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: Option<usize>,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Body for `POST /accounts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub name: String,

    #[serde(default)]
    pub kind: AccountKind,

    #[serde(default)]
    pub root: Option<String>,

    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub company: Option<String>,
}

/// Query parameters for `GET /accounts`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountListQuery {
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: Option<usize>,

    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub root: Option<String>,

    #[serde(default)]
    pub company: Option<String>,
}

// ---------------------------------------------------------------------------
// Templates and products
// ---------------------------------------------------------------------------

/// Body for `POST /templates`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub name: String,
}

/// Body for `POST /products`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub template: String,

    #[serde(default)]
    pub code: Option<String>,
}

/// Query parameters for `GET /products`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: Option<usize>,

    #[serde(default)]
    pub template: Option<String>,
}

// ---------------------------------------------------------------------------
// Template-company configuration
// ---------------------------------------------------------------------------

/// Body for `POST /template-companies`. The company defaults to the
/// `?company=` operating context when omitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateCompanyRequest {
    pub template: String,

    #[serde(default)]
    pub company: Option<String>,
}

/// Query parameters for `GET /template-companies`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCompanyListQuery {
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: Option<usize>,

    #[serde(default)]
    pub template: Option<String>,

    #[serde(default)]
    pub company: Option<String>,
}

// ---------------------------------------------------------------------------
// Documents and lines
// ---------------------------------------------------------------------------

/// Body for `POST /invoices`, `POST /sales`, `POST /purchases`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub company: String,

    #[serde(default)]
    pub party: Option<String>,
}

/// Query parameters for document listings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListQuery {
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: Option<usize>,

    #[serde(default)]
    pub company: Option<String>,
}

/// Body for `POST /invoice-lines`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceLineRequest {
    pub invoice: String,

    #[serde(default)]
    pub product: Option<String>,

    #[serde(default)]
    pub quantity: f64,

    /// Line-level company override.
    #[serde(default)]
    pub company: Option<String>,
}

/// Body for `POST /sale-lines`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleLineRequest {
    pub sale: String,

    #[serde(default)]
    pub product: Option<String>,

    #[serde(default)]
    pub quantity: f64,
}

/// Body for `POST /purchase-lines`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseLineRequest {
    pub purchase: String,

    #[serde(default)]
    pub product: Option<String>,

    #[serde(default)]
    pub quantity: f64,
}

/// Query parameters for line listings; `parent` filters by the owning
/// document id.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineListQuery {
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: Option<usize>,

    #[serde(default)]
    pub parent: Option<String>,
}

/// Body for `POST /{kind}-lines/{id}/@select-product`. A null or
/// missing product clears the selection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectProductRequest {
    #[serde(default)]
    pub product: Option<String>,
}

// ---------------------------------------------------------------------------
// Purchase requests
// ---------------------------------------------------------------------------

/// Body for `POST /purchase-requests`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseRequest {
    pub company: String,

    pub product: String,

    #[serde(default)]
    pub quantity: f64,
}

/// Query parameters for `GET /purchase-requests`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListQuery {
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: Option<usize>,

    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub state: Option<String>,
}
