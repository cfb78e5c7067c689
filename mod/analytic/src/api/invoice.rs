use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use openledger_core::ServiceError;

use crate::model::{Invoice, InvoiceLine};
use crate::service::AnalyticService;
use crate::service::entry::LineDetail;
use crate::service::invoice::CreateInvoiceLineInput;
use super::model::{
    CreateDocumentRequest, CreateInvoiceLineRequest, DocumentListQuery, LineListQuery,
    SelectProductRequest, page,
};

type ServiceState = Arc<AnalyticService>;

pub fn router(service: Arc<AnalyticService>) -> Router {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/{id}", get(get_invoice).patch(update_invoice))
        .route("/invoice-lines", get(list_lines).post(create_line))
        .route("/invoice-lines/{id}", get(get_line).delete(delete_line))
        .route("/invoice-lines/{id}/@select-product", post(select_product))
        .route("/invoice-lines/{id}/@set-accounts", post(set_accounts))
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

/// POST /invoices
async fn create_invoice(
    State(service): State<ServiceState>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<Json<Invoice>, ServiceError> {
    let invoice = service.create_invoice(req.company, req.party)?;
    Ok(Json(invoice))
}

/// GET /invoices — filterable by company.
async fn list_invoices(
    State(service): State<ServiceState>,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_invoices(
        &page(query.limit, query.offset),
        query.company.as_deref(),
    )?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /invoices/:id
async fn get_invoice(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, ServiceError> {
    let invoice = service.get_invoice(&id)?;
    Ok(Json(invoice))
}

/// PATCH /invoices/:id — JSON merge-patch.
async fn update_invoice(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Invoice>, ServiceError> {
    let invoice = service.update_invoice(&id, patch)?;
    Ok(Json(invoice))
}

// ---------------------------------------------------------------------------
// Invoice lines
// ---------------------------------------------------------------------------

/// POST /invoice-lines — creating a line with a product immediately
/// propagates the product's configured accounts.
async fn create_line(
    State(service): State<ServiceState>,
    Json(req): Json<CreateInvoiceLineRequest>,
) -> Result<Json<LineDetail<InvoiceLine>>, ServiceError> {
    let line = service.create_invoice_line(CreateInvoiceLineInput {
        invoice: req.invoice,
        product: req.product,
        quantity: req.quantity,
        company: req.company,
    })?;
    Ok(Json(line))
}

/// GET /invoice-lines — `?parent=` filters by invoice.
async fn list_lines(
    State(service): State<ServiceState>,
    Query(query): Query<LineListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_invoice_lines(
        &page(query.limit, query.offset),
        query.parent.as_deref(),
    )?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /invoice-lines/:id — the line with entries and accountsByRoot.
async fn get_line(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<LineDetail<InvoiceLine>>, ServiceError> {
    let line = service.get_invoice_line(&id)?;
    Ok(Json(line))
}

/// POST /invoice-lines/:id/@select-product — set or clear the product
/// and propagate its configured accounts onto the line.
async fn select_product(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(req): Json<SelectProductRequest>,
) -> Result<Json<LineDetail<InvoiceLine>>, ServiceError> {
    let line = service.select_invoice_line_product(&id, req.product)?;
    Ok(Json(line))
}

/// POST /invoice-lines/:id/@set-accounts — write the line's accounts
/// map directly; null removes a root's entry.
async fn set_accounts(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(accounts): Json<BTreeMap<String, Option<String>>>,
) -> Result<Json<LineDetail<InvoiceLine>>, ServiceError> {
    let line = service.set_invoice_line_accounts(&id, &accounts)?;
    Ok(Json(line))
}

/// DELETE /invoice-lines/:id — removes the line and its entries.
async fn delete_line(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_invoice_line(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
