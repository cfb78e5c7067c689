use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use openledger_core::ServiceError;

use crate::model::{Purchase, PurchaseLine, PurchaseRequest};
use crate::service::AnalyticService;
use crate::service::entry::LineDetail;
use super::model::{
    CreateDocumentRequest, CreatePurchaseLineRequest, DocumentListQuery, LineListQuery,
    NewPurchaseRequest, RequestListQuery, SelectProductRequest, page,
};

type ServiceState = Arc<AnalyticService>;

pub fn router(service: Arc<AnalyticService>) -> Router {
    Router::new()
        .route("/purchases", get(list_purchases).post(create_purchase))
        .route("/purchases/{id}", get(get_purchase).patch(update_purchase))
        .route("/purchase-lines", get(list_lines).post(create_line))
        .route("/purchase-lines/{id}", get(get_line).delete(delete_line))
        .route("/purchase-lines/{id}/@select-product", post(select_product))
        .route("/purchase-lines/{id}/@set-accounts", post(set_accounts))
        .route("/purchase-requests", get(list_requests).post(create_request))
        .route("/purchase-requests/{id}", get(get_request))
        .route(
            "/purchase-requests/{id}/@create-purchase",
            post(create_from_request),
        )
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

/// POST /purchases
async fn create_purchase(
    State(service): State<ServiceState>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<Json<Purchase>, ServiceError> {
    let purchase = service.create_purchase(req.company, req.party)?;
    Ok(Json(purchase))
}

/// GET /purchases — filterable by company.
async fn list_purchases(
    State(service): State<ServiceState>,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_purchases(
        &page(query.limit, query.offset),
        query.company.as_deref(),
    )?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /purchases/:id
async fn get_purchase(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Purchase>, ServiceError> {
    let purchase = service.get_purchase(&id)?;
    Ok(Json(purchase))
}

/// PATCH /purchases/:id — JSON merge-patch.
async fn update_purchase(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Purchase>, ServiceError> {
    let purchase = service.update_purchase(&id, patch)?;
    Ok(Json(purchase))
}

// ---------------------------------------------------------------------------
// Purchase lines
// ---------------------------------------------------------------------------

/// POST /purchase-lines
async fn create_line(
    State(service): State<ServiceState>,
    Json(req): Json<CreatePurchaseLineRequest>,
) -> Result<Json<LineDetail<PurchaseLine>>, ServiceError> {
    let line = service.create_purchase_line(req.purchase, req.product, req.quantity)?;
    Ok(Json(line))
}

/// GET /purchase-lines — `?parent=` filters by purchase.
async fn list_lines(
    State(service): State<ServiceState>,
    Query(query): Query<LineListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_purchase_lines(
        &page(query.limit, query.offset),
        query.parent.as_deref(),
    )?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /purchase-lines/:id — the line with entries and accountsByRoot.
async fn get_line(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<LineDetail<PurchaseLine>>, ServiceError> {
    let line = service.get_purchase_line(&id)?;
    Ok(Json(line))
}

/// POST /purchase-lines/:id/@select-product
async fn select_product(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(req): Json<SelectProductRequest>,
) -> Result<Json<LineDetail<PurchaseLine>>, ServiceError> {
    let line = service.select_purchase_line_product(&id, req.product)?;
    Ok(Json(line))
}

/// POST /purchase-lines/:id/@set-accounts
async fn set_accounts(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(accounts): Json<BTreeMap<String, Option<String>>>,
) -> Result<Json<LineDetail<PurchaseLine>>, ServiceError> {
    let line = service.set_purchase_line_accounts(&id, &accounts)?;
    Ok(Json(line))
}

/// DELETE /purchase-lines/:id — removes the line and its entries.
async fn delete_line(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_purchase_line(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ---------------------------------------------------------------------------
// Purchase requests
// ---------------------------------------------------------------------------

/// POST /purchase-requests
async fn create_request(
    State(service): State<ServiceState>,
    Json(req): Json<NewPurchaseRequest>,
) -> Result<Json<PurchaseRequest>, ServiceError> {
    let request = service.create_purchase_request(req.company, req.product, req.quantity)?;
    Ok(Json(request))
}

/// GET /purchase-requests — filterable by company and state.
async fn list_requests(
    State(service): State<ServiceState>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_purchase_requests(
        &page(query.limit, query.offset),
        query.company.as_deref(),
        query.state.as_deref(),
    )?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /purchase-requests/:id
async fn get_request(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseRequest>, ServiceError> {
    let request = service.get_purchase_request(&id)?;
    Ok(Json(request))
}

/// POST /purchase-requests/:id/@create-purchase — turn a draft request
/// into a purchase with one line carrying fresh copies of the
/// configured accounts.
async fn create_from_request(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Purchase>, ServiceError> {
    let purchase = service.create_purchase_from_request(&id)?;
    Ok(Json(purchase))
}
