use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use openledger_core::ServiceError;

use crate::model::{Sale, SaleLine};
use crate::service::AnalyticService;
use crate::service::entry::LineDetail;
use super::model::{
    CreateDocumentRequest, CreateSaleLineRequest, DocumentListQuery, LineListQuery,
    SelectProductRequest, page,
};

type ServiceState = Arc<AnalyticService>;

pub fn router(service: Arc<AnalyticService>) -> Router {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/{id}", get(get_sale).patch(update_sale))
        .route("/sale-lines", get(list_lines).post(create_line))
        .route("/sale-lines/{id}", get(get_line).delete(delete_line))
        .route("/sale-lines/{id}/@select-product", post(select_product))
        .route("/sale-lines/{id}/@set-accounts", post(set_accounts))
        .with_state(service)
}

/// POST /sales
async fn create_sale(
    State(service): State<ServiceState>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<Json<Sale>, ServiceError> {
    let sale = service.create_sale(req.company, req.party)?;
    Ok(Json(sale))
}

/// GET /sales — filterable by company.
async fn list_sales(
    State(service): State<ServiceState>,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_sales(
        &page(query.limit, query.offset),
        query.company.as_deref(),
    )?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /sales/:id
async fn get_sale(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ServiceError> {
    let sale = service.get_sale(&id)?;
    Ok(Json(sale))
}

/// PATCH /sales/:id — JSON merge-patch.
async fn update_sale(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Sale>, ServiceError> {
    let sale = service.update_sale(&id, patch)?;
    Ok(Json(sale))
}

/// POST /sale-lines
async fn create_line(
    State(service): State<ServiceState>,
    Json(req): Json<CreateSaleLineRequest>,
) -> Result<Json<LineDetail<SaleLine>>, ServiceError> {
    let line = service.create_sale_line(req.sale, req.product, req.quantity)?;
    Ok(Json(line))
}

/// GET /sale-lines — `?parent=` filters by sale.
async fn list_lines(
    State(service): State<ServiceState>,
    Query(query): Query<LineListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_sale_lines(
        &page(query.limit, query.offset),
        query.parent.as_deref(),
    )?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /sale-lines/:id — the line with entries and accountsByRoot.
async fn get_line(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<LineDetail<SaleLine>>, ServiceError> {
    let line = service.get_sale_line(&id)?;
    Ok(Json(line))
}

/// POST /sale-lines/:id/@select-product — set or clear the product and
/// propagate its configured accounts onto the line.
async fn select_product(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(req): Json<SelectProductRequest>,
) -> Result<Json<LineDetail<SaleLine>>, ServiceError> {
    let line = service.select_sale_line_product(&id, req.product)?;
    Ok(Json(line))
}

/// POST /sale-lines/:id/@set-accounts
async fn set_accounts(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(accounts): Json<BTreeMap<String, Option<String>>>,
) -> Result<Json<LineDetail<SaleLine>>, ServiceError> {
    let line = service.set_sale_line_accounts(&id, &accounts)?;
    Ok(Json(line))
}

/// DELETE /sale-lines/:id — removes the line and its entries.
async fn delete_line(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_sale_line(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
