use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use openledger_core::ServiceError;

use crate::model::{Product, Template};
use crate::service::AnalyticService;
use super::model::{CreateProductRequest, CreateTemplateRequest, ProductListQuery, page};

type ServiceState = Arc<AnalyticService>;

pub fn router(service: Arc<AnalyticService>) -> Router {
    Router::new()
        .route("/templates", get(list_templates).post(create_template))
        .route(
            "/templates/{id}",
            get(get_template).patch(update_template).delete(delete_template),
        )
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product).delete(delete_product))
        .with_state(service)
}

/// POST /templates
async fn create_template(
    State(service): State<ServiceState>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<Json<Template>, ServiceError> {
    let template = service.create_template(req.name)?;
    Ok(Json(template))
}

/// GET /templates
async fn list_templates(
    State(service): State<ServiceState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_templates(&page(query.limit, query.offset))?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /templates/:id
async fn get_template(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Template>, ServiceError> {
    let template = service.get_template(&id)?;
    Ok(Json(template))
}

/// PATCH /templates/:id — JSON merge-patch.
async fn update_template(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Template>, ServiceError> {
    let template = service.update_template(&id, patch)?;
    Ok(Json(template))
}

/// DELETE /templates/:id — cascades the template's analytic
/// configuration rows.
async fn delete_template(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_template(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// POST /products
async fn create_product(
    State(service): State<ServiceState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<Product>, ServiceError> {
    let product = service.create_product(req.template, req.code)?;
    Ok(Json(product))
}

/// GET /products — filterable by template.
async fn list_products(
    State(service): State<ServiceState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_products(
        &page(query.limit, query.offset),
        query.template.as_deref(),
    )?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /products/:id
async fn get_product(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ServiceError> {
    let product = service.get_product(&id)?;
    Ok(Json(product))
}

/// DELETE /products/:id
async fn delete_product(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_product(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
