use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use openledger_core::ServiceError;

use crate::model::Company;
use crate::service::AnalyticService;
use super::model::{CompanyListQuery, CreateCompanyRequest, page};

type ServiceState = Arc<AnalyticService>;

pub fn router(service: Arc<AnalyticService>) -> Router {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/{id}",
            get(get_company).patch(update_company).delete(delete_company),
        )
        .with_state(service)
}

/// POST /companies — create a company.
async fn create_company(
    State(service): State<ServiceState>,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<Json<Company>, ServiceError> {
    let company = service.create_company(req.name, req.currency)?;
    Ok(Json(company))
}

/// GET /companies — list companies.
async fn list_companies(
    State(service): State<ServiceState>,
    Query(query): Query<CompanyListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_companies(&page(query.limit, query.offset))?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /companies/:id
async fn get_company(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<Company>, ServiceError> {
    let company = service.get_company(&id)?;
    Ok(Json(company))
}

/// PATCH /companies/:id — JSON merge-patch.
async fn update_company(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Company>, ServiceError> {
    let company = service.update_company(&id, patch)?;
    Ok(Json(company))
}

/// DELETE /companies/:id — also removes the company's analytic
/// configuration rows and their entries.
async fn delete_company(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_company(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
