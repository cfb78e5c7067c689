use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use openledger_core::ServiceError;

use crate::model::AnalyticAccount;
use crate::service::AnalyticService;
use crate::service::account::{AccountFilters, CreateAccountInput};
use super::model::{AccountListQuery, CreateAccountRequest, page};

type ServiceState = Arc<AnalyticService>;

pub fn router(service: Arc<AnalyticService>) -> Router {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{id}",
            get(get_account).patch(update_account).delete(delete_account),
        )
        .with_state(service)
}

/// POST /accounts — create an analytic account.
async fn create_account(
    State(service): State<ServiceState>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<Json<AnalyticAccount>, ServiceError> {
    let account = service.create_account(CreateAccountInput {
        name: req.name,
        kind: req.kind,
        root: req.root,
        parent: req.parent,
        company: req.company,
    })?;
    Ok(Json(account))
}

/// GET /accounts — list, filterable by kind, root, and company.
async fn list_accounts(
    State(service): State<ServiceState>,
    Query(query): Query<AccountListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let filters = AccountFilters {
        kind: query.kind,
        root: query.root,
        company: query.company,
    };
    let result = service.list_accounts(&page(query.limit, query.offset), &filters)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /accounts/:id
async fn get_account(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<AnalyticAccount>, ServiceError> {
    let account = service.get_account(&id)?;
    Ok(Json(account))
}

/// PATCH /accounts/:id — JSON merge-patch.
async fn update_account(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<AnalyticAccount>, ServiceError> {
    let account = service.update_account(&id, patch)?;
    Ok(Json(account))
}

/// DELETE /accounts/:id
async fn delete_account(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_account(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
