use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use openledger_core::ServiceError;

use crate::model::TemplateCompany;
use crate::service::{AnalyticService, OperatingContext};
use super::model::{CreateTemplateCompanyRequest, CtxQuery, TemplateCompanyListQuery, page};

type ServiceState = Arc<AnalyticService>;

pub fn router(service: Arc<AnalyticService>) -> Router {
    Router::new()
        .route(
            "/template-companies",
            get(list_configs).post(create_config),
        )
        .route(
            "/template-companies/{id}",
            get(get_config).delete(delete_config),
        )
        .route("/template-companies/{id}/accounts", get(get_accounts))
        .route(
            "/template-companies/{id}/@set-accounts",
            post(set_accounts),
        )
        .with_state(service)
}

/// POST /template-companies — create the configuration row for a
/// (template, company) pair. `?company=` supplies the operating
/// context used when the body omits the company.
async fn create_config(
    State(service): State<ServiceState>,
    Query(ctx): Query<CtxQuery>,
    Json(req): Json<CreateTemplateCompanyRequest>,
) -> Result<Json<TemplateCompany>, ServiceError> {
    let ctx = OperatingContext {
        company: ctx.company,
    };
    let config = service.create_template_company(req.template, req.company, &ctx)?;
    Ok(Json(config))
}

/// GET /template-companies — filterable by template and company.
async fn list_configs(
    State(service): State<ServiceState>,
    Query(query): Query<TemplateCompanyListQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = service.list_template_companies(
        &page(query.limit, query.offset),
        query.template.as_deref(),
        query.company.as_deref(),
    )?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// GET /template-companies/:id
async fn get_config(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<TemplateCompany>, ServiceError> {
    let config = service.get_template_company(&id)?;
    Ok(Json(config))
}

/// DELETE /template-companies/:id — removes the row and its entries.
async fn delete_config(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    service.delete_template_company(&id)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// GET /template-companies/:id/accounts — the root→account map.
async fn get_accounts(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<BTreeMap<String, String>>, ServiceError> {
    let accounts = service.template_company_accounts(&id)?;
    Ok(Json(accounts))
}

/// POST /template-companies/:id/@set-accounts — write the map. A null
/// value removes that root's entry; roots absent from the body are
/// left alone.
async fn set_accounts(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(accounts): Json<BTreeMap<String, Option<String>>>,
) -> Result<Json<BTreeMap<String, String>>, ServiceError> {
    service.set_template_company_accounts(&id, &accounts)?;
    let accounts = service.template_company_accounts(&id)?;
    Ok(Json(accounts))
}
