use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use openledger_core::ServiceError;

use crate::service::AnalyticService;
use crate::service::meta::LineFormMeta;

type ServiceState = Arc<AnalyticService>;

pub fn router(service: Arc<AnalyticService>) -> Router {
    Router::new()
        .route("/meta/line-form", get(line_form))
        .with_state(service)
}

/// GET /meta/line-form — one selector field descriptor per ROOT
/// account, cached until the account set changes.
async fn line_form(
    State(service): State<ServiceState>,
) -> Result<Json<LineFormMeta>, ServiceError> {
    let meta = service.line_form_meta()?;
    Ok(Json(meta))
}
