use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use openledger_core::ServiceError;

use crate::service::AnalyticService;
use crate::service::entry::EntryDetail;

type ServiceState = Arc<AnalyticService>;

pub fn router(service: Arc<AnalyticService>) -> Router {
    Router::new()
        .route("/entries/{id}", get(get_entry))
        .with_state(service)
}

/// GET /entries/:id — the entry plus its effective company, resolved
/// through the origin for configuration-owned entries and through the
/// account otherwise.
async fn get_entry(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<EntryDetail>, ServiceError> {
    let entry = service.get_entry(&id)?;
    Ok(Json(entry))
}
