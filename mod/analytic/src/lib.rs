pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use openledger_core::Module;
use openledger_sql::SQLStore;

use service::AnalyticService;

/// The Analytic module — per-company analytic account configuration on
/// product templates, propagated onto invoice, sale, and purchase
/// lines when a product is selected.
pub struct AnalyticModule {
    service: Arc<AnalyticService>,
}

impl AnalyticModule {
    /// Create the module and initialize storage: tables, the legacy
    /// configuration migration, then indexes.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, openledger_core::ServiceError> {
        let service = Arc::new(AnalyticService::new(db)?);
        Ok(Self { service })
    }

    /// The underlying service, for embedding and tests.
    pub fn service(&self) -> &Arc<AnalyticService> {
        &self.service
    }
}

impl Module for AnalyticModule {
    fn name(&self) -> &str {
        "analytic"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.service))
    }
}
