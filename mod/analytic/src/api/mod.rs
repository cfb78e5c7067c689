mod account;
mod company;
mod config;
mod entries;
mod invoice;
mod meta;
mod model;
mod product;
mod purchase;
mod sale;

use std::sync::Arc;
use axum::Router;

use crate::service::AnalyticService;

/// Build the complete analytic module router.
///
/// Routes:
/// - `/companies`, `/companies/{id}`
/// - `/accounts`, `/accounts/{id}`
/// - `/templates`, `/templates/{id}`, `/products`, `/products/{id}`
/// - `/template-companies`, `/template-companies/{id}`,
///   `/template-companies/{id}/accounts`,
///   `/template-companies/{id}/@set-accounts`
/// - `/invoices`, `/invoice-lines` (+ `@select-product`, `@set-accounts`)
/// - `/sales`, `/sale-lines` (+ actions)
/// - `/purchases`, `/purchase-lines` (+ actions)
/// - `/purchase-requests`, `/purchase-requests/{id}/@create-purchase`
/// - `/entries/{id}`
/// - `/meta/line-form`
pub fn router(service: Arc<AnalyticService>) -> Router {
    Router::new()
        .merge(company::router(Arc::clone(&service)))
        .merge(account::router(Arc::clone(&service)))
        .merge(product::router(Arc::clone(&service)))
        .merge(config::router(Arc::clone(&service)))
        .merge(invoice::router(Arc::clone(&service)))
        .merge(sale::router(Arc::clone(&service)))
        .merge(purchase::router(Arc::clone(&service)))
        .merge(entries::router(Arc::clone(&service)))
        .merge(meta::router(service))
}
