pub mod asset_numbers;
pub mod assets;
pub mod health;
pub mod reference;
pub mod scans;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /me/permissions                          caller's resolved grants
///
/// /reference/departments                   departments and categories
/// /reference/depreciation-groups           depreciation groups
///
/// /asset-numbers                           encode (POST)
/// /asset-numbers/next                      next free sequence
/// /asset-numbers/{number}                  decode
///
/// /valuations                              ad-hoc valuation (POST)
///
/// /assets                                  list, create
/// /assets/deleted                          deletion history
/// /assets/import                           import rows (POST, ?dry_run)
/// /assets/export                           export rows
/// /assets/import-template                  sample rows
/// /assets/{id}                             get, update, delete
/// /assets/{id}/valuation                   valuation
///
/// /dashboard                               totals and breakdown
///
/// /scans                                   history, record (POST), clear (DELETE)
/// /scans/{id}                              delete one record
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/me/permissions", get(handlers::me::my_permissions))
        .nest("/reference", reference::router())
        .nest("/asset-numbers", asset_numbers::router())
        .route("/valuations", post(handlers::valuations::compute))
        .nest("/assets", assets::router())
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .nest("/scans", scans::router())
}
