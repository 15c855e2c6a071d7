//! Route definitions for the `/assets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{assets, transfer};
use crate::state::AppState;

/// Routes mounted at `/assets`.
///
/// ```text
/// GET    /                  -> list_assets     (?department&category&year&years&search&sort&page...)
/// POST   /                  -> create_asset
/// GET    /deleted           -> list_deleted
/// POST   /import            -> import_assets   (?dry_run=true)
/// GET    /export            -> export_assets
/// GET    /import-template   -> template
/// GET    /{id}              -> get_asset
/// PUT    /{id}              -> update_asset
/// DELETE /{id}              -> delete_asset    (body: {"reason": ...})
/// GET    /{id}/valuation    -> get_valuation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets).post(assets::create_asset))
        .route("/deleted", get(assets::list_deleted))
        .route("/import", post(transfer::import_assets))
        .route("/export", get(transfer::export_assets))
        .route("/import-template", get(transfer::template))
        .route(
            "/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/{id}/valuation", get(assets::get_valuation))
}
