//! Route definitions for the `/scans` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::scans;
use crate::state::AppState;

/// Routes mounted at `/scans`.
///
/// ```text
/// GET    /        -> list_scans    (?limit=)
/// POST   /        -> record_scan
/// DELETE /        -> clear_scans   (admin only)
/// DELETE /{id}    -> delete_scan   (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(scans::list_scans)
                .post(scans::record_scan)
                .delete(scans::clear_scans),
        )
        .route("/{id}", delete(scans::delete_scan))
}
