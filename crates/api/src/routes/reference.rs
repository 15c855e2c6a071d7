use axum::routing::get;
use axum::Router;

use crate::handlers::reference;
use crate::state::AppState;

/// Routes mounted at `/reference`.
///
/// ```text
/// GET    /departments            -> list_departments
/// GET    /depreciation-groups    -> list_depreciation_groups
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/departments", get(reference::list_departments))
        .route("/depreciation-groups", get(reference::list_depreciation_groups))
}
