//! Route definitions for the asset number codec.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::asset_numbers;
use crate::state::AppState;

/// Routes mounted at `/asset-numbers`.
///
/// ```text
/// POST   /            -> encode_number
/// GET    /next        -> next_number   (?department&year&building&asset_type_code)
/// GET    /{number}    -> decode_number
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(asset_numbers::encode_number))
        .route("/next", get(asset_numbers::next_number))
        .route("/{number}", get(asset_numbers::decode_number))
}
