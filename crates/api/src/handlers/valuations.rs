//! Ad-hoc valuation through the depreciation engine.

use axum::extract::State;
use axum::Json;
use assetreg_core::depreciation::{
    compute_valuation, find_group, validate_valuation_input, validate_year, AssetValuation,
    ValuationInput,
};
use assetreg_core::error::CoreError;
use assetreg_core::types::{current_year, DbId};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /valuations`.
#[derive(Debug, Deserialize)]
pub struct ValuationRequest {
    #[serde(flatten)]
    pub input: ValuationInput,
    /// Omit for an asset that does not depreciate.
    pub depreciation_group_id: Option<DbId>,
    /// Defaults to the current year.
    pub as_of_year: Option<i32>,
}

/// POST /api/v1/valuations
pub async fn compute(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Json(body): Json<ValuationRequest>,
) -> AppResult<Json<DataResponse<AssetValuation>>> {
    validate_valuation_input(&body.input)?;
    let as_of_year = body.as_of_year.unwrap_or_else(current_year);
    validate_year("As-of year", as_of_year)?;

    let group = match body.depreciation_group_id {
        Some(id) => Some(
            find_group(&state.reference.depreciation_groups, id).ok_or_else(|| {
                CoreError::Validation(format!("Unknown depreciation group: {id}"))
            })?,
        ),
        None => None,
    };

    let valuation = compute_valuation(&body.input, group, as_of_year);
    Ok(Json(DataResponse { data: valuation }))
}
