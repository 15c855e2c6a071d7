//! Handlers for the asset number codec.

use axum::extract::{Path, Query, State};
use axum::Json;
use assetreg_core::asset_number::{decode, encode, next_sequence_number, AssetIdentifier};
use assetreg_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::query::{parse_department, NextSequenceParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Raw segment values to encode.
#[derive(Debug, Deserialize)]
pub struct EncodeRequest {
    pub department_code: String,
    pub year: i32,
    pub building_code: String,
    pub asset_type_code: String,
    pub sequence_number: String,
}

#[derive(Debug, Serialize)]
pub struct EncodedNumber {
    pub asset_number: String,
}

#[derive(Debug, Serialize)]
pub struct NextSequence {
    pub sequence_number: String,
    pub asset_number: String,
}

/// POST /api/v1/asset-numbers
pub async fn encode_number(
    RequireAuth(_user): RequireAuth,
    Json(body): Json<EncodeRequest>,
) -> AppResult<Json<DataResponse<EncodedNumber>>> {
    let asset_number = encode(
        &body.department_code,
        body.year,
        &body.building_code,
        &body.asset_type_code,
        &body.sequence_number,
    )
    .map_err(CoreError::from)?;
    Ok(Json(DataResponse {
        data: EncodedNumber { asset_number },
    }))
}

/// GET /api/v1/asset-numbers/{number}
///
/// Split an asset number into its segments, reconstructing the full year.
pub async fn decode_number(
    RequireAuth(_user): RequireAuth,
    Path(number): Path<String>,
) -> AppResult<Json<DataResponse<AssetIdentifier>>> {
    let identifier = decode(&number).map_err(CoreError::from)?;
    Ok(Json(DataResponse { data: identifier }))
}

/// GET /api/v1/asset-numbers/next
///
/// The next free sequence number for a department/year/building/type prefix.
pub async fn next_number(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<NextSequenceParams>,
) -> AppResult<Json<DataResponse<NextSequence>>> {
    let department = parse_department(Some(params.department.as_str()))?
        .ok_or_else(|| CoreError::Validation("department is required".into()))?;

    let existing = state.repo.list().await?;
    let sequence_number = next_sequence_number(
        existing.iter().map(|a| a.asset_number.as_str()),
        department,
        params.year,
        params.building,
        &params.asset_type_code,
    )?;
    let asset_number = AssetIdentifier::new(
        department,
        params.year,
        params.building,
        &params.asset_type_code,
        &sequence_number,
    )
    .map_err(CoreError::from)?
    .encode();

    Ok(Json(DataResponse {
        data: NextSequence {
            sequence_number,
            asset_number,
        },
    }))
}
