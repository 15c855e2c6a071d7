//! Handlers for the `/assets` resource.
//!
//! Every operation is checked against the caller's department/category
//! grants. Listing silently drops assets the caller cannot read; operations
//! on a single asset answer 403 instead.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use assetreg_core::asset::{Asset, DeletedAsset, NewAsset, UpdateAsset};
use assetreg_core::depreciation::AssetValuation;
use assetreg_core::error::CoreError;
use assetreg_core::filter::{paginate, sort_assets, Page};
use assetreg_core::nfc::unique_nfc_uid;
use assetreg_core::permissions::Permission;
use assetreg_core::types::{current_year, DbId};
use assetreg_events::{event_types, RegisterEvent};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::allowed;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::AssetListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `DELETE /assets/{id}`.
#[derive(Debug, Deserialize)]
pub struct DeleteAssetRequest {
    pub reason: String,
}

/// Valuation of one stored asset.
#[derive(Debug, Serialize)]
pub struct AssetValuationResponse {
    pub asset_id: DbId,
    pub asset_number: String,
    pub as_of_year: i32,
    #[serde(flatten)]
    pub valuation: AssetValuation,
}

/// GET /api/v1/assets
///
/// Filter, search, sort and paginate the assets the caller may read.
pub async fn list_assets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<AssetListParams>,
) -> AppResult<Json<DataResponse<Page<Asset>>>> {
    let filter = params.to_filter()?;
    let assets = state.repo.list().await?;

    let mut visible: Vec<&Asset> = filter
        .apply(&assets)
        .into_iter()
        .filter(|a| allowed(&user.permissions, a, Permission::Read))
        .collect();
    sort_assets(
        &mut visible,
        params.sort,
        params.direction,
        &state.reference.depreciation_groups,
    );

    let owned: Vec<Asset> = visible.into_iter().cloned().collect();
    Ok(Json(DataResponse {
        data: paginate(owned, params.page, params.per_page),
    }))
}

/// POST /api/v1/assets
///
/// Create an asset. The next free sequence number is allocated when none is
/// given, and a fresh NFC UID when the tag is left blank.
pub async fn create_asset(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut input): Json<NewAsset>,
) -> AppResult<impl IntoResponse> {
    let groups = &state.reference.depreciation_groups;
    input.check(groups)?;
    user.permissions.require(input.department, input.category, Permission::Create)?;

    // Without an explicit sequence the store allocates one atomically; the
    // placeholder below only fills the segment.
    let explicit_sequence = input.sequence_number.clone();
    let identifier = input.identifier(explicit_sequence.as_deref().unwrap_or("1"))?;

    if input.nfc_uid.as_deref().is_none_or(|u| u.trim().is_empty()) {
        let existing = state.repo.list().await?;
        let taken: HashSet<String> = existing.into_iter().filter_map(|a| a.nfc_uid).collect();
        input.nfc_uid = Some(unique_nfc_uid(&taken)?);
    }
    if input.purchase_date.is_none() {
        input.purchase_date = Some(Utc::now().date_naive());
    }

    let asset = Asset::create(0, input, &identifier, groups, current_year(), Utc::now());
    let asset = match explicit_sequence {
        Some(_) => state.repo.insert(asset).await?,
        None => state.repo.insert_next_in_sequence(asset).await?,
    };

    tracing::info!(
        asset_id = asset.id,
        asset_number = %asset.asset_number,
        subject = %user.subject,
        "Asset created",
    );
    state.event_bus.publish(
        RegisterEvent::new(event_types::ASSET_CREATED)
            .for_asset(asset.id)
            .with_actor(&user.subject)
            .with_payload(serde_json::json!({ "asset_number": asset.asset_number })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: asset })))
}

/// GET /api/v1/assets/{id}
pub async fn get_asset(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Asset>>> {
    let asset = find_asset(&state, id).await?;
    user.permissions.require(asset.department, asset.category, Permission::Read)?;
    Ok(Json(DataResponse { data: asset }))
}

/// PUT /api/v1/assets/{id}
///
/// Partial update. Moving an asset into another category needs update
/// rights on both the old and the new category.
pub async fn update_asset(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(update): Json<UpdateAsset>,
) -> AppResult<Json<DataResponse<Asset>>> {
    let mut asset = find_asset(&state, id).await?;
    user.permissions.require(asset.department, asset.category, Permission::Update)?;
    if let Some(category) = update.category.filter(|c| Some(*c) != asset.category) {
        user.permissions.require(asset.department, Some(category), Permission::Update)?;
    }

    asset.apply_update(
        update,
        &state.reference.depreciation_groups,
        current_year(),
        Utc::now(),
    )?;
    let asset = state.repo.update(asset).await?;

    tracing::info!(asset_id = asset.id, subject = %user.subject, "Asset updated");
    state.event_bus.publish(
        RegisterEvent::new(event_types::ASSET_UPDATED)
            .for_asset(asset.id)
            .with_actor(&user.subject),
    );

    Ok(Json(DataResponse { data: asset }))
}

/// DELETE /api/v1/assets/{id}
///
/// Archive the asset into the deletion history, then remove it. Requires a
/// non-empty `reason`.
pub async fn delete_asset(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(body): Json<DeleteAssetRequest>,
) -> AppResult<Json<DataResponse<DeletedAsset>>> {
    let asset = find_asset(&state, id).await?;
    user.permissions.require(asset.department, asset.category, Permission::Delete)?;

    let archived = state
        .repo
        .delete(id, &body.reason, &user.subject, Utc::now())
        .await?;

    tracing::info!(
        asset_id = id,
        asset_number = %archived.asset_number,
        reason = %archived.deletion_reason,
        subject = %user.subject,
        "Asset deleted",
    );
    state.event_bus.publish(
        RegisterEvent::new(event_types::ASSET_DELETED)
            .for_asset(id)
            .with_actor(&user.subject)
            .with_payload(serde_json::json!({
                "asset_number": archived.asset_number,
                "reason": archived.deletion_reason,
            })),
    );

    Ok(Json(DataResponse { data: archived }))
}

/// GET /api/v1/assets/{id}/valuation
///
/// Depreciation figures for the current year.
pub async fn get_valuation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AssetValuationResponse>>> {
    let asset = find_asset(&state, id).await?;
    user.permissions.require(asset.department, asset.category, Permission::Read)?;

    let as_of_year = current_year();
    let valuation = asset.valuation(&state.reference.depreciation_groups, as_of_year);
    Ok(Json(DataResponse {
        data: AssetValuationResponse {
            asset_id: asset.id,
            asset_number: asset.asset_number,
            as_of_year,
            valuation,
        },
    }))
}

/// GET /api/v1/assets/deleted
///
/// Deletion history, newest first, limited to readable departments.
pub async fn list_deleted(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<DeletedAsset>>>> {
    let deleted = state
        .repo
        .list_deleted()
        .await?
        .into_iter()
        .filter(|d| {
            user.permissions
                .has_permission(d.department, d.category, Permission::Read)
        })
        .collect();
    Ok(Json(DataResponse { data: deleted }))
}

async fn find_asset(state: &AppState, id: DbId) -> Result<Asset, CoreError> {
    state
        .repo
        .find(id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Asset", id })
}
