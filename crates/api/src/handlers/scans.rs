//! NFC tag scans.
//!
//! A scan looks up the asset carrying the tag and appends to the scan
//! history. Clearing the history is admin-only.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use assetreg_core::asset::{Asset, ScanRecord};
use assetreg_core::filter::clamp_per_page;
use assetreg_core::nfc::{normalize_nfc_uid, validate_nfc_uid};
use assetreg_core::permissions::Permission;
use assetreg_core::types::{DbId, Timestamp};
use assetreg_events::{event_types, RegisterEvent};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::allowed;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::ScanListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /scans`.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(alias = "tag_id")]
    pub nfc_uid: String,
    /// Defaults to the time the request is handled.
    pub scanned_at: Option<Timestamp>,
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub scan: ScanRecord,
    pub asset: Asset,
}

/// A scan joined with the asset it refers to.
#[derive(Debug, Serialize)]
pub struct ScanHistoryEntry {
    #[serde(flatten)]
    pub scan: ScanRecord,
    pub asset_number: String,
    pub asset_name: String,
}

#[derive(Debug, Serialize)]
pub struct ClearedScans {
    pub removed: usize,
}

/// POST /api/v1/scans
///
/// Resolve a tag to its asset and record the scan. Unknown tags answer 404.
pub async fn record_scan(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ScanRequest>,
) -> AppResult<impl IntoResponse> {
    validate_nfc_uid(&body.nfc_uid)?;
    let uid = normalize_nfc_uid(&body.nfc_uid);

    let asset = state
        .repo
        .find_by_nfc_uid(&uid)
        .await?
        .ok_or_else(|| AppError::NotFound("Asset not found for this NFC tag".into()))?;
    user.permissions.require(asset.department, asset.category, Permission::Read)?;

    let scan = state
        .repo
        .record_scan(
            asset.id,
            body.scanned_at.unwrap_or_else(Utc::now),
            body.device_id,
        )
        .await?;

    tracing::info!(
        asset_id = asset.id,
        scan_id = scan.id,
        nfc_uid = %uid,
        "NFC tag scanned",
    );
    state.event_bus.publish(
        RegisterEvent::new(event_types::SCAN_RECORDED)
            .for_asset(asset.id)
            .with_actor(&user.subject)
            .with_payload(serde_json::json!({ "scan_id": scan.id, "nfc_uid": uid })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ScanResult { scan, asset },
        }),
    ))
}

/// GET /api/v1/scans
///
/// Scan history, newest first (`?limit=`, default 50).
pub async fn list_scans(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ScanListParams>,
) -> AppResult<Json<DataResponse<Vec<ScanHistoryEntry>>>> {
    let limit = clamp_per_page(params.limit);
    let assets: HashMap<DbId, Asset> = state
        .repo
        .list()
        .await?
        .into_iter()
        .filter(|a| allowed(&user.permissions, a, Permission::Read))
        .map(|a| (a.id, a))
        .collect();

    // Over-fetch so filtering by permission does not shorten the page.
    let entries = state
        .repo
        .list_scans(usize::MAX)
        .await?
        .into_iter()
        .filter_map(|scan| {
            let asset = assets.get(&scan.asset_id)?;
            Some(ScanHistoryEntry {
                asset_number: asset.asset_number.clone(),
                asset_name: asset.name.clone(),
                scan,
            })
        })
        .take(limit)
        .collect();

    Ok(Json(DataResponse { data: entries }))
}

/// DELETE /api/v1/scans
pub async fn clear_scans(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<ClearedScans>>> {
    let removed = state.repo.clear_scans().await?;
    tracing::info!(removed, subject = %admin.subject, "Scan history cleared");
    Ok(Json(DataResponse {
        data: ClearedScans { removed },
    }))
}

/// DELETE /api/v1/scans/{id}
pub async fn delete_scan(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.repo.delete_scan(id).await?;
    tracing::info!(scan_id = id, subject = %admin.subject, "Scan record deleted");
    Ok(StatusCode::NO_CONTENT)
}
