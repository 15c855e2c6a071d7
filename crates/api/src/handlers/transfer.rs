//! Spreadsheet import and export.
//!
//! Rows travel as JSON objects keyed by the spreadsheet column headers;
//! converting to and from XLSX or PDF is left to the client. An import is
//! all-or-nothing: one bad row rejects the whole batch.

use std::collections::HashSet;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use assetreg_core::asset::Asset;
use assetreg_core::error::CoreError;
use assetreg_core::export::{export_rows, import_template, ExportRow};
use assetreg_core::filter::sort_assets;
use assetreg_core::importer::{validate_import, ImportContext, ImportReport, ImportRow};
use assetreg_core::permissions::Permission;
use assetreg_core::types::current_year;
use assetreg_events::{event_types, RegisterEvent};
use chrono::Utc;
use serde::Serialize;

use super::allowed;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::query::{AssetListParams, ImportParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a stored import.
#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub imported: usize,
    pub assets: Vec<Asset>,
}

/// POST /api/v1/assets/import
///
/// Validate every row, then store all of them in one batch. With
/// `?dry_run=true` the validation report is returned and nothing is stored.
pub async fn import_assets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ImportParams>,
    Json(rows): Json<Vec<ImportRow>>,
) -> AppResult<Response> {
    if !user.permissions.has_any(Permission::Create) {
        return Err(CoreError::Forbidden("Missing 'create' permission".into()).into());
    }
    if rows.is_empty() {
        return Err(CoreError::Validation("The import file has no rows".into()).into());
    }

    let groups = &state.reference.depreciation_groups;
    let existing = state.repo.list().await?;
    let existing_numbers: HashSet<String> =
        existing.iter().map(|a| a.asset_number.clone()).collect();
    let existing_nfc_uids: HashSet<String> =
        existing.iter().filter_map(|a| a.nfc_uid.clone()).collect();
    let year = current_year();

    let report: ImportReport = validate_import(
        &rows,
        &ImportContext {
            groups,
            existing_numbers: &existing_numbers,
            existing_nfc_uids: &existing_nfc_uids,
            current_year: year,
        },
    );

    if params.dry_run {
        tracing::debug!(
            total_rows = report.total_rows,
            errors = report.errors.len(),
            "Import dry run",
        );
        return Ok(Json(DataResponse { data: report }).into_response());
    }

    if !report.is_valid() {
        tracing::info!(
            total_rows = report.total_rows,
            errors = report.errors.len(),
            subject = %user.subject,
            "Import rejected",
        );
        return Err(CoreError::Validation(report.error_summary()).into());
    }

    let now = Utc::now();
    let mut batch = Vec::with_capacity(report.accepted.len());
    for input in report.accepted {
        user.permissions.require(input.department, input.category, Permission::Create)?;
        let sequence = input.sequence_number.clone().unwrap_or_default();
        let identifier = input.identifier(&sequence)?;
        batch.push(Asset::create(0, input, &identifier, groups, year, now));
    }

    let assets = state.repo.insert_batch(batch).await?;
    let imported = assets.len();

    tracing::info!(imported, subject = %user.subject, "Assets imported");
    state.event_bus.publish(
        RegisterEvent::new(event_types::ASSET_IMPORTED)
            .with_actor(&user.subject)
            .with_payload(serde_json::json!({
                "count": imported,
                "asset_numbers": assets.iter().map(|a| &a.asset_number).collect::<Vec<_>>(),
            })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ImportOutcome { imported, assets },
        }),
    )
        .into_response())
}

/// GET /api/v1/assets/export
///
/// Flat rows for the assets the caller may export, honouring the listing
/// filters and sort order. Pagination parameters are ignored.
pub async fn export_assets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<AssetListParams>,
) -> AppResult<Json<DataResponse<Vec<ExportRow>>>> {
    if !user.permissions.has_any(Permission::Export) {
        return Err(CoreError::Forbidden("Missing 'export' permission".into()).into());
    }

    let filter = params.to_filter()?;
    let groups = &state.reference.depreciation_groups;
    let assets = state.repo.list().await?;

    let mut selected: Vec<&Asset> = filter
        .apply(&assets)
        .into_iter()
        .filter(|a| allowed(&user.permissions, a, Permission::Export))
        .collect();
    sort_assets(&mut selected, params.sort, params.direction, groups);

    tracing::info!(rows = selected.len(), subject = %user.subject, "Assets exported");
    Ok(Json(DataResponse {
        data: export_rows(&selected, groups),
    }))
}

/// GET /api/v1/assets/import-template
///
/// Two sample rows showing the expected columns.
pub async fn template(RequireAuth(_user): RequireAuth) -> Json<DataResponse<Vec<ImportRow>>> {
    Json(DataResponse {
        data: import_template(),
    })
}
