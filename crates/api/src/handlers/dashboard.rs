use axum::extract::{Query, State};
use axum::Json;
use assetreg_core::dashboard::{dashboard_stats, DashboardStats};
use assetreg_core::permissions::Permission;
use assetreg_core::types::current_year;

use super::allowed;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::DashboardParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard
///
/// Totals over the assets the caller may read. With `?department=` the
/// breakdown switches from departments to that department's categories.
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<DashboardParams>,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let department = params.department()?;
    let assets = state.repo.list().await?;

    let visible: Vec<_> = assets
        .iter()
        .filter(|a| department.is_none_or(|d| a.department == d))
        .filter(|a| allowed(&user.permissions, a, Permission::Read))
        .collect();

    let stats = dashboard_stats(
        &visible,
        &state.reference.depreciation_groups,
        department,
        current_year(),
    );
    Ok(Json(DataResponse { data: stats }))
}
