//! Read-only reference data for clients: departments with their categories,
//! and depreciation groups.

use axum::extract::State;
use axum::Json;
use assetreg_core::department::Department;
use assetreg_core::depreciation::{rate_label, DepreciationGroup};
use serde::Serialize;

use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub key: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DepartmentInfo {
    pub key: &'static str,
    pub code: &'static str,
    pub label: &'static str,
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Serialize)]
pub struct GroupInfo {
    #[serde(flatten)]
    pub group: DepreciationGroup,
    pub rate_label: String,
}

/// GET /api/v1/reference/departments
pub async fn list_departments(
    RequireAuth(_user): RequireAuth,
) -> Json<DataResponse<Vec<DepartmentInfo>>> {
    let data = Department::ALL
        .into_iter()
        .map(|d| DepartmentInfo {
            key: d.as_str(),
            code: d.code(),
            label: d.label(),
            categories: d
                .categories()
                .iter()
                .map(|c| CategoryInfo {
                    key: c.as_str(),
                    label: c.label(),
                })
                .collect(),
        })
        .collect();
    Json(DataResponse { data })
}

/// GET /api/v1/reference/depreciation-groups
pub async fn list_depreciation_groups(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Json<DataResponse<Vec<GroupInfo>>> {
    let data = state
        .reference
        .depreciation_groups
        .iter()
        .map(|g| GroupInfo {
            rate_label: rate_label(g),
            group: g.clone(),
        })
        .collect();
    Json(DataResponse { data })
}
