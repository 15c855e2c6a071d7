use axum::Json;
use assetreg_core::permissions::{PermissionLevel, RolePermission};
use serde::Serialize;

use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

/// The caller's resolved permissions.
#[derive(Debug, Serialize)]
pub struct MyPermissions {
    pub subject: String,
    pub role: String,
    pub is_admin: bool,
    pub level: PermissionLevel,
    pub grants: Vec<RolePermission>,
}

/// GET /api/v1/me/permissions
pub async fn my_permissions(user: AuthUser) -> Json<DataResponse<MyPermissions>> {
    Json(DataResponse {
        data: MyPermissions {
            is_admin: user.permissions.is_admin(),
            level: user.permissions.level(),
            grants: user.permissions.grants(),
            subject: user.subject,
            role: user.role,
        },
    })
}
