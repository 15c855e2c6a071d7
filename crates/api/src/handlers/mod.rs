pub mod asset_numbers;
pub mod assets;
pub mod dashboard;
pub mod me;
pub mod reference;
pub mod scans;
pub mod transfer;
pub mod valuations;

use assetreg_core::asset::Asset;
use assetreg_core::permissions::{Permission, UserPermissions};

/// Whether `permissions` grant `permission` on the asset's department and
/// category.
pub(crate) fn allowed(permissions: &UserPermissions, asset: &Asset, permission: Permission) -> bool {
    permissions.has_permission(asset.department, asset.category, permission)
}
