//! Reference data: depreciation groups and role definitions.
//!
//! Loaded once at startup from a JSON file (`REFERENCE_DATA_PATH`) or taken
//! from the built-in seed, then shared read-only for the life of the process.

use std::collections::HashSet;
use std::path::Path;

use assetreg_core::department::Department;
use assetreg_core::depreciation::{DepreciationGroup, GroupType};
use assetreg_core::permissions::{PermissionSet, RoleDefinition, RolePermission};
use serde::{Deserialize, Serialize};

/// Role name of the built-in administrator.
pub const ROLE_ADMIN: &str = "admin";

/// Role name of the built-in read-only role.
pub const ROLE_VIEWER: &str = "viewer";

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("Failed to read reference data from {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse reference data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid reference data: {0}")]
    Invalid(String),
}

/// Immutable reference data consumed by the engine and the permission check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceData {
    pub depreciation_groups: Vec<DepreciationGroup>,
    pub roles: Vec<RoleDefinition>,
}

impl ReferenceData {
    /// Read and validate a JSON reference file.
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ReferenceError> {
        let data: Self = serde_json::from_str(raw)?;
        data.validate()?;
        Ok(data)
    }

    /// Group ids and role names must be unique; rates must lie in `(0, 1]`.
    pub fn validate(&self) -> Result<(), ReferenceError> {
        let mut ids = HashSet::new();
        for group in &self.depreciation_groups {
            if !ids.insert(group.id) {
                return Err(ReferenceError::Invalid(format!(
                    "Duplicate depreciation group id {}",
                    group.id
                )));
            }
            if !(group.rate > 0.0 && group.rate <= 1.0) {
                return Err(ReferenceError::Invalid(format!(
                    "Depreciation group '{}' has rate {} outside (0, 1]",
                    group.name, group.rate
                )));
            }
        }

        let mut names = HashSet::new();
        for role in &self.roles {
            if !names.insert(role.name.as_str()) {
                return Err(ReferenceError::Invalid(format!(
                    "Duplicate role '{}'",
                    role.name
                )));
            }
        }
        Ok(())
    }

    /// Built-in seed: the fiscal depreciation groups and three roles.
    pub fn seed() -> Self {
        let group = |id, code: &str, name: &str, group_type, years, rate| DepreciationGroup {
            id,
            code: code.into(),
            name: name.into(),
            group_type,
            years,
            rate,
        };

        let depreciation_groups = vec![
            group(1, "K1", "Kelompok 1", GroupType::NonBuilding, 4, 0.25),
            group(2, "K2", "Kelompok 2", GroupType::NonBuilding, 8, 0.125),
            group(3, "K3", "Kelompok 3", GroupType::NonBuilding, 16, 0.0625),
            group(4, "K4", "Kelompok 4", GroupType::NonBuilding, 20, 0.05),
            group(5, "BP", "Bangunan Permanen", GroupType::Building, 20, 0.05),
            group(6, "BTP", "Bangunan Tidak Permanen", GroupType::Building, 10, 0.1),
        ];

        let read_only = PermissionSet {
            can_read: true,
            ..PermissionSet::default()
        };
        let staff = PermissionSet {
            can_read: true,
            can_create: true,
            can_update: true,
            can_export: true,
            ..PermissionSet::default()
        };

        let roles = vec![
            RoleDefinition {
                name: ROLE_ADMIN.into(),
                description: "Full access to every department".into(),
                is_admin: true,
                permissions: Vec::new(),
            },
            RoleDefinition {
                name: ROLE_VIEWER.into(),
                description: "Read-only access to every department".into(),
                is_admin: false,
                permissions: Department::ALL
                    .into_iter()
                    .flat_map(|d| department_grants(d, read_only))
                    .collect(),
            },
            RoleDefinition {
                name: "education_staff".into(),
                description: "Manage education assets".into(),
                is_admin: false,
                permissions: department_grants(Department::Education, staff),
            },
        ];

        Self {
            depreciation_groups,
            roles,
        }
    }
}

/// The same grant on a department and on each of its categories.
fn department_grants(department: Department, set: PermissionSet) -> Vec<RolePermission> {
    std::iter::once(None)
        .chain(department.categories().iter().copied().map(Some))
        .map(|category| RolePermission {
            department,
            category,
            set,
        })
        .collect()
}
