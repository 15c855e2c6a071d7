//! Role-based permission matrix.
//!
//! Grants are keyed by `(Department, Option<Category>)`. A `None` category
//! is the department-wide grant. Raw rows with string keys are converted at
//! the boundary and unknown keys are rejected.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::department::{Category, Department};
use crate::error::CoreError;

/// Row key used in raw permission data for the department-wide grant.
pub const DEPARTMENT_WIDE_KEY: &str = "_department";

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

/// An action a user may perform on assets in a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Create,
    Update,
    Delete,
    Export,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Export => "export",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five permission flags of one grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    #[serde(default)]
    pub can_read: bool,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_update: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub can_export: bool,
}

impl PermissionSet {
    pub const ALL: PermissionSet = PermissionSet {
        can_read: true,
        can_create: true,
        can_update: true,
        can_delete: true,
        can_export: true,
    };

    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::Read => self.can_read,
            Permission::Create => self.can_create,
            Permission::Update => self.can_update,
            Permission::Delete => self.can_delete,
            Permission::Export => self.can_export,
        }
    }

    /// Union of two grants.
    pub fn merge(self, other: PermissionSet) -> PermissionSet {
        PermissionSet {
            can_read: self.can_read || other.can_read,
            can_create: self.can_create || other.can_create,
            can_update: self.can_update || other.can_update,
            can_delete: self.can_delete || other.can_delete,
            can_export: self.can_export || other.can_export,
        }
    }
}

// ---------------------------------------------------------------------------
// Role definitions
// ---------------------------------------------------------------------------

/// A validated grant for one department, optionally narrowed to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRolePermission")]
pub struct RolePermission {
    pub department: Department,
    pub category: Option<Category>,
    #[serde(flatten)]
    pub set: PermissionSet,
}

/// A permission row as stored externally, with string keys.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRolePermission {
    pub department: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(flatten)]
    pub set: PermissionSet,
}

impl TryFrom<RawRolePermission> for RolePermission {
    type Error = CoreError;

    fn try_from(raw: RawRolePermission) -> Result<Self, Self::Error> {
        let department: Department = raw.department.parse()?;
        let category = match raw.category.as_deref().map(str::trim) {
            None | Some("") | Some(DEPARTMENT_WIDE_KEY) => None,
            Some(key) => Some(key.parse::<Category>()?),
        };
        Category::check_pairing(department, category)?;
        Ok(Self {
            department,
            category,
            set: raw.set,
        })
    }
}

/// A named role and the grants it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Admin roles bypass the grant table entirely.
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub permissions: Vec<RolePermission>,
}

/// Find a role definition by name.
pub fn find_role<'a>(roles: &'a [RoleDefinition], name: &str) -> Option<&'a RoleDefinition> {
    roles.iter().find(|r| r.name == name)
}

// ---------------------------------------------------------------------------
// Resolved permissions
// ---------------------------------------------------------------------------

/// How broadly a user's grants reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    Admin,
    Department,
    Category,
    Viewer,
}

/// Effective permissions of one user, merged from all of their roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPermissions {
    is_admin: bool,
    grants: HashMap<(Department, Option<Category>), PermissionSet>,
}

impl UserPermissions {
    /// Permissions that allow everything.
    pub fn admin() -> Self {
        Self {
            is_admin: true,
            grants: HashMap::new(),
        }
    }

    /// Merge the grants of every role; any admin role makes the user admin.
    pub fn from_roles<'a>(roles: impl IntoIterator<Item = &'a RoleDefinition>) -> Self {
        let mut perms = Self::default();
        for role in roles {
            perms.is_admin |= role.is_admin;
            for grant in &role.permissions {
                let entry = perms
                    .grants
                    .entry((grant.department, grant.category))
                    .or_default();
                *entry = entry.merge(grant.set);
            }
        }
        perms
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Check a permission.
    ///
    /// With a category only the category grant counts; without one only the
    /// department-wide grant counts.
    pub fn has_permission(
        &self,
        department: Department,
        category: Option<Category>,
        permission: Permission,
    ) -> bool {
        if self.is_admin {
            return true;
        }
        self.grants
            .get(&(department, category))
            .is_some_and(|set| set.allows(permission))
    }

    /// Like [`has_permission`](Self::has_permission) but returns a
    /// `Forbidden` error when denied.
    pub fn require(
        &self,
        department: Department,
        category: Option<Category>,
        permission: Permission,
    ) -> Result<(), CoreError> {
        if self.has_permission(department, category, permission) {
            return Ok(());
        }
        let scope = match category {
            Some(c) => format!("{department}/{c}"),
            None => department.to_string(),
        };
        Err(CoreError::Forbidden(format!(
            "Missing '{permission}' permission for {scope}"
        )))
    }

    /// Whether the permission is granted anywhere (admin, any department or
    /// any category). Used to gate endpoints before scope is known.
    pub fn has_any(&self, permission: Permission) -> bool {
        self.is_admin || self.grants.values().any(|set| set.allows(permission))
    }

    pub fn level(&self) -> PermissionLevel {
        if self.is_admin {
            PermissionLevel::Admin
        } else if self.grants.keys().any(|(_, c)| c.is_none()) {
            PermissionLevel::Department
        } else if !self.grants.is_empty() {
            PermissionLevel::Category
        } else {
            PermissionLevel::Viewer
        }
    }

    /// Flattened grant list, sorted by scope, for display.
    pub fn grants(&self) -> Vec<RolePermission> {
        let mut out: Vec<RolePermission> = self
            .grants
            .iter()
            .map(|(&(department, category), &set)| RolePermission {
                department,
                category,
                set,
            })
            .collect();
        out.sort_by_key(|g| (g.department, g.category));
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
