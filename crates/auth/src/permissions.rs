use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::authorize::AuthzError;
use crate::roles::Role;

/// Functional permission checked by views and route guards.
///
/// Permissions are never stored: they are derived from the session's role on
/// every read (see [`Permission::granted_to`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "canPrintLabels")]
    PrintLabels,
    #[serde(rename = "canManageAssets")]
    ManageAssets,
    #[serde(rename = "canDeleteAssets")]
    DeleteAssets,
    #[serde(rename = "canMoveAssets")]
    MoveAssets,
    #[serde(rename = "canManageUsers")]
    ManageUsers,
    #[serde(rename = "canViewAudit")]
    ViewAudit,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::PrintLabels,
        Permission::ManageAssets,
        Permission::DeleteAssets,
        Permission::MoveAssets,
        Permission::ManageUsers,
        Permission::ViewAudit,
    ];

    /// Name used in route metadata (`requiredPermission`).
    pub fn name(&self) -> &'static str {
        match self {
            Permission::PrintLabels => "canPrintLabels",
            Permission::ManageAssets => "canManageAssets",
            Permission::DeleteAssets => "canDeleteAssets",
            Permission::MoveAssets => "canMoveAssets",
            Permission::ManageUsers => "canManageUsers",
            Permission::ViewAudit => "canViewAudit",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Permission::PrintLabels => "Print QR labels",
            Permission::ManageAssets => "Create and edit assets",
            Permission::DeleteAssets => "Delete assets",
            Permission::MoveAssets => "Relocate assets",
            Permission::ManageUsers => "Manage user accounts",
            Permission::ViewAudit => "View movement history and audit logs",
        }
    }

    /// The role policy.
    ///
    /// | permission      | Administrator | Technician | DepartmentHead |
    /// |-----------------|---------------|------------|----------------|
    /// | canPrintLabels  | yes           | yes        | yes            |
    /// | canManageAssets | yes           | yes        | no             |
    /// | canDeleteAssets | yes           | no         | no             |
    /// | canMoveAssets   | yes           | yes        | no             |
    /// | canManageUsers  | yes           | no         | no             |
    /// | canViewAudit    | yes           | no         | yes            |
    pub fn granted_to(&self, role: Role) -> bool {
        match (self, role) {
            (_, Role::Administrator) => true,
            (Permission::PrintLabels, _) => true,
            (Permission::ManageAssets | Permission::MoveAssets, Role::Technician) => true,
            (Permission::ViewAudit, Role::DepartmentHead) => true,
            _ => false,
        }
    }
}

impl FromStr for Permission {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| AuthzError::UnknownPermission(s.to_string()))
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
