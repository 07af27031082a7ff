//! Client-held authentication state.

use serde::{Deserialize, Serialize};

use crate::permissions::Permission;
use crate::roles::Role;
use crate::user::UserProfile;

/// Access/refresh pair returned by `POST /api/auth/token/`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl core::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Tokens plus user profile.
///
/// # Invariants
/// - Authenticated iff both the access token and the profile are present.
/// - Every role and permission predicate is derived on read; nothing is cached.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }

    /// Role of the authenticated user; `None` while unauthenticated.
    pub fn role(&self) -> Option<Role> {
        if !self.is_authenticated() {
            return None;
        }
        self.user.as_ref().and_then(UserProfile::role)
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Administrator)
    }

    pub fn is_technician(&self) -> bool {
        self.role() == Some(Role::Technician)
    }

    pub fn is_department_head(&self) -> bool {
        self.role() == Some(Role::DepartmentHead)
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.role().is_some_and(|role| permission.granted_to(role))
    }

    pub fn can_print_labels(&self) -> bool {
        self.can(Permission::PrintLabels)
    }

    pub fn can_manage_assets(&self) -> bool {
        self.can(Permission::ManageAssets)
    }

    pub fn can_delete_assets(&self) -> bool {
        self.can(Permission::DeleteAssets)
    }

    pub fn can_move_assets(&self) -> bool {
        self.can(Permission::MoveAssets)
    }

    pub fn can_manage_users(&self) -> bool {
        self.can(Permission::ManageUsers)
    }

    pub fn can_view_audit(&self) -> bool {
        self.can(Permission::ViewAudit)
    }

    /// Location writes follow the backend's staff flag rather than the role.
    pub fn can_manage_locations(&self) -> bool {
        self.is_authenticated() && self.user.as_ref().and_then(|u| u.is_staff) == Some(true)
    }

    /// Effective permissions of this session, in declaration order.
    pub fn permissions(&self) -> Vec<Permission> {
        Permission::ALL.into_iter().filter(|p| self.can(*p)).collect()
    }

    pub fn set_tokens(&mut self, tokens: TokenPair) {
        self.access_token = Some(tokens.access);
        self.refresh_token = Some(tokens.refresh);
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.username())
            .field("role", &self.role())
            .finish()
    }
}
