use serde::Serialize;
use thiserror::Error;

use crate::{Permission, Role, Session};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("the user has no recognized role")]
    MissingRole,

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("unknown permission '{0}'")]
    UnknownPermission(String),

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),
}

/// Authorize a session for a single permission.
///
/// - No IO
/// - No panics
/// - Pure policy check over the session's current role
pub fn authorize(session: &Session, required: Permission) -> Result<(), AuthzError> {
    if !session.is_authenticated() {
        return Err(AuthzError::NotAuthenticated);
    }

    let role = session.role().ok_or(AuthzError::MissingRole)?;

    if required.granted_to(role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    /// The permission that was being checked.
    pub required_permission: Permission,

    /// Whether the authorization was granted.
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    pub role: Option<Role>,

    pub effective_permissions: Vec<Permission>,

    /// If denied, this explains what was missing.
    pub denial: Option<DenialKind>,

    /// Roles that would be granted the permission.
    pub granting_roles: Vec<Role>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    NotAuthenticated,
    MissingRole,
    MissingPermission,
}

/// Explain why an authorization decision was made (or would be made).
pub fn explain_authorization(session: &Session, required: Permission) -> AuthorizationExplanation {
    let granting_roles: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|r| required.granted_to(*r))
        .collect();

    let (granted, denial, reason) = match authorize(session, required) {
        Ok(()) => (
            true,
            None,
            format!(
                "role '{}' grants '{}'",
                session.role().map(|r| r.wire_name()).unwrap_or_default(),
                required
            ),
        ),
        Err(AuthzError::NotAuthenticated) => (
            false,
            Some(DenialKind::NotAuthenticated),
            "no authenticated session".to_string(),
        ),
        Err(AuthzError::Forbidden(_)) => (
            false,
            Some(DenialKind::MissingPermission),
            format!(
                "role '{}' does not grant '{}'",
                session.role().map(|r| r.wire_name()).unwrap_or_default(),
                required
            ),
        ),
        Err(_) => (
            false,
            Some(DenialKind::MissingRole),
            format!(
                "user role '{}' is not recognized",
                session
                    .user
                    .as_ref()
                    .and_then(|u| u.role_name())
                    .unwrap_or("<none>")
            ),
        ),
    };

    AuthorizationExplanation {
        required_permission: required,
        granted,
        reason,
        role: session.role(),
        effective_permissions: session.permissions(),
        denial,
        granting_roles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RoleInfo, UserProfile};
    use sca_core::UserId;

    fn session_with(role_name: &str) -> Session {
        Session {
            access_token: Some("a".into()),
            refresh_token: Some("r".into()),
            user: Some(UserProfile {
                id: UserId::new(3),
                username: "u".into(),
                email: None,
                nombre_completo: None,
                rol: Some(RoleInfo {
                    id: None,
                    nombre_rol: Some(role_name.into()),
                    descripcion: None,
                }),
                is_active: None,
                is_staff: None,
                date_joined: None,
                last_login: None,
            }),
        }
    }

    #[test]
    fn unauthenticated_is_rejected_first() {
        assert_eq!(
            authorize(&Session::empty(), Permission::PrintLabels),
            Err(AuthzError::NotAuthenticated)
        );
    }

    #[test]
    fn technician_cannot_delete() {
        let session = session_with("Técnico");
        assert_eq!(authorize(&session, Permission::MoveAssets), Ok(()));
        assert_eq!(
            authorize(&session, Permission::DeleteAssets),
            Err(AuthzError::Forbidden(Permission::DeleteAssets))
        );
    }

    #[test]
    fn unknown_role_reports_missing_role() {
        let session = session_with("Auditor");
        assert_eq!(
            authorize(&session, Permission::PrintLabels),
            Err(AuthzError::MissingRole)
        );
        let explanation = explain_authorization(&session, Permission::PrintLabels);
        assert_eq!(explanation.denial, Some(DenialKind::MissingRole));
        assert!(explanation.reason.contains("Auditor"));
    }

    #[test]
    fn explanation_lists_granting_roles() {
        let session = session_with("Jefe de Departamento");
        let explanation = explain_authorization(&session, Permission::DeleteAssets);
        assert!(!explanation.granted);
        assert_eq!(explanation.denial, Some(DenialKind::MissingPermission));
        assert_eq!(explanation.granting_roles, vec![Role::Administrator]);
        assert_eq!(
            explanation.effective_permissions,
            vec![Permission::PrintLabels, Permission::ViewAudit]
        );
    }
}
