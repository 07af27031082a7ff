//! Per-navigation access check.
//!
//! The guard is pure: given a resolved route and a session snapshot it either
//! allows the transition or names where to go instead. Checks run in a fixed
//! order and the first failing one wins:
//!
//! 1. authentication required but the session is anonymous → `login`, with the
//!    requested path as return target;
//! 2. role set declared and the session role is not a member → the role's
//!    landing route, with a denial notice;
//! 3. permission declared and not granted → the caller's landing route, with a
//!    denial notice;
//! 4. target is `login` while authenticated → the landing route.

use serde::Serialize;

use sca_auth::Session;

use crate::route::{ResolvedRoute, Route, encode_component};
use crate::routes::{LOGIN, landing_route_name};

pub const APP_NAME: &str = "SCA Hospital";

pub const DENIAL_NOTICE: &str = "You do not have permission to access this page.";

/// Lifecycle of a single navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GuardState {
    Evaluating,
    Allowed,
    Redirected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RedirectReason {
    AuthenticationRequired,
    RoleNotAllowed,
    PermissionDenied,
    AlreadyAuthenticated,
}

/// Named redirect target, optionally carrying the path to come back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationTarget {
    pub route: &'static str,
    pub return_to: Option<String>,
}

impl NavigationTarget {
    pub fn named(route: &'static str) -> Self {
        Self {
            route,
            return_to: None,
        }
    }

    /// Concrete path for the target, given the path of the named route.
    pub fn href(&self, route_path: &str) -> String {
        match &self.return_to {
            Some(back) => format!("{route_path}?redirect={}", encode_component(back)),
            None => route_path.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GuardDecision {
    Allow,
    Redirect {
        to: NavigationTarget,
        reason: RedirectReason,
        notice: Option<String>,
    },
}

impl GuardDecision {
    pub fn state(&self) -> GuardState {
        match self {
            GuardDecision::Allow => GuardState::Allowed,
            GuardDecision::Redirect { .. } => GuardState::Redirected,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

#[derive(Debug, Clone)]
pub struct NavigationGuard {
    app_name: &'static str,
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self { app_name: APP_NAME }
    }
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_title(&self, route: &Route) -> String {
        match route.title {
            Some(title) => format!("{title} - {}", self.app_name),
            None => self.app_name.to_string(),
        }
    }

    pub fn evaluate(&self, target: &ResolvedRoute<'_>, session: &Session) -> GuardDecision {
        let access = &target.route.access;
        let authenticated = session.is_authenticated();
        let landing = landing_route_name(session.role());

        if access.requires_auth && !authenticated {
            return GuardDecision::Redirect {
                to: NavigationTarget {
                    route: LOGIN,
                    return_to: Some(target.full_path.clone()),
                },
                reason: RedirectReason::AuthenticationRequired,
                notice: None,
            };
        }

        if let Some(roles) = &access.roles {
            let member = session.role().is_some_and(|role| roles.contains(&role));
            if !member {
                return deny(landing, RedirectReason::RoleNotAllowed);
            }
        }

        if let Some(permission) = access.permission {
            if !session.can(permission) {
                return deny(landing, RedirectReason::PermissionDenied);
            }
        }

        if target.route.name == LOGIN && authenticated && landing != LOGIN {
            return GuardDecision::Redirect {
                to: NavigationTarget::named(landing),
                reason: RedirectReason::AlreadyAuthenticated,
                notice: None,
            };
        }

        GuardDecision::Allow
    }
}

fn deny(landing: &'static str, reason: RedirectReason) -> GuardDecision {
    GuardDecision::Redirect {
        to: NavigationTarget::named(landing),
        reason,
        notice: Some(DENIAL_NOTICE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteTable;
    use proptest::prelude::*;
    use sca_auth::{Role, RoleInfo, UserProfile};
    use sca_core::UserId;

    fn session_as(role_name: Option<&str>) -> Session {
        Session {
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
            user: Some(UserProfile {
                id: UserId::new(7),
                username: "jdoe".into(),
                email: None,
                nombre_completo: None,
                rol: role_name.map(|name| RoleInfo {
                    id: Some(1),
                    nombre_rol: Some(name.to_string()),
                    descripcion: None,
                }),
                is_active: Some(true),
                is_staff: None,
                date_joined: None,
                last_login: None,
            }),
        }
    }

    fn decide(path: &str, session: &Session) -> GuardDecision {
        let table = RouteTable::hospital().unwrap();
        let resolved = table.resolve(path).unwrap();
        NavigationGuard::new().evaluate(&resolved, session)
    }

    #[test]
    fn anonymous_user_is_sent_to_login_with_return_path() {
        let decision = decide("/activos/5/editar", &Session::empty());
        let GuardDecision::Redirect { to, reason, notice } = decision else {
            panic!("expected redirect");
        };
        assert_eq!(to.route, LOGIN);
        assert_eq!(to.return_to.as_deref(), Some("/activos/5/editar"));
        assert_eq!(to.href("/login"), "/login?redirect=%2Factivos%2F5%2Feditar");
        assert_eq!(reason, RedirectReason::AuthenticationRequired);
        assert!(notice.is_none());
    }

    #[test]
    fn public_routes_are_open_to_everyone() {
        assert!(decide("/", &Session::empty()).is_allowed());
        assert!(decide("/about", &Session::empty()).is_allowed());
        assert!(decide("/login", &Session::empty()).is_allowed());
    }

    #[test]
    fn technician_cannot_delete_assets() {
        let decision = decide("/activos/3/eliminar", &session_as(Some("Técnico")));
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: NavigationTarget::named("technician-home"),
                reason: RedirectReason::PermissionDenied,
                notice: Some(DENIAL_NOTICE.to_string()),
            }
        );
    }

    #[test]
    fn technician_can_edit_and_move() {
        let tech = session_as(Some("Técnico"));
        assert!(decide("/activos/3/editar", &tech).is_allowed());
        assert!(decide("/activos/3/movilizar", &tech).is_allowed());
        assert!(decide("/imprimir-etiquetas", &tech).is_allowed());
    }

    #[test]
    fn department_head_reads_audit_but_cannot_manage_users() {
        let head = session_as(Some("Jefe de Departamento"));
        assert!(decide("/auditoria", &head).is_allowed());
        assert!(decide("/historial", &head).is_allowed());

        let GuardDecision::Redirect { to, reason, .. } = decide("/usuarios", &head) else {
            panic!("expected redirect");
        };
        assert_eq!(to.route, "department-head-home");
        assert_eq!(reason, RedirectReason::RoleNotAllowed);
    }

    #[test]
    fn role_check_runs_before_permission_check() {
        let GuardDecision::Redirect { reason, .. } = decide("/auditoria", &session_as(Some("Técnico")))
        else {
            panic!("expected redirect");
        };
        assert_eq!(reason, RedirectReason::RoleNotAllowed);
    }

    #[test]
    fn authenticated_user_skips_login_page() {
        let GuardDecision::Redirect { to, reason, .. } = decide("/login", &session_as(Some("Administrador")))
        else {
            panic!("expected redirect");
        };
        assert_eq!(to.route, "admin-home");
        assert_eq!(reason, RedirectReason::AlreadyAuthenticated);
    }

    #[test]
    fn unknown_role_lands_on_login_without_looping() {
        let stale = session_as(Some("Enfermera"));
        let GuardDecision::Redirect { to, .. } = decide("/admin", &stale) else {
            panic!("expected redirect");
        };
        assert_eq!(to.route, LOGIN);
        assert!(decide("/login", &stale).is_allowed());
    }

    #[test]
    fn page_title_uses_route_title() {
        let table = RouteTable::hospital().unwrap();
        let guard = NavigationGuard::new();
        assert_eq!(
            guard.page_title(table.get("asset-list").unwrap()),
            "Lista de Activos - SCA Hospital"
        );
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn role_outside_route_set_goes_to_own_landing(role in any_role()) {
            let session = session_as(Some(role.wire_name()));
            let table = RouteTable::hospital().unwrap();
            let guard = NavigationGuard::new();
            for route in table.routes() {
                let Some(roles) = &route.access.roles else { continue };
                let Some(path) = route.href(&Default::default()) else { continue };
                let resolved = table.resolve(&path).unwrap();
                let decision = guard.evaluate(&resolved, &session);
                if roles.contains(&role) {
                    prop_assert!(decision.is_allowed());
                } else {
                    let GuardDecision::Redirect { to, notice, .. } = decision else {
                        return Err(TestCaseError::fail("expected redirect"));
                    };
                    prop_assert_eq!(to.route, landing_route_name(Some(role)));
                    prop_assert!(notice.is_some());
                }
            }
        }

        #[test]
        fn anonymous_never_reaches_protected_routes(id in 1i64..10_000) {
            let table = RouteTable::hospital().unwrap();
            let guard = NavigationGuard::new();
            let params = [("id".to_string(), id.to_string())].into_iter().collect();
            for route in table.routes().iter().filter(|r| r.access.requires_auth) {
                let path = route.href(&params).unwrap();
                let resolved = table.resolve(&path).unwrap();
                let decision = guard.evaluate(&resolved, &Session::empty());
                prop_assert_eq!(decision.state(), GuardState::Redirected);
            }
        }
    }
}
