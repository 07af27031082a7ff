//! Route declarations of the hospital client.

use sca_auth::Role;

use crate::route::RouteDef;

pub const HOME: &str = "home";
pub const LOGIN: &str = "login";
pub const ADMIN_HOME: &str = "admin-home";
pub const TECHNICIAN_HOME: &str = "technician-home";
pub const DEPARTMENT_HEAD_HOME: &str = "department-head-home";

pub(crate) const LANDING_ROUTES: [&str; 3] = [ADMIN_HOME, TECHNICIAN_HOME, DEPARTMENT_HEAD_HOME];

/// Default landing route of a role; sessions without a recognized role land on login.
pub fn landing_route_name(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Administrator) => ADMIN_HOME,
        Some(Role::Technician) => TECHNICIAN_HOME,
        Some(Role::DepartmentHead) => DEPARTMENT_HEAD_HOME,
        None => LOGIN,
    }
}

pub fn hospital_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new(HOME, "/").title("Inicio"),
        RouteDef::new("about", "/about").title("Acerca de"),
        RouteDef::new(LOGIN, "/login").title("Iniciar Sesión"),
        // Role landing pages
        RouteDef::new(ADMIN_HOME, "/admin")
            .title("Panel de Administración")
            .requires_auth()
            .role(Role::Administrator),
        RouteDef::new(TECHNICIAN_HOME, "/tecnico")
            .title("Panel Técnico")
            .requires_auth()
            .role(Role::Technician),
        RouteDef::new(DEPARTMENT_HEAD_HOME, "/jefe")
            .title("Panel de Jefatura")
            .requires_auth()
            .role(Role::DepartmentHead),
        // Assets
        RouteDef::new("asset-list", "/activos")
            .title("Lista de Activos")
            .requires_auth(),
        RouteDef::new("asset-create", "/activos/nuevo")
            .title("Crear Activo")
            .requires_auth()
            .permission("canManageAssets"),
        RouteDef::new("asset-detail", "/activos/:id")
            .title("Detalle de Activo")
            .requires_auth(),
        RouteDef::new("asset-edit", "/activos/:id/editar")
            .title("Editar Activo")
            .requires_auth()
            .permission("canManageAssets"),
        RouteDef::new("asset-move", "/activos/:id/movilizar")
            .title("Movilizar Activo")
            .requires_auth()
            .permission("canMoveAssets"),
        RouteDef::new("asset-delete", "/activos/:id/eliminar")
            .title("Eliminar Activo")
            .requires_auth()
            .permission("canDeleteAssets"),
        RouteDef::new("print-qrs", "/imprimir-etiquetas")
            .title("Imprimir Etiquetas QR")
            .requires_auth()
            .permission("canPrintLabels"),
        RouteDef::new("location-list", "/ubicaciones")
            .title("Ubicaciones")
            .requires_auth(),
        // Administration and supervision
        RouteDef::new("user-admin", "/usuarios")
            .title("Gestión de Usuarios")
            .requires_auth()
            .role(Role::Administrator)
            .permission("canManageUsers"),
        RouteDef::new("movement-history", "/historial")
            .title("Historial de Movimientos")
            .requires_auth()
            .roles([Role::Administrator, Role::DepartmentHead])
            .permission("canViewAudit"),
        RouteDef::new("audit-log", "/auditoria")
            .title("Auditoría")
            .requires_auth()
            .roles([Role::Administrator, Role::DepartmentHead])
            .permission("canViewAudit"),
    ]
}
