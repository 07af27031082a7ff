use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sca_core::UserId;

use crate::roles::Role;

/// Role object nested in the profile (`rol`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    #[serde(default, alias = "id_rol")]
    pub id: Option<i64>,
    #[serde(default)]
    pub nombre_rol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

/// Profile of the authenticated user (`GET /api/usuarios/me/`).
///
/// Replaced wholesale on every profile fetch; never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub nombre_completo: Option<String>,
    #[serde(default)]
    pub rol: Option<RoleInfo>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Backend role name, if present and non-empty.
    pub fn role_name(&self) -> Option<&str> {
        self.rol
            .as_ref()
            .and_then(|r| r.nombre_rol.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    /// Role mapped onto the closed set; `None` when absent or unrecognized.
    pub fn role(&self) -> Option<Role> {
        self.role_name().and_then(Role::from_wire)
    }

    pub fn display_name(&self) -> &str {
        self.nombre_completo
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}
