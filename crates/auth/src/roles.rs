use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::authorize::AuthzError;
use crate::permissions::Permission;

/// Role assigned to a user account.
///
/// The set is closed: the backend's `rol.nombre_rol` values map onto exactly
/// these three variants. Serialized with the backend's names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Administrador")]
    Administrator,
    #[serde(rename = "Técnico")]
    Technician,
    #[serde(rename = "Jefe de Departamento")]
    DepartmentHead,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Administrator, Role::Technician, Role::DepartmentHead];

    /// Name used by the backend (`rol.nombre_rol`).
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrador",
            Role::Technician => "Técnico",
            Role::DepartmentHead => "Jefe de Departamento",
        }
    }

    /// Short identifier used in configuration and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Technician => "technician",
            Role::DepartmentHead => "department-head",
        }
    }

    /// Map a backend role name onto the closed set.
    pub fn from_wire(name: &str) -> Option<Role> {
        let name = name.trim();
        Role::ALL.into_iter().find(|r| r.wire_name() == name)
    }

    /// Every permission this role is granted, in declaration order.
    pub fn permissions(&self) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| p.granted_to(*self))
            .collect()
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_wire(s)
            .or_else(|| Role::ALL.into_iter().find(|r| r.key() == s.trim()))
            .ok_or_else(|| AuthzError::UnknownRole(s.to_string()))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_backend_names() {
        assert_eq!(Role::from_wire("Administrador"), Some(Role::Administrator));
        assert_eq!(Role::from_wire("Técnico"), Some(Role::Technician));
        assert_eq!(Role::from_wire(" Jefe de Departamento "), Some(Role::DepartmentHead));
        assert_eq!(Role::from_wire("Auditor"), None);
    }

    #[test]
    fn parses_keys_and_wire_names() {
        assert_eq!("technician".parse::<Role>().unwrap(), Role::Technician);
        assert_eq!("Administrador".parse::<Role>().unwrap(), Role::Administrator);
        assert!(matches!("root".parse::<Role>(), Err(AuthzError::UnknownRole(_))));
    }

    #[test]
    fn serializes_with_backend_names() {
        assert_eq!(serde_json::to_string(&Role::Technician).unwrap(), "\"Técnico\"");
    }
}
