use serde::{Deserialize, Serialize};

use sca_core::{DepartmentId, Entity, LocationId};

/// Hospital department (Urgencias, UCI, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    #[serde(rename = "nombre_departamento")]
    pub name: String,
}

/// Physical location an asset can sit in (room, box, ward).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    #[serde(rename = "nombre_ubicacion")]
    pub name: String,
    #[serde(rename = "departamento", default)]
    pub department: Option<Department>,
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> LocationId {
        self.id
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.department {
            Some(dept) => write!(f, "{} ({})", self.name, dept.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Write payload for creating or replacing a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationInput {
    #[serde(rename = "nombre_ubicacion")]
    pub name: String,
    #[serde(rename = "departamento_id")]
    pub department_id: DepartmentId,
}

/// Partial update payload; absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationPatch {
    #[serde(rename = "nombre_ubicacion", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "departamento_id", skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
}
