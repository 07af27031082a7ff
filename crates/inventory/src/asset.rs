use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sca_core::{AssetId, AssetStatusId, Entity, EquipmentTypeId, LocationId};

use crate::location::Location;

/// Equipment classification (Computador, Monitor, Ventilador, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentType {
    pub id: EquipmentTypeId,
    #[serde(rename = "nombre_tipo")]
    pub name: String,
}

/// Lifecycle status of an asset (Operativo, En Mantención, De Baja, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStatus {
    pub id: AssetStatusId,
    #[serde(rename = "nombre_estado")]
    pub name: String,
}

/// A tracked physical hospital item, read shape with nested relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    #[serde(rename = "codigo_inventario")]
    pub inventory_code: String,
    #[serde(rename = "numero_serie", default)]
    pub serial_number: String,
    #[serde(rename = "marca", default)]
    pub brand: String,
    #[serde(rename = "modelo", default)]
    pub model: String,
    #[serde(rename = "fecha_alta", default)]
    pub registered_at: Option<DateTime<Utc>>,
    #[serde(rename = "tipo", default)]
    pub equipment_type: Option<EquipmentType>,
    #[serde(rename = "estado", default)]
    pub status: Option<AssetStatus>,
    #[serde(rename = "ubicacion_actual", default)]
    pub location: Option<Location>,
}

impl Entity for Asset {
    type Id = AssetId;

    fn id(&self) -> AssetId {
        self.id
    }
}

impl Asset {
    pub fn location_id(&self) -> Option<LocationId> {
        self.location.as_ref().map(|l| l.id)
    }

    /// Printable QR label content for this asset.
    pub fn label(&self) -> AssetLabel {
        AssetLabel {
            qr_payload: format!("SCA:{}:{}", self.id, self.inventory_code),
            inventory_code: self.inventory_code.clone(),
            serial_number: self.serial_number.clone(),
            description: format!("{} {}", self.brand, self.model).trim().to_string(),
            location: self.location.as_ref().map(|l| l.to_string()),
        }
    }
}

/// Label data for QR printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetLabel {
    pub qr_payload: String,
    pub inventory_code: String,
    pub serial_number: String,
    pub description: String,
    pub location: Option<String>,
}

/// Write payload for creating or replacing an asset (relations by id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInput {
    #[serde(rename = "codigo_inventario")]
    pub inventory_code: String,
    #[serde(rename = "numero_serie")]
    pub serial_number: String,
    #[serde(rename = "marca")]
    pub brand: String,
    #[serde(rename = "modelo")]
    pub model: String,
    #[serde(rename = "tipo_id")]
    pub equipment_type_id: EquipmentTypeId,
    #[serde(rename = "estado_id")]
    pub status_id: AssetStatusId,
    #[serde(rename = "ubicacion_actual_id")]
    pub location_id: LocationId,
}

/// Partial update payload; absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPatch {
    #[serde(rename = "codigo_inventario", skip_serializing_if = "Option::is_none")]
    pub inventory_code: Option<String>,
    #[serde(rename = "numero_serie", skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(rename = "marca", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(rename = "modelo", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "tipo_id", skip_serializing_if = "Option::is_none")]
    pub equipment_type_id: Option<EquipmentTypeId>,
    #[serde(rename = "estado_id", skip_serializing_if = "Option::is_none")]
    pub status_id: Option<AssetStatusId>,
    #[serde(rename = "ubicacion_actual_id", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
}

impl AssetPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of `POST /api/activos/:id/movilizar/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "id_ubicacion_destino")]
    pub destination: LocationId,
    #[serde(rename = "notas", default)]
    pub notes: String,
}

impl MoveRequest {
    pub fn new(destination: LocationId, notes: impl Into<String>) -> Self {
        Self {
            destination,
            notes: notes.into(),
        }
    }
}

/// Response of the relocate action.
///
/// Informational only: the authoritative asset state is a fresh fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<MoveSummary>,
}

impl MoveOutcome {
    /// Read whatever the server sent back. A `data` block in an unexpected
    /// shape is dropped; `status` and `message` are kept when they are strings.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(outcome) => outcome,
            Err(_) => {
                let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
                Self {
                    status: text("status"),
                    message: text("message"),
                    data: None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSummary {
    #[serde(rename = "activo_codigo")]
    pub inventory_code: String,
    #[serde(rename = "ubicacion_origen")]
    pub origin: MovedLocation,
    #[serde(rename = "ubicacion_destino")]
    pub destination: MovedLocation,
    #[serde(rename = "fecha_movimiento", default)]
    pub moved_at: Option<DateTime<Utc>>,
    #[serde(rename = "usuario", default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedLocation {
    pub id: LocationId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "departamento", default)]
    pub department: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": 1,
            "codigo_inventario": "ACT-2024-001",
            "numero_serie": "SN123456",
            "marca": "HP",
            "modelo": "EliteBook 840 G8",
            "fecha_alta": "2024-01-15T10:30:00Z",
            "tipo": {"id": 1, "nombre_tipo": "Computador"},
            "estado": {"id": 1, "nombre_estado": "Operativo"},
            "ubicacion_actual": {
                "id": 3,
                "nombre_ubicacion": "Sala 101",
                "departamento": {"id": 1, "nombre_departamento": "Urgencias"}
            }
        }"#
    }

    #[test]
    fn reads_nested_backend_shape() {
        let asset: Asset = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(asset.id(), AssetId::new(1));
        assert_eq!(asset.inventory_code, "ACT-2024-001");
        assert_eq!(asset.location_id(), Some(LocationId::new(3)));
        assert_eq!(asset.equipment_type.unwrap().name, "Computador");
    }

    #[test]
    fn label_includes_location_and_description() {
        let asset: Asset = serde_json::from_str(sample_json()).unwrap();
        let label = asset.label();
        assert_eq!(label.qr_payload, "SCA:1:ACT-2024-001");
        assert_eq!(label.description, "HP EliteBook 840 G8");
        assert_eq!(label.location.as_deref(), Some("Sala 101 (Urgencias)"));
    }

    #[test]
    fn patch_only_sends_present_fields() {
        let patch = AssetPatch {
            brand: Some("Dell".into()),
            ..AssetPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"marca": "Dell"}));
        assert!(AssetPatch::default().is_empty());
    }

    #[test]
    fn move_request_uses_backend_field_names() {
        let json = serde_json::to_value(MoveRequest::new(LocationId::new(5), "maintenance")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id_ubicacion_destino": 5, "notas": "maintenance"})
        );
    }

    #[test]
    fn move_outcome_keeps_message_when_data_has_another_shape() {
        let outcome = MoveOutcome::from_value(serde_json::json!({
            "status": "success",
            "message": "Activo movilizado exitosamente",
            "data": {
                "activo_codigo": "ACT-1",
                "ubicacion_destino": {"id": 4, "nombre": "Box 4", "departamento": {"id": 1}}
            }
        }));
        assert_eq!(outcome.status.as_deref(), Some("success"));
        assert_eq!(outcome.message.as_deref(), Some("Activo movilizado exitosamente"));
        assert!(outcome.data.is_none());
    }

    #[test]
    fn move_outcome_reads_full_summary() {
        let outcome = MoveOutcome::from_value(serde_json::json!({
            "message": "ok",
            "data": {
                "activo_codigo": "ACT-1",
                "ubicacion_origen": {"id": 3, "nombre": "Sala 101", "departamento": "Urgencias"},
                "ubicacion_destino": {"id": 4, "nombre": "Box 4"}
            }
        }));
        let data = outcome.data.unwrap();
        assert_eq!(data.origin.department.as_deref(), Some("Urgencias"));
        assert_eq!(data.destination.id, LocationId::new(4));
    }

    #[test]
    fn move_outcome_from_non_object_is_empty() {
        let outcome = MoveOutcome::from_value(serde_json::json!("moved"));
        assert_eq!(outcome, MoveOutcome { status: None, message: None, data: None });
    }
}
