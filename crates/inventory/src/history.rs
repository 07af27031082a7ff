//! Traceability records: asset movements and audit log entries (read only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sca_core::{AssetId, AuditLogId, Entity, LocationId, MovementId, UserId};

/// Kind of movement recorded in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    #[serde(rename = "TRASLADO")]
    Transfer,
    #[serde(rename = "ASIGNACION")]
    Assignment,
    #[serde(rename = "DEVOLUCION")]
    Return,
    #[serde(rename = "MANTENIMIENTO")]
    SentToMaintenance,
    #[serde(rename = "RETORNO")]
    BackFromMaintenance,
    #[serde(rename = "BAJA")]
    Decommission,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedAsset {
    pub id: AssetId,
    #[serde(rename = "codigo_inventario")]
    pub inventory_code: String,
    #[serde(rename = "marca", default)]
    pub brand: String,
    #[serde(rename = "modelo", default)]
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub nombre_completo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub id: LocationId,
    #[serde(rename = "nombre_ubicacion")]
    pub name: String,
    #[serde(rename = "departamento", default)]
    pub department: Option<String>,
}

/// One entry of `/api/historial-movimientos/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub id: MovementId,
    #[serde(rename = "activo")]
    pub asset: MovedAsset,
    #[serde(rename = "usuario_registra", default)]
    pub registered_by: Option<UserSummary>,
    #[serde(rename = "ubicacion_origen", default)]
    pub origin: Option<LocationSummary>,
    #[serde(rename = "ubicacion_destino", default)]
    pub destination: Option<LocationSummary>,
    #[serde(rename = "fecha_movimiento")]
    pub moved_at: DateTime<Utc>,
    #[serde(rename = "tipo_movimiento")]
    pub kind: MovementKind,
    #[serde(rename = "comentarios", default)]
    pub comments: Option<String>,
}

impl Entity for MovementRecord {
    type Id = MovementId;

    fn id(&self) -> MovementId {
        self.id
    }
}

/// Audited action. Unknown action codes are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    Export,
    Import,
    View,
    Other(String),
}

impl AuditAction {
    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::Export => "EXPORT",
            AuditAction::Import => "IMPORT",
            AuditAction::View => "VIEW",
            AuditAction::Other(code) => code,
        }
    }
}

impl From<String> for AuditAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CREATE" => AuditAction::Create,
            "UPDATE" => AuditAction::Update,
            "DELETE" => AuditAction::Delete,
            "LOGIN" => AuditAction::Login,
            "LOGOUT" => AuditAction::Logout,
            "EXPORT" => AuditAction::Export,
            "IMPORT" => AuditAction::Import,
            "VIEW" => AuditAction::View,
            _ => AuditAction::Other(value),
        }
    }
}

impl From<AuditAction> for String {
    fn from(value: AuditAction) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `/api/auditoria-logs/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    #[serde(rename = "usuario", default)]
    pub user_id: Option<UserId>,
    #[serde(rename = "usuario_username", default)]
    pub username: Option<String>,
    #[serde(rename = "usuario_nombre_completo", default)]
    pub full_name: Option<String>,
    #[serde(rename = "accion")]
    pub action: AuditAction,
    #[serde(rename = "detalle_accion", default)]
    pub details: Value,
    pub timestamp: DateTime<Utc>,
}

impl Entity for AuditLogEntry {
    type Id = AuditLogId;

    fn id(&self) -> AuditLogId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_movement_record() {
        let record: MovementRecord = serde_json::from_str(
            r#"{
                "id": 9,
                "activo": {"id": 1, "codigo_inventario": "ACT-1", "marca": "HP", "modelo": "X"},
                "usuario_registra": {"id": 2, "username": "tecnico", "nombre_completo": "Técnico Uno"},
                "ubicacion_origen": {"id": 3, "nombre_ubicacion": "Sala 101", "departamento": "Urgencias"},
                "ubicacion_destino": {"id": 5, "nombre_ubicacion": "Box 3", "departamento": "UCI"},
                "fecha_movimiento": "2024-02-01T08:00:00Z",
                "tipo_movimiento": "TRASLADO",
                "comentarios": "preventivo"
            }"#,
        )
        .unwrap();
        assert_eq!(record.kind, MovementKind::Transfer);
        assert_eq!(record.destination.unwrap().id, LocationId::new(5));
    }

    #[test]
    fn unknown_audit_action_is_preserved() {
        let entry: AuditLogEntry = serde_json::from_str(
            r#"{
                "id": 1,
                "usuario": null,
                "accion": "MOVILIZACION_ACTIVO",
                "detalle_accion": {"activo_id": 1},
                "timestamp": "2024-02-01T08:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(entry.action, AuditAction::Other("MOVILIZACION_ACTIVO".into()));
        assert_eq!(entry.action.to_string(), "MOVILIZACION_ACTIVO");
        assert!(entry.user_id.is_none());

        let known: AuditAction = "LOGIN".to_string().into();
        assert_eq!(known, AuditAction::Login);
    }
}
