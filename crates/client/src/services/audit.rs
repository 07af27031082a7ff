//! Read-only supervision endpoints: movement history and audit log.

use sca_core::{AuditLogId, ListParams, Listing, MovementId, Page};
use sca_inventory::{AuditLogEntry, MovementRecord};

use crate::error::ApiError;
use crate::http::ApiClient;

const MOVEMENTS: &str = "/api/historial-movimientos/";
const AUDIT_LOGS: &str = "/api/auditoria-logs/";

#[derive(Debug, Clone)]
pub struct AuditService {
    api: ApiClient,
}

impl AuditService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_movements(&self, params: &ListParams) -> Result<Page<MovementRecord>, ApiError> {
        let listing: Listing<MovementRecord> = self.api.get(MOVEMENTS, &params.to_query()).await?;
        Ok(listing.into())
    }

    pub async fn get_movement(&self, id: MovementId) -> Result<MovementRecord, ApiError> {
        self.api.get(&format!("{MOVEMENTS}{id}/"), &[]).await
    }

    pub async fn list_audit_logs(&self, params: &ListParams) -> Result<Page<AuditLogEntry>, ApiError> {
        let listing: Listing<AuditLogEntry> = self.api.get(AUDIT_LOGS, &params.to_query()).await?;
        Ok(listing.into())
    }

    pub async fn get_audit_log(&self, id: AuditLogId) -> Result<AuditLogEntry, ApiError> {
        self.api.get(&format!("{AUDIT_LOGS}{id}/"), &[]).await
    }
}
