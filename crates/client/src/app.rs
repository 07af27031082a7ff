//! Application wiring.
//!
//! Initialization order: storage, session rehydration, HTTP adapter,
//! services, session store, router. Everything is passed explicitly; there is
//! no global session.

use std::sync::Arc;

use thiserror::Error;

use sca_auth::Session;
use sca_navigation::{NavigationError, NavigationOutcome, RouteTableError, Router};

use crate::asset_store::AssetStore;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::services::{AssetService, AuditService, AuthService, LocationService};
use crate::session::{SessionHandle, SessionStore};
use crate::storage::{LocalStorage, StorageError};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("local storage: {0}")]
    Storage(#[from] StorageError),

    #[error("HTTP client: {0}")]
    Http(#[from] ApiError),

    #[error("route table: {0}")]
    Routes(#[from] RouteTableError),
}

pub struct App {
    pub config: ClientConfig,
    pub session: SessionStore,
    pub router: Router,
    pub assets: AssetStore,
    pub locations: LocationService,
    pub audit: AuditService,
}

impl App {
    /// Open the configured storage file and wire everything.
    pub async fn bootstrap(config: ClientConfig) -> Result<Self, BootstrapError> {
        let storage = LocalStorage::open(&config.storage_path).await?;
        Self::with_storage(config, storage).await
    }

    pub async fn with_storage(config: ClientConfig, storage: LocalStorage) -> Result<Self, BootstrapError> {
        let handle = Arc::new(SessionHandle::rehydrate(storage).await?);
        let api = ApiClient::new(&config, Arc::clone(&handle))?;

        let session = SessionStore::new(handle, AuthService::new(api.clone()));
        let assets = AssetStore::new(AssetService::new(api.clone()));
        let locations = LocationService::new(api.clone());
        let audit = AuditService::new(api);
        let router = Router::hospital()?;

        tracing::debug!(api_url = %config.api_url, "client ready");
        Ok(Self {
            config,
            session,
            router,
            assets,
            locations,
            audit,
        })
    }

    /// Current session snapshot.
    pub fn current_session(&self) -> Session {
        self.session.session()
    }

    /// Run a navigation through the guard with the current session.
    pub fn navigate(&mut self, path: &str) -> Result<NavigationOutcome, NavigationError> {
        let session = self.session.session();
        self.router.navigate(path, &session)
    }
}
