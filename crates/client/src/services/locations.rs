use sca_core::{ListParams, Listing, LocationId, Page};
use sca_inventory::{Location, LocationInput, LocationPatch};

use crate::error::ApiError;
use crate::http::ApiClient;

const LOCATIONS: &str = "/api/ubicaciones/";

fn location_path(id: LocationId) -> String {
    format!("{LOCATIONS}{id}/")
}

/// `/api/ubicaciones/` endpoints.
#[derive(Debug, Clone)]
pub struct LocationService {
    api: ApiClient,
}

impl LocationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Page<Location>, ApiError> {
        let listing: Listing<Location> = self.api.get(LOCATIONS, &params.to_query()).await?;
        Ok(listing.into())
    }

    pub async fn get(&self, id: LocationId) -> Result<Location, ApiError> {
        self.api.get(&location_path(id), &[]).await
    }

    pub async fn create(&self, input: &LocationInput) -> Result<Location, ApiError> {
        self.api.post(LOCATIONS, input).await
    }

    pub async fn update(&self, id: LocationId, input: &LocationInput) -> Result<Location, ApiError> {
        self.api.put(&location_path(id), input).await
    }

    pub async fn partial_update(&self, id: LocationId, patch: &LocationPatch) -> Result<Location, ApiError> {
        self.api.patch(&location_path(id), patch).await
    }

    pub async fn delete(&self, id: LocationId) -> Result<(), ApiError> {
        self.api.delete(&location_path(id)).await
    }
}
