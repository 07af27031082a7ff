use sca_core::{AssetId, ListParams, Listing, Page};
use sca_inventory::{Asset, AssetInput, AssetPatch, MoveOutcome, MoveRequest};

use crate::error::ApiError;
use crate::http::ApiClient;

const ASSETS: &str = "/api/activos/";

fn asset_path(id: AssetId) -> String {
    format!("{ASSETS}{id}/")
}

/// `/api/activos/` endpoints.
#[derive(Debug, Clone)]
pub struct AssetService {
    api: ApiClient,
}

impl AssetService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Page<Asset>, ApiError> {
        let listing: Listing<Asset> = self.api.get(ASSETS, &params.to_query()).await?;
        Ok(listing.into())
    }

    pub async fn get(&self, id: AssetId) -> Result<Asset, ApiError> {
        self.api.get(&asset_path(id), &[]).await
    }

    pub async fn create(&self, input: &AssetInput) -> Result<Asset, ApiError> {
        self.api.post(ASSETS, input).await
    }

    pub async fn update(&self, id: AssetId, input: &AssetInput) -> Result<Asset, ApiError> {
        self.api.put(&asset_path(id), input).await
    }

    pub async fn partial_update(&self, id: AssetId, patch: &AssetPatch) -> Result<Asset, ApiError> {
        self.api.patch(&asset_path(id), patch).await
    }

    pub async fn delete(&self, id: AssetId) -> Result<(), ApiError> {
        self.api.delete(&asset_path(id)).await
    }

    /// `POST /api/activos/:id/movilizar/`.
    ///
    /// Only the status decides success; the body, when readable, is a summary.
    pub async fn relocate(&self, id: AssetId, request: &MoveRequest) -> Result<Option<MoveOutcome>, ApiError> {
        let body = self
            .api
            .post_lenient(&format!("{}movilizar/", asset_path(id)), request)
            .await?;
        Ok(body.map(MoveOutcome::from_value))
    }
}
