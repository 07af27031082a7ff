//! Cached asset collection backing the asset views.
//!
//! Local edits are mirrored into the cached page (prepend on create,
//! splice-replace on update, filter-out on delete). A relocation is only
//! trusted through the fresh fetch that follows it.

use tracing::warn;

use sca_core::{AssetId, ListParams, PageCursor, remove_by_id, replace_by_id};
use sca_inventory::{Asset, AssetInput, AssetPatch, MoveOutcome, MoveRequest};

use crate::error::ApiError;
use crate::services::AssetService;

#[derive(Debug, Clone)]
pub struct AssetStore {
    service: AssetService,
    items: Vec<Asset>,
    current: Option<Asset>,
    loading: bool,
    error: Option<String>,
    cursor: PageCursor,
}

impl AssetStore {
    pub fn new(service: AssetService) -> Self {
        Self {
            service,
            items: Vec::new(),
            current: None,
            loading: false,
            error: None,
            cursor: PageCursor::default(),
        }
    }

    pub fn items(&self) -> &[Asset] {
        &self.items
    }

    pub fn current(&self) -> Option<&Asset> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// User-facing text of the last failure, cleared when an operation starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn total_count(&self) -> u64 {
        self.cursor.total_count
    }

    pub fn has_next_page(&self) -> bool {
        self.cursor.has_next()
    }

    pub fn has_previous_page(&self) -> bool {
        self.cursor.has_previous()
    }

    /// Load one page; replaces the cached items and the cursor.
    pub async fn fetch_assets(&mut self, params: &ListParams) -> Result<&[Asset], ApiError> {
        self.begin();
        let result = self.service.list(params).await;
        let page = self.finish(result, || "Could not load assets".to_string())?;

        self.cursor = PageCursor::from_page(&page, params);
        self.items = page.results;
        Ok(&self.items)
    }

    pub async fn fetch_asset(&mut self, id: AssetId) -> Result<Asset, ApiError> {
        self.begin();
        let result = self.service.get(id).await;
        let asset = self.finish(result, || format!("Could not load asset {id}"))?;

        self.current = Some(asset.clone());
        Ok(asset)
    }

    /// Create an asset; it is prepended to the cached page without a re-fetch.
    pub async fn add_asset(&mut self, input: &AssetInput) -> Result<Asset, ApiError> {
        self.begin();
        let result = self.service.create(input).await;
        let created = self.finish(result, || "Could not create asset".to_string())?;

        self.items.insert(0, created.clone());
        Ok(created)
    }

    pub async fn edit_asset(&mut self, id: AssetId, input: &AssetInput) -> Result<Asset, ApiError> {
        self.begin();
        let result = self.service.update(id, input).await;
        let updated = self.finish(result, || "Could not update asset".to_string())?;

        self.replace_cached(id, &updated);
        Ok(updated)
    }

    pub async fn patch_asset(&mut self, id: AssetId, patch: &AssetPatch) -> Result<Asset, ApiError> {
        self.begin();
        let result = self.service.partial_update(id, patch).await;
        let updated = self.finish(result, || "Could not update asset".to_string())?;

        self.replace_cached(id, &updated);
        Ok(updated)
    }

    pub async fn remove_asset(&mut self, id: AssetId) -> Result<(), ApiError> {
        self.begin();
        let result = self.service.delete(id).await;
        self.finish(result, || "Could not delete asset".to_string())?;

        remove_by_id(&mut self.items, id);
        if self.current.as_ref().is_some_and(|a| a.id == id) {
            self.current = None;
        }
        Ok(())
    }

    /// Relocate an asset, then re-fetch it.
    ///
    /// `current` becomes the fresh fetch, never the relocate response. The
    /// response is returned as a summary when the server sent a readable one.
    pub async fn move_asset(
        &mut self,
        id: AssetId,
        request: &MoveRequest,
    ) -> Result<Option<MoveOutcome>, ApiError> {
        self.begin();
        let result = match self.service.relocate(id, request).await {
            Ok(outcome) => self.service.get(id).await.map(|fresh| (outcome, fresh)),
            Err(err) => Err(err),
        };
        let (outcome, fresh) = self.finish(result, || "Could not move asset".to_string())?;

        replace_by_id(&mut self.items, &fresh);
        self.current = Some(fresh);
        Ok(outcome)
    }

    pub fn clear_state(&mut self) {
        self.items.clear();
        self.current = None;
        self.loading = false;
        self.error = None;
        self.cursor = PageCursor::default();
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn finish<T>(
        &mut self,
        result: Result<T, ApiError>,
        fallback: impl FnOnce() -> String,
    ) -> Result<T, ApiError> {
        self.loading = false;
        if let Err(err) = &result {
            let message = err.server_message().map(str::to_string).unwrap_or_else(fallback);
            warn!(error = %err, %message, "asset store operation failed");
            self.error = Some(message);
        }
        result
    }

    fn replace_cached(&mut self, id: AssetId, updated: &Asset) {
        replace_by_id(&mut self.items, updated);
        if self.current.as_ref().is_some_and(|a| a.id == id) {
            self.current = Some(updated.clone());
        }
    }
}
