//! One method per REST call; no retry, no caching.

pub mod assets;
pub mod audit;
pub mod auth;
pub mod locations;

pub use assets::AssetService;
pub use audit::AuditService;
pub use auth::{AuthService, RefreshResponse, TokenResponse};
pub use locations::LocationService;
