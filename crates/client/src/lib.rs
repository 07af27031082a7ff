//! `sca-client`
//!
//! REST client, session lifecycle and stores of the SCA hospital asset
//! inventory.
//!
//! The `sca` binary in this crate is the command-line front end; every
//! command is a navigation through the same route guard.

pub mod app;
pub mod asset_store;
pub mod config;
pub mod error;
pub mod http;
pub mod services;
pub mod session;
pub mod storage;

pub use app::{App, BootstrapError};
pub use asset_store::AssetStore;
pub use config::{ClientConfig, ConfigError, ConfigOverrides};
pub use error::{ApiError, ApiErrorKind};
pub use http::ApiClient;
pub use session::{LoginError, ProfileError, SessionHandle, SessionStore};
pub use storage::{LocalStorage, StorageError};
