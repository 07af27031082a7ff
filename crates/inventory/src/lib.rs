//! Hospital inventory records as served by the SCA REST API.
//!
//! These are server-owned shapes: the client reads them, sends write payloads,
//! and never treats a local copy as authoritative.

pub mod asset;
pub mod history;
pub mod location;

pub use asset::{
    Asset, AssetInput, AssetLabel, AssetPatch, AssetStatus, EquipmentType, MoveOutcome,
    MoveRequest, MoveSummary, MovedLocation,
};
pub use history::{
    AuditAction, AuditLogEntry, LocationSummary, MovedAsset, MovementKind, MovementRecord,
    UserSummary,
};
pub use location::{Department, Location, LocationInput, LocationPatch};
