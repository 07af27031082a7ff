//! `sca-core`: shared building blocks for the SCA hospital client.
//!
//! This crate contains **pure** primitives (no IO, no HTTP, no storage):
//! identifiers, the domain error model and pagination types.

pub mod entity;
pub mod error;
pub mod id;
pub mod page;

pub use entity::{Entity, remove_by_id, replace_by_id};
pub use error::{DomainError, DomainResult};
pub use id::{
    AssetId, AssetStatusId, AuditLogId, DepartmentId, EquipmentTypeId, LocationId, MovementId,
    UserId,
};
pub use page::{ListParams, Listing, Page, PageCursor};
