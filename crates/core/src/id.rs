//! Strongly-typed identifiers used across the domain.
//!
//! The backend assigns integer primary keys; the newtypes keep an asset id from
//! being passed where a location id is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an asset (`/api/activos/:id/`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(i64);

/// Identifier of a location (`/api/ubicaciones/:id/`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(i64);

/// Identifier of a hospital department.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(i64);

/// Identifier of an equipment type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentTypeId(i64);

/// Identifier of an asset status (operational, in maintenance, ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetStatusId(i64);

/// Identifier of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of a movement history record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(i64);

/// Identifier of an audit log entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLogId(i64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id($name, e.to_string()))?;
                if value <= 0 {
                    return Err(DomainError::invalid_id(
                        $name,
                        format!("must be positive, got {value}"),
                    ));
                }
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(AssetId, "AssetId");
impl_int_newtype!(LocationId, "LocationId");
impl_int_newtype!(DepartmentId, "DepartmentId");
impl_int_newtype!(EquipmentTypeId, "EquipmentTypeId");
impl_int_newtype!(AssetStatusId, "AssetStatusId");
impl_int_newtype!(UserId, "UserId");
impl_int_newtype!(MovementId, "MovementId");
impl_int_newtype!(AuditLogId, "AuditLogId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        let id: AssetId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn rejects_non_numeric_and_non_positive_ids() {
        assert!(matches!(
            "abc".parse::<AssetId>(),
            Err(DomainError::InvalidId { kind: "AssetId", .. })
        ));
        assert!(matches!("0".parse::<LocationId>(), Err(DomainError::InvalidId { .. })));

        let err = "-3".parse::<LocationId>().unwrap_err();
        assert_eq!(err.to_string(), "invalid LocationId: must be positive, got -3");
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&LocationId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: LocationId = serde_json::from_str("7").unwrap();
        assert_eq!(back, LocationId::new(7));
    }
}
