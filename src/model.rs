//! Wire and domain types for the counting API.
//!
//! Field names on the wire are the API's Spanish names (`nombre`, `bodega_id`,
//! ...); the Rust side uses English names and serde renames.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// User id of a counting operator.
    WorkerId
);
id_type!(
    /// Count group (campaign) id.
    GroupId
);
id_type!(WarehouseId);
id_type!(LocationId);
id_type!(
    /// Tenant id carried in the `x-empresa-id` header.
    CompanyId
);

pub const ADMIN_ROLE: &str = "admin";

/// A user as returned by `/api/admin/usuarios`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: WorkerId,
    pub username: String,
    pub role: String,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// A user who can receive counting work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worker {
    pub id: WorkerId,
    pub display_name: String,
    pub role: String,
}

impl From<UserRecord> for Worker {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            display_name: user.username,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountGroup {
    pub id: GroupId,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "activo", with = "flag")]
    pub active: bool,
    #[serde(
        rename = "fecha",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    #[serde(rename = "nombre")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    #[serde(rename = "nombre")]
    pub name: String,
}

impl Location {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: LocationId(id),
            name: name.into(),
        }
    }
}

/// Assigned-location count for one warehouse, per worker and group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSummaryEntry {
    #[serde(rename = "bodega_nombre", alias = "bodega")]
    pub warehouse_name: String,
    #[serde(rename = "total_ubicaciones", alias = "total")]
    pub total_locations: u64,
}

/// Body of `POST /api/asignacion/guardar-masivo`.
///
/// `locations` is the complete assigned set; the server replaces whatever it
/// held for (worker, group, warehouse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAssignmentRequest {
    #[serde(rename = "usuario_id")]
    pub worker_id: WorkerId,
    #[serde(rename = "conteo_grupo_id")]
    pub group_id: GroupId,
    #[serde(rename = "bodega_id")]
    pub warehouse_id: WarehouseId,
    #[serde(rename = "ubicaciones")]
    pub locations: Vec<LocationId>,
    #[serde(rename = "empresa_id")]
    pub company_id: Option<CompanyId>,
}

/// The API reports `activo` as 0/1; older builds sent booleans.
mod flag {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => b,
            Raw::Int(n) => n != 0,
        })
    }
}
