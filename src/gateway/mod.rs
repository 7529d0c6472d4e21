//! Remote data gateway: the only path from the client to the counting API.

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::model::{
    BulkAssignmentRequest, CountGroup, GroupId, Location, UserRecord, Warehouse, WarehouseId,
    WorkerId, WorkloadSummaryEntry,
};

pub mod http;

pub use http::HttpGateway;

pub const USERS_PATH: &str = "/api/admin/usuarios";
pub const ACTIVE_GROUPS_PATH: &str = "/api/conteos/grupos/activos";
pub const WAREHOUSES_PATH: &str = "/api/bodegas/listar";
pub const LOCATIONS_PATH: &str = "/api/ubicaciones/listar";
pub const ASSIGNED_LOCATIONS_PATH: &str = "/api/asignacion/admin/ubicaciones-usuario";
pub const SUMMARY_PATH: &str = "/api/asignacion/admin/resumen-usuario";
pub const BULK_SAVE_PATH: &str = "/api/asignacion/guardar-masivo";

pub const COMPANY_HEADER: &str = "x-empresa-id";

/// Read and write operations the assignment flow needs from the API.
///
/// Implementations attach credentials themselves; callers never see tokens.
pub trait Gateway: Send + Sync {
    /// All users, administrators included.
    fn list_users(&self) -> impl Future<Output = Result<Vec<UserRecord>>> + Send;

    fn list_active_groups(&self) -> impl Future<Output = Result<Vec<CountGroup>>> + Send;

    fn list_warehouses(&self) -> impl Future<Output = Result<Vec<Warehouse>>> + Send;

    /// Every location of one warehouse.
    fn list_locations(
        &self,
        warehouse: WarehouseId,
    ) -> impl Future<Output = Result<Vec<Location>>> + Send;

    /// Locations assigned to a worker inside a warehouse.
    ///
    /// The lookup is keyed by worker and warehouse only; assignments from every
    /// count group are visible here.
    fn assigned_locations(
        &self,
        worker: WorkerId,
        warehouse: WarehouseId,
    ) -> impl Future<Output = Result<Vec<Location>>> + Send;

    fn workload_summary(
        &self,
        worker: WorkerId,
        group: GroupId,
    ) -> impl Future<Output = Result<Vec<WorkloadSummaryEntry>>> + Send;

    /// Replace the assignment set for (worker, group, warehouse).
    fn save_assignment(
        &self,
        request: &BulkAssignmentRequest,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl<G: Gateway> Gateway for Arc<G> {
    fn list_users(&self) -> impl Future<Output = Result<Vec<UserRecord>>> + Send {
        self.as_ref().list_users()
    }

    fn list_active_groups(&self) -> impl Future<Output = Result<Vec<CountGroup>>> + Send {
        self.as_ref().list_active_groups()
    }

    fn list_warehouses(&self) -> impl Future<Output = Result<Vec<Warehouse>>> + Send {
        self.as_ref().list_warehouses()
    }

    fn list_locations(
        &self,
        warehouse: WarehouseId,
    ) -> impl Future<Output = Result<Vec<Location>>> + Send {
        self.as_ref().list_locations(warehouse)
    }

    fn assigned_locations(
        &self,
        worker: WorkerId,
        warehouse: WarehouseId,
    ) -> impl Future<Output = Result<Vec<Location>>> + Send {
        self.as_ref().assigned_locations(worker, warehouse)
    }

    fn workload_summary(
        &self,
        worker: WorkerId,
        group: GroupId,
    ) -> impl Future<Output = Result<Vec<WorkloadSummaryEntry>>> + Send {
        self.as_ref().workload_summary(worker, group)
    }

    fn save_assignment(
        &self,
        request: &BulkAssignmentRequest,
    ) -> impl Future<Output = Result<()>> + Send {
        self.as_ref().save_assignment(request)
    }
}
