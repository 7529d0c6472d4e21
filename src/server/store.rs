//! In-memory assignment data behind the reference server.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    BulkAssignmentRequest, CountGroup, GroupId, Location, LocationId, UserRecord, Warehouse,
    WarehouseId, WorkerId, WorkloadSummaryEntry,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown worker: {0}")]
    UnknownWorker(WorkerId),

    #[error("Unknown count group: {0}")]
    UnknownGroup(GroupId),

    #[error("Unknown warehouse: {0}")]
    UnknownWarehouse(WarehouseId),

    #[error("Location {location} does not belong to warehouse {warehouse}")]
    ForeignLocation {
        location: LocationId,
        warehouse: WarehouseId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLocation {
    pub id: LocationId,
    pub name: String,
    pub warehouse: WarehouseId,
}

impl StoredLocation {
    fn to_location(&self) -> Location {
        Location {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// One row of the (worker, group, location) relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub worker: WorkerId,
    pub group: GroupId,
    pub location: LocationId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub groups: Vec<CountGroup>,
    #[serde(default)]
    pub warehouses: Vec<Warehouse>,
    #[serde(default)]
    pub locations: Vec<StoredLocation>,
    #[serde(default)]
    pub assignments: BTreeSet<AssignmentRecord>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON seed file.
    pub async fn load(path: &Path) -> crate::error::Result<Self> {
        let raw = tokio::fs::read(path).await?;
        let inventory: Inventory = serde_json::from_slice(&raw)?;
        tracing::info!(
            path = %path.display(),
            users = inventory.users.len(),
            locations = inventory.locations.len(),
            assignments = inventory.assignments.len(),
            "Inventory seed loaded"
        );
        Ok(inventory)
    }

    pub fn with_user(mut self, id: u64, username: &str, role: &str) -> Self {
        self.users.push(UserRecord {
            id: WorkerId(id),
            username: username.to_string(),
            role: role.to_string(),
        });
        self
    }

    pub fn with_group(mut self, id: u64, description: &str, active: bool) -> Self {
        self.groups.push(CountGroup {
            id: GroupId(id),
            description: description.to_string(),
            active,
            date: None,
        });
        self
    }

    pub fn with_warehouse(mut self, id: u64, name: &str) -> Self {
        self.warehouses.push(Warehouse {
            id: WarehouseId(id),
            name: name.to_string(),
        });
        self
    }

    pub fn with_location(mut self, id: u64, name: &str, warehouse: u64) -> Self {
        self.locations.push(StoredLocation {
            id: LocationId(id),
            name: name.to_string(),
            warehouse: WarehouseId(warehouse),
        });
        self
    }

    pub fn with_assignment(mut self, worker: u64, group: u64, location: u64) -> Self {
        self.assignments.insert(AssignmentRecord {
            worker: WorkerId(worker),
            group: GroupId(group),
            location: LocationId(location),
        });
        self
    }

    pub fn active_groups(&self) -> Vec<CountGroup> {
        self.groups.iter().filter(|g| g.active).cloned().collect()
    }

    pub fn locations_in(&self, warehouse: WarehouseId) -> Vec<Location> {
        self.locations
            .iter()
            .filter(|l| l.warehouse == warehouse)
            .map(StoredLocation::to_location)
            .collect()
    }

    /// Locations assigned to `worker` in `warehouse`, from any group.
    pub fn assigned_to(&self, worker: WorkerId, warehouse: WarehouseId) -> Vec<Location> {
        let assigned: HashSet<LocationId> = self
            .assignments
            .iter()
            .filter(|a| a.worker == worker)
            .map(|a| a.location)
            .collect();
        self.locations
            .iter()
            .filter(|l| l.warehouse == warehouse && assigned.contains(&l.id))
            .map(StoredLocation::to_location)
            .collect()
    }

    /// Assigned location ids for one (worker, group, warehouse) triple.
    pub fn assignment_set(
        &self,
        worker: WorkerId,
        group: GroupId,
        warehouse: WarehouseId,
    ) -> BTreeSet<LocationId> {
        let in_warehouse = self.location_ids_in(warehouse);
        self.assignments
            .iter()
            .filter(|a| a.worker == worker && a.group == group && in_warehouse.contains(&a.location))
            .map(|a| a.location)
            .collect()
    }

    /// Assigned-location counts per warehouse, in warehouse listing order.
    pub fn summary(&self, worker: WorkerId, group: GroupId) -> Vec<WorkloadSummaryEntry> {
        let warehouse_of: BTreeMap<LocationId, WarehouseId> =
            self.locations.iter().map(|l| (l.id, l.warehouse)).collect();

        let mut counts: BTreeMap<WarehouseId, u64> = BTreeMap::new();
        for record in self
            .assignments
            .iter()
            .filter(|a| a.worker == worker && a.group == group)
        {
            if let Some(&warehouse) = warehouse_of.get(&record.location) {
                *counts.entry(warehouse).or_default() += 1;
            }
        }

        self.warehouses
            .iter()
            .filter_map(|w| {
                counts.get(&w.id).map(|&total| WorkloadSummaryEntry {
                    warehouse_name: w.name.clone(),
                    total_locations: total,
                })
            })
            .collect()
    }

    /// Replace the (worker, group, warehouse) assignment set with the request's
    /// list. Replaying the same request leaves the same state.
    pub fn replace(&mut self, request: &BulkAssignmentRequest) -> Result<usize, StoreError> {
        if !self.users.iter().any(|u| u.id == request.worker_id) {
            return Err(StoreError::UnknownWorker(request.worker_id));
        }
        if !self.groups.iter().any(|g| g.id == request.group_id) {
            return Err(StoreError::UnknownGroup(request.group_id));
        }
        if !self.warehouses.iter().any(|w| w.id == request.warehouse_id) {
            return Err(StoreError::UnknownWarehouse(request.warehouse_id));
        }

        let in_warehouse = self.location_ids_in(request.warehouse_id);
        if let Some(&foreign) = request
            .locations
            .iter()
            .find(|id| !in_warehouse.contains(*id))
        {
            return Err(StoreError::ForeignLocation {
                location: foreign,
                warehouse: request.warehouse_id,
            });
        }

        self.assignments.retain(|a| {
            !(a.worker == request.worker_id
                && a.group == request.group_id
                && in_warehouse.contains(&a.location))
        });
        for &location in &request.locations {
            self.assignments.insert(AssignmentRecord {
                worker: request.worker_id,
                group: request.group_id,
                location,
            });
        }

        Ok(self
            .assignment_set(request.worker_id, request.group_id, request.warehouse_id)
            .len())
    }

    fn location_ids_in(&self, warehouse: WarehouseId) -> HashSet<LocationId> {
        self.locations
            .iter()
            .filter(|l| l.warehouse == warehouse)
            .map(|l| l.id)
            .collect()
    }
}
