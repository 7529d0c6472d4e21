use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::{CountGroup, GroupId, UserRecord, Warehouse, WarehouseId, Worker, WorkerId};

/// Option lists for the three selectors, loaded once per session.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub workers: Vec<Worker>,
    pub groups: Vec<CountGroup>,
    pub warehouses: Vec<Warehouse>,
}

impl ReferenceData {
    pub fn worker(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&CountGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn warehouse(&self, id: WarehouseId) -> Option<&Warehouse> {
        self.warehouses.iter().find(|w| w.id == id)
    }

    /// Label for a worker, falling back to the raw id when unknown.
    pub fn worker_label(&self, id: WorkerId) -> String {
        self.worker(id)
            .map(|w| w.display_name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    pub fn warehouse_label(&self, id: WarehouseId) -> String {
        self.warehouse(id)
            .map(|w| w.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    /// The pre-selected group, if it is among the loaded ones.
    pub fn initial_group(&self, preselected: Option<GroupId>) -> Option<GroupId> {
        let id = preselected?;
        match self.group(id) {
            Some(group) => Some(group.id),
            None => {
                tracing::warn!(group_id = %id, "Pre-selected group is not active, ignoring");
                None
            }
        }
    }
}

/// Users that can be given counting work: everyone except administrators.
pub fn eligible_workers(users: Vec<UserRecord>) -> Vec<Worker> {
    users
        .into_iter()
        .filter(|u| !u.is_admin())
        .map(Worker::from)
        .collect()
}

/// Load workers, active groups and warehouses concurrently.
///
/// The three loads are independent: a failure is logged and leaves only its
/// own list empty.
pub async fn load_reference_data<G: Gateway>(gateway: &G) -> ReferenceData {
    let (users, groups, warehouses) = tokio::join!(
        gateway.list_users(),
        gateway.list_active_groups(),
        gateway.list_warehouses(),
    );

    let data = ReferenceData {
        workers: eligible_workers(or_empty(users, "workers")),
        groups: or_empty(groups, "groups"),
        warehouses: or_empty(warehouses, "warehouses"),
    };

    tracing::info!(
        workers = data.workers.len(),
        groups = data.groups.len(),
        warehouses = data.warehouses.len(),
        "Reference data loaded"
    );
    data
}

fn or_empty<T>(result: Result<Vec<T>>, what: &'static str) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(list = what, error = %e, "Failed to load reference list");
            Vec::new()
        }
    }
}
