use std::collections::HashSet;

use crate::assignment::partition::LocationPartition;
use crate::assignment::selection::SelectionKey;
use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::{Location, LocationId};

/// Raw server view for one selection key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationSnapshot {
    /// Every location of the warehouse.
    pub all: Vec<Location>,
    /// Locations assigned to the worker in that warehouse.
    pub assigned: Vec<Location>,
}

impl LocationSnapshot {
    /// Assigned ids the warehouse listing does not contain.
    pub fn orphaned_assignments(&self) -> Vec<LocationId> {
        let listed: HashSet<LocationId> = self.all.iter().map(|l| l.id).collect();
        self.assigned
            .iter()
            .map(|l| l.id)
            .filter(|id| !listed.contains(id))
            .collect()
    }

    pub fn into_partition(self) -> LocationPartition {
        LocationPartition::from_snapshot(self.all, self.assigned)
    }
}

/// Fetch both location lists for `key`. Both reads must succeed.
pub async fn fetch_locations<G: Gateway>(gateway: &G, key: SelectionKey) -> Result<LocationSnapshot> {
    // Group is part of the key but not of the assigned lookup.
    let (all, assigned) = tokio::try_join!(
        gateway.list_locations(key.warehouse),
        gateway.assigned_locations(key.worker, key.warehouse),
    )?;
    Ok(LocationSnapshot { all, assigned })
}

/// Resolve the available/assigned split for `key`.
pub async fn resolve_locations<G: Gateway>(
    gateway: &G,
    key: SelectionKey,
) -> Result<LocationPartition> {
    let snapshot = fetch_locations(gateway, key).await?;

    let orphaned = snapshot.orphaned_assignments();
    if !orphaned.is_empty() {
        tracing::warn!(
            %key,
            orphaned = ?orphaned,
            "Assigned locations missing from warehouse listing, dropped from the assigned pane"
        );
    }

    let partition = snapshot.into_partition();
    tracing::debug!(
        %key,
        available = partition.available().len(),
        assigned = partition.assigned().len(),
        "Locations resolved"
    );
    Ok(partition)
}
