use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::{GroupId, WorkerId, WorkloadSummaryEntry};

/// Assigned-location counts per warehouse for a worker within a group.
///
/// Returns an empty list without calling the API unless both are set.
pub async fn resolve_summary<G: Gateway>(
    gateway: &G,
    worker: Option<WorkerId>,
    group: Option<GroupId>,
) -> Result<Vec<WorkloadSummaryEntry>> {
    let (Some(worker), Some(group)) = (worker, group) else {
        return Ok(Vec::new());
    };
    let entries = gateway.workload_summary(worker, group).await?;
    tracing::debug!(
        worker_id = %worker,
        group_id = %group,
        warehouses = entries.len(),
        "Workload summary resolved"
    );
    Ok(entries)
}

pub fn total_locations(entries: &[WorkloadSummaryEntry]) -> u64 {
    entries.iter().map(|e| e.total_locations).sum()
}
