use crate::assignment::selection::{Selection, SelectionKey};
use crate::error::{ConteoError, Result};
use crate::gateway::Gateway;
use crate::model::{BulkAssignmentRequest, CompanyId, LocationId};

/// Build the bulk-replace body, rejecting an incomplete selection.
pub fn build_request(
    selection: &Selection,
    assigned: Vec<LocationId>,
    company_id: Option<CompanyId>,
) -> Result<BulkAssignmentRequest> {
    let key = selection.key().ok_or(ConteoError::IncompleteSelection)?;
    Ok(request_for(key, assigned, company_id))
}

pub fn request_for(
    key: SelectionKey,
    assigned: Vec<LocationId>,
    company_id: Option<CompanyId>,
) -> BulkAssignmentRequest {
    BulkAssignmentRequest {
        worker_id: key.worker,
        group_id: key.group,
        warehouse_id: key.warehouse,
        locations: assigned,
        company_id,
    }
}

/// Replace the server's assignment set for `key` with `assigned`.
pub async fn save_assignment<G: Gateway>(
    gateway: &G,
    key: SelectionKey,
    assigned: Vec<LocationId>,
    company_id: Option<CompanyId>,
) -> Result<()> {
    let request = request_for(key, assigned, company_id);
    tracing::info!(%key, locations = request.locations.len(), "Saving assignment");
    gateway.save_assignment(&request).await
}
