use std::fmt;

use crate::assignment::partition::{Direction, LocationPartition};
use crate::assignment::reference::{load_reference_data, ReferenceData};
use crate::assignment::resolver::resolve_locations;
use crate::assignment::save::save_assignment;
use crate::assignment::selection::{LocationTicket, Selection, SummaryTicket};
use crate::assignment::summary::resolve_summary;
use crate::config::ClientConfig;
use crate::error::{ConteoError, Result};
use crate::gateway::Gateway;
use crate::model::{
    CompanyId, GroupId, Location, LocationId, WarehouseId, WorkerId, WorkloadSummaryEntry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A transient message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Notice {
    fn success(detail: String) -> Self {
        Self {
            severity: Severity::Success,
            summary: "Éxito".to_string(),
            detail,
        }
    }

    fn error(detail: String) -> Self {
        Self {
            severity: Severity::Error,
            summary: "Error".to_string(),
            detail,
        }
    }
}

/// Outcome of handing a response back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response matched the current selection and was used.
    Current,
    /// The selection moved on while the request was in flight; dropped.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub company_id: Option<CompanyId>,
    pub refresh_after_save: bool,
    /// Group to select on start, if it is among the active ones.
    pub preselected_group: Option<GroupId>,
}

impl SessionOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            company_id: config.company_id,
            refresh_after_save: config.refresh_after_save,
            preselected_group: None,
        }
    }

    pub fn with_preselected_group(mut self, group: GroupId) -> Self {
        self.preselected_group = Some(group);
        self
    }
}

/// Reconciliation state for one operator screen.
///
/// Owns the selection, the two-pane partition and the workload summary.
/// Requests are dispatched with a ticket taken from the session and their
/// results handed back through `apply_*`; results for a selection that is no
/// longer current are discarded.
#[derive(Debug)]
pub struct AssignmentSession {
    reference: ReferenceData,
    selection: Selection,
    generation: u64,
    summary_generation: u64,
    /// `None` until the current key has resolved.
    partition: Option<LocationPartition>,
    summary: Vec<WorkloadSummaryEntry>,
    options: SessionOptions,
    notices: Vec<Notice>,
}

impl AssignmentSession {
    pub fn new(reference: ReferenceData, options: SessionOptions) -> Self {
        let selection = Selection {
            group: reference.initial_group(options.preselected_group),
            ..Default::default()
        };
        Self {
            reference,
            selection,
            generation: 0,
            summary_generation: 0,
            partition: None,
            summary: Vec::new(),
            options,
            notices: Vec::new(),
        }
    }

    /// Load reference data and open a session over it.
    pub async fn start<G: Gateway>(gateway: &G, options: SessionOptions) -> Self {
        let reference = load_reference_data(gateway).await;
        Self::new(reference, options)
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn partition(&self) -> Option<&LocationPartition> {
        self.partition.as_ref()
    }

    pub fn available(&self) -> &[Location] {
        self.partition
            .as_ref()
            .map(|p| p.available())
            .unwrap_or_default()
    }

    pub fn assigned(&self) -> &[Location] {
        self.partition
            .as_ref()
            .map(|p| p.assigned())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> &[WorkloadSummaryEntry] {
        &self.summary
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Save is only offered with all three selectors set.
    pub fn can_save(&self) -> bool {
        self.selection.is_complete()
    }

    pub fn select_worker(&mut self, worker: Option<WorkerId>) -> bool {
        if self.selection.worker == worker {
            return false;
        }
        self.selection.worker = worker;
        self.invalidate(true);
        true
    }

    pub fn select_group(&mut self, group: Option<GroupId>) -> bool {
        if self.selection.group == group {
            return false;
        }
        self.selection.group = group;
        self.invalidate(true);
        true
    }

    pub fn select_warehouse(&mut self, warehouse: Option<WarehouseId>) -> bool {
        if self.selection.warehouse == warehouse {
            return false;
        }
        self.selection.warehouse = warehouse;
        self.invalidate(false);
        true
    }

    fn invalidate(&mut self, summary_affected: bool) {
        self.generation += 1;
        self.partition = None;
        if summary_affected {
            self.summary_generation += 1;
            self.summary.clear();
        }
        tracing::debug!(
            generation = self.generation,
            selection = ?self.selection,
            "Selection changed, panes cleared"
        );
    }

    /// Ticket for resolving locations under the current selection.
    pub fn location_ticket(&self) -> Option<LocationTicket> {
        Some(LocationTicket {
            key: self.selection.key()?,
            generation: self.generation,
        })
    }

    pub fn summary_ticket(&self) -> Option<SummaryTicket> {
        let (worker, group) = self.selection.summary_key()?;
        Some(SummaryTicket {
            worker,
            group,
            generation: self.summary_generation,
        })
    }

    pub fn is_current(&self, ticket: &LocationTicket) -> bool {
        ticket.generation == self.generation && Some(ticket.key) == self.selection.key()
    }

    pub fn is_current_summary(&self, ticket: &SummaryTicket) -> bool {
        ticket.generation == self.summary_generation
            && Some((ticket.worker, ticket.group)) == self.selection.summary_key()
    }

    pub fn apply_locations(
        &mut self,
        ticket: LocationTicket,
        result: Result<LocationPartition>,
    ) -> Applied {
        if !self.is_current(&ticket) {
            tracing::debug!(
                key = %ticket.key,
                generation = ticket.generation,
                current = self.generation,
                "Discarding stale location response"
            );
            return Applied::Stale;
        }

        match result {
            Ok(partition) => self.partition = Some(partition),
            Err(e) => {
                tracing::error!(key = %ticket.key, error = %e, "Failed to load locations");
                self.notices.push(Notice::error(format!(
                    "No se pudieron cargar las ubicaciones, {e}"
                )));
            }
        }
        Applied::Current
    }

    pub fn apply_summary(
        &mut self,
        ticket: SummaryTicket,
        result: Result<Vec<WorkloadSummaryEntry>>,
    ) -> Applied {
        if !self.is_current_summary(&ticket) {
            tracing::debug!(
                worker_id = %ticket.worker,
                group_id = %ticket.group,
                "Discarding stale summary response"
            );
            return Applied::Stale;
        }

        match result {
            Ok(entries) => self.summary = entries,
            Err(e) => {
                tracing::error!(
                    worker_id = %ticket.worker,
                    group_id = %ticket.group,
                    error = %e,
                    "Failed to load workload summary"
                );
                self.notices.push(Notice::error(format!(
                    "No se pudo cargar el resumen, {e}"
                )));
            }
        }
        Applied::Current
    }

    /// Resolve locations for the current selection. `None` when incomplete.
    pub async fn refresh_locations<G: Gateway>(&mut self, gateway: &G) -> Option<Applied> {
        let ticket = self.location_ticket()?;
        let result = resolve_locations(gateway, ticket.key).await;
        Some(self.apply_locations(ticket, result))
    }

    /// Resolve the summary for the current worker and group. `None` when
    /// either is unset; the summary is already empty in that case.
    pub async fn refresh_summary<G: Gateway>(&mut self, gateway: &G) -> Option<Applied> {
        let ticket = self.summary_ticket()?;
        let result = resolve_summary(gateway, Some(ticket.worker), Some(ticket.group)).await;
        Some(self.apply_summary(ticket, result))
    }

    /// Refresh locations and summary concurrently.
    pub async fn refresh<G: Gateway>(&mut self, gateway: &G) {
        let location_ticket = self.location_ticket();
        let summary_ticket = self.summary_ticket();

        let (locations, summary) = tokio::join!(
            async {
                match location_ticket {
                    Some(t) => Some(resolve_locations(gateway, t.key).await),
                    None => None,
                }
            },
            async {
                match summary_ticket {
                    Some(t) => Some(resolve_summary(gateway, Some(t.worker), Some(t.group)).await),
                    None => None,
                }
            },
        );

        if let (Some(ticket), Some(result)) = (location_ticket, locations) {
            self.apply_locations(ticket, result);
        }
        if let (Some(ticket), Some(result)) = (summary_ticket, summary) {
            self.apply_summary(ticket, result);
        }
    }

    /// Move locations between the panes.
    pub fn transfer(
        &mut self,
        ids: &[LocationId],
        direction: Direction,
    ) -> Result<&LocationPartition> {
        if !self.selection.is_complete() {
            return Err(ConteoError::IncompleteSelection);
        }
        let current = self.partition.as_ref().ok_or(ConteoError::NotResolved)?;
        let next = current.move_to(ids, direction);
        tracing::debug!(
            moved = ids.len(),
            ?direction,
            available = next.available().len(),
            assigned = next.assigned().len(),
            "Panes updated"
        );
        Ok(self.partition.insert(next))
    }

    /// Persist the assigned pane as the complete assignment set.
    ///
    /// Rejected without a request when the selection is incomplete or the
    /// panes have not resolved yet; sending an unresolved (empty) pane would
    /// wipe the worker's assignments. A failed save leaves the panes as they were.
    pub async fn save<G: Gateway>(&mut self, gateway: &G) -> Result<()> {
        let Some(key) = self.selection.key() else {
            tracing::warn!(selection = ?self.selection, "Save rejected, selection incomplete");
            return Err(ConteoError::IncompleteSelection);
        };
        let assigned = self
            .partition
            .as_ref()
            .ok_or(ConteoError::NotResolved)?
            .assigned_ids();

        match save_assignment(gateway, key, assigned, self.options.company_id).await {
            Ok(()) => {
                let detail = format!(
                    "Asignaciones guardadas para {} en {}",
                    self.reference.worker_label(key.worker),
                    self.reference.warehouse_label(key.warehouse)
                );
                tracing::info!(%key, "Assignment saved");
                self.notices.push(Notice::success(detail));

                if self.options.refresh_after_save {
                    self.refresh(gateway).await;
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(%key, error = %e, "Failed to save assignment");
                self.notices
                    .push(Notice::error(format!("No se pudo guardar, {e}")));
                Err(e)
            }
        }
    }
}
