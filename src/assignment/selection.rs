use std::fmt;

use crate::model::{GroupId, WarehouseId, WorkerId};

/// A complete (worker, group, warehouse) triple. Locations are only ever
/// resolved against one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub worker: WorkerId,
    pub group: GroupId,
    pub warehouse: WarehouseId,
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "worker={} group={} warehouse={}",
            self.worker, self.group, self.warehouse
        )
    }
}

/// Current dropdown state; any field may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub worker: Option<WorkerId>,
    pub group: Option<GroupId>,
    pub warehouse: Option<WarehouseId>,
}

impl Selection {
    pub fn key(&self) -> Option<SelectionKey> {
        Some(SelectionKey {
            worker: self.worker?,
            group: self.group?,
            warehouse: self.warehouse?,
        })
    }

    /// The (worker, group) pair the workload summary is keyed by.
    pub fn summary_key(&self) -> Option<(WorkerId, GroupId)> {
        Some((self.worker?, self.group?))
    }

    pub fn is_complete(&self) -> bool {
        self.key().is_some()
    }
}

impl From<SelectionKey> for Selection {
    fn from(key: SelectionKey) -> Self {
        Self {
            worker: Some(key.worker),
            group: Some(key.group),
            warehouse: Some(key.warehouse),
        }
    }
}

/// Stamp on an in-flight location resolution.
///
/// The session bumps its generation on every selector change; a ticket whose
/// generation or key no longer matches is stale and its response is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationTicket {
    pub key: SelectionKey,
    pub generation: u64,
}

/// Stamp on an in-flight workload summary request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryTicket {
    pub worker: WorkerId,
    pub group: GroupId,
    pub generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_requires_all_three() {
        let mut selection = Selection::default();
        assert!(selection.key().is_none());

        selection.worker = Some(WorkerId(7));
        selection.group = Some(GroupId(3));
        assert!(selection.key().is_none());
        assert_eq!(selection.summary_key(), Some((WorkerId(7), GroupId(3))));

        selection.warehouse = Some(WarehouseId(2));
        let key = selection.key().unwrap();
        assert_eq!(key.worker, WorkerId(7));
        assert_eq!(key.group, GroupId(3));
        assert_eq!(key.warehouse, WarehouseId(2));
        assert_eq!(key.to_string(), "worker=7 group=3 warehouse=2");
    }

    #[test]
    fn summary_key_ignores_warehouse() {
        let selection = Selection {
            worker: Some(WorkerId(1)),
            group: None,
            warehouse: Some(WarehouseId(2)),
        };
        assert!(selection.summary_key().is_none());
        assert!(!selection.is_complete());
    }
}
