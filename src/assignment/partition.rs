use std::collections::HashSet;

use crate::model::{Location, LocationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToAssigned,
    ToAvailable,
}

/// Two-pane split of a warehouse's locations into available and assigned.
///
/// Both panes keep their own order. Moves take items out of one pane and
/// append them to the other, so no location is ever duplicated or lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPartition {
    available: Vec<Location>,
    assigned: Vec<Location>,
}

impl LocationPartition {
    /// Split `all` against the server's `assigned` list.
    ///
    /// Assigned entries keep server order with duplicate ids dropped, as are
    /// ids `all` does not list; available is `all` minus anything assigned,
    /// in `all`'s order. The result always covers exactly `all`.
    pub fn from_snapshot(all: Vec<Location>, assigned: Vec<Location>) -> Self {
        let listed: HashSet<LocationId> = all.iter().map(|loc| loc.id).collect();

        let mut seen = HashSet::with_capacity(assigned.len());
        let assigned: Vec<Location> = assigned
            .into_iter()
            .filter(|loc| listed.contains(&loc.id) && seen.insert(loc.id))
            .collect();

        let mut kept = HashSet::with_capacity(all.len());
        let available = all
            .into_iter()
            .filter(|loc| !seen.contains(&loc.id) && kept.insert(loc.id))
            .collect();

        Self {
            available,
            assigned,
        }
    }

    pub fn available(&self) -> &[Location] {
        &self.available
    }

    pub fn assigned(&self) -> &[Location] {
        &self.assigned
    }

    pub fn assigned_ids(&self) -> Vec<LocationId> {
        self.assigned.iter().map(|loc| loc.id).collect()
    }

    pub fn available_ids(&self) -> Vec<LocationId> {
        self.available.iter().map(|loc| loc.id).collect()
    }

    pub fn len(&self) -> usize {
        self.available.len() + self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the given ids in `direction`, returning the new partition.
    ///
    /// Ids not present in the source pane are ignored. Moved items land at the
    /// end of the target pane in their source order.
    pub fn move_to(&self, ids: &[LocationId], direction: Direction) -> Self {
        let wanted: HashSet<LocationId> = ids.iter().copied().collect();
        let (source, target) = match direction {
            Direction::ToAssigned => (&self.available, &self.assigned),
            Direction::ToAvailable => (&self.assigned, &self.available),
        };

        let (moved, kept): (Vec<Location>, Vec<Location>) = source
            .iter()
            .cloned()
            .partition(|loc| wanted.contains(&loc.id));

        let mut grown = target.clone();
        grown.extend(moved);

        match direction {
            Direction::ToAssigned => Self {
                available: kept,
                assigned: grown,
            },
            Direction::ToAvailable => Self {
                available: grown,
                assigned: kept,
            },
        }
    }

    /// Move everything in the source pane.
    pub fn move_all(&self, direction: Direction) -> Self {
        let ids: Vec<LocationId> = match direction {
            Direction::ToAssigned => self.available_ids(),
            Direction::ToAvailable => self.assigned_ids(),
        };
        self.move_to(&ids, direction)
    }

    pub fn is_disjoint(&self) -> bool {
        let available: HashSet<LocationId> = self.available.iter().map(|l| l.id).collect();
        available.len() == self.available.len()
            && self.assigned.iter().all(|l| !available.contains(&l.id))
    }

    /// True when the panes are disjoint and together hold exactly `all`.
    pub fn covers(&self, all: &[Location]) -> bool {
        if !self.is_disjoint() {
            return false;
        }
        let expected: HashSet<LocationId> = all.iter().map(|l| l.id).collect();
        let actual: HashSet<LocationId> = self
            .available
            .iter()
            .chain(self.assigned.iter())
            .map(|l| l.id)
            .collect();
        actual.len() == self.len() && actual == expected
    }
}
