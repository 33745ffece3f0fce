//! Item filter configuration.
//!
//! Holds the filter settings (what to filter by) as opposed to the
//! [`ItemFilter`](super::ItemFilter) implementations that do the filtering.

use super::{
    AssigneeFilter, CompositeFilter, EpicFilter, KindFilter, PriorityFilter, StatusFilter,
};
use crate::{EpicId, ItemKind, ItemStatus, Priority, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilters {
    pub assignees: HashSet<UserId>,
    /// Include items with no assignee when filtering by assignee.
    pub unassigned: bool,
    pub statuses: HashSet<ItemStatus>,
    pub priorities: HashSet<Priority>,
    pub kinds: HashSet<ItemKind>,
    pub epics: HashSet<EpicId>,
}

impl ItemFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any filters are active.
    pub fn has_active_filters(&self) -> bool {
        !self.assignees.is_empty()
            || self.unassigned
            || !self.statuses.is_empty()
            || !self.priorities.is_empty()
            || !self.kinds.is_empty()
            || !self.epics.is_empty()
    }

    pub fn clear(&mut self) {
        self.assignees.clear();
        self.unassigned = false;
        self.statuses.clear();
        self.priorities.clear();
        self.kinds.clear();
        self.epics.clear();
    }

    /// Build the composite filter for the active settings. Empty sets do not
    /// restrict anything.
    pub fn to_filter(&self) -> CompositeFilter {
        let mut filter = CompositeFilter::new();
        if !self.assignees.is_empty() || self.unassigned {
            filter = filter.with_filter(Box::new(AssigneeFilter::new(
                self.assignees.iter().copied(),
                self.unassigned,
            )));
        }
        if !self.statuses.is_empty() {
            filter = filter.with_filter(Box::new(StatusFilter::new(
                self.statuses.iter().copied(),
            )));
        }
        if !self.priorities.is_empty() {
            filter = filter.with_filter(Box::new(PriorityFilter::new(
                self.priorities.iter().copied(),
            )));
        }
        if !self.kinds.is_empty() {
            filter = filter.with_filter(Box::new(KindFilter::new(self.kinds.iter().copied())));
        }
        if !self.epics.is_empty() {
            filter = filter.with_filter(Box::new(EpicFilter::new(self.epics.iter().copied())));
        }
        filter
    }
}
