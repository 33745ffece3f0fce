//! Item filtering implementations.
//!
//! Each filter checks one attribute against a set of accepted values. Filters
//! compose with AND logic through [`CompositeFilter`].

use crate::{EpicId, Item, ItemKind, ItemStatus, Priority, UserId};
use std::collections::HashSet;

/// Trait for filtering items by various criteria.
pub trait ItemFilter {
    /// Returns true if the item matches the filter criteria.
    fn matches(&self, item: &Item) -> bool;
}

/// Filter items by assignee.
///
/// `include_unassigned` also lets through items nobody is assigned to.
pub struct AssigneeFilter {
    assignees: HashSet<UserId>,
    include_unassigned: bool,
}

impl AssigneeFilter {
    pub fn new(assignees: impl IntoIterator<Item = UserId>, include_unassigned: bool) -> Self {
        Self {
            assignees: assignees.into_iter().collect(),
            include_unassigned,
        }
    }
}

impl ItemFilter for AssigneeFilter {
    fn matches(&self, item: &Item) -> bool {
        match item.assignee {
            Some(id) => self.assignees.contains(&id),
            None => self.include_unassigned,
        }
    }
}

/// Filter items by workflow status.
pub struct StatusFilter {
    statuses: HashSet<ItemStatus>,
}

impl StatusFilter {
    pub fn new(statuses: impl IntoIterator<Item = ItemStatus>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
        }
    }
}

impl ItemFilter for StatusFilter {
    fn matches(&self, item: &Item) -> bool {
        self.statuses.contains(&item.status)
    }
}

/// Filter items by priority.
pub struct PriorityFilter {
    priorities: HashSet<Priority>,
}

impl PriorityFilter {
    pub fn new(priorities: impl IntoIterator<Item = Priority>) -> Self {
        Self {
            priorities: priorities.into_iter().collect(),
        }
    }
}

impl ItemFilter for PriorityFilter {
    fn matches(&self, item: &Item) -> bool {
        self.priorities.contains(&item.priority)
    }
}

/// Filter items by work-item type.
pub struct KindFilter {
    kinds: HashSet<ItemKind>,
}

impl KindFilter {
    pub fn new(kinds: impl IntoIterator<Item = ItemKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }
}

impl ItemFilter for KindFilter {
    fn matches(&self, item: &Item) -> bool {
        self.kinds.contains(&item.kind)
    }
}

/// Filter items by epic. Items without an epic never match.
pub struct EpicFilter {
    epics: HashSet<EpicId>,
}

impl EpicFilter {
    pub fn new(epics: impl IntoIterator<Item = EpicId>) -> Self {
        Self {
            epics: epics.into_iter().collect(),
        }
    }
}

impl ItemFilter for EpicFilter {
    fn matches(&self, item: &Item) -> bool {
        item.epic.is_some_and(|id| self.epics.contains(&id))
    }
}

/// Combine multiple filters with AND logic.
///
/// An item matches only if it passes all filters.
pub struct CompositeFilter {
    filters: Vec<Box<dyn ItemFilter>>,
}

impl CompositeFilter {
    /// Create an empty composite filter (matches all items).
    pub fn new() -> Self {
        Self { filters: vec![] }
    }

    /// Add a filter to the composite (builder pattern).
    pub fn with_filter(mut self, filter: Box<dyn ItemFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for CompositeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemFilter for CompositeFilter {
    fn matches(&self, item: &Item) -> bool {
        self.filters.iter().all(|f| f.matches(item))
    }
}
