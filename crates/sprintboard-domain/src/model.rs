//! The normalized, session-wide entity model.
//!
//! `EntityModel` is the single owner of item, sprint and backlog state. It is
//! built on persistent collections, so cloning it is cheap and a clone is a
//! full snapshot: rollback is just keeping the previous value around.
//!
//! Every public mutator takes `&self` and returns a new model. The model keeps
//! one invariant that all of them preserve: each item id appears in exactly
//! one container (the backlog or a single sprint).

use im::{HashMap, Vector};
use serde::{Deserialize, Serialize};
use sprintboard_core::{BoardError, BoardResult};

use crate::backlog::Backlog;
use crate::container::{ContainerId, Location};
use crate::ids::{ItemId, ProjectId, SprintId};
use crate::item::{Item, ItemPatch};
use crate::project::{Epic, User};
use crate::sprint::{Sprint, SprintFields};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EntityModel {
    project_id: Option<ProjectId>,
    items: HashMap<ItemId, Item>,
    sprints: Vector<Sprint>,
    backlog: Backlog,
    #[serde(default)]
    members: Vector<User>,
    #[serde(default)]
    epics: Vector<Epic>,
}

impl EntityModel {
    /// Create an empty model for a project.
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    /// Assemble a model from a freshly loaded project.
    ///
    /// Each record carries the sprint the server reports for the item; items
    /// whose sprint is unknown land in the backlog. Container order follows
    /// record order.
    pub fn from_records(
        project_id: ProjectId,
        backlog_name: impl Into<String>,
        sprints: Vec<Sprint>,
        records: Vec<(Item, Option<SprintId>)>,
        members: Vec<User>,
        epics: Vec<Epic>,
    ) -> Self {
        let mut model = Self {
            project_id: Some(project_id),
            items: HashMap::new(),
            sprints: sprints
                .into_iter()
                .map(|mut sprint| {
                    sprint.item_ids = Vector::new();
                    sprint
                })
                .collect(),
            backlog: Backlog::new(backlog_name),
            members: members.into_iter().collect(),
            epics: epics.into_iter().collect(),
        };

        for (item, sprint_id) in records {
            let id = item.id;
            if model.items.contains_key(&id) {
                tracing::warn!("Duplicate item {} in project load, keeping first", id);
                continue;
            }
            let container = model.resolve_container(sprint_id.into());
            model.items.insert(id, item);
            model.attach(id, container, None);
        }

        model
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    pub fn items(&self) -> &HashMap<ItemId, Item> {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn sprints(&self) -> &Vector<Sprint> {
        &self.sprints
    }

    pub fn sprint(&self, id: SprintId) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == id)
    }

    pub fn backlog(&self) -> &Backlog {
        &self.backlog
    }

    pub fn members(&self) -> &Vector<User> {
        &self.members
    }

    pub fn member(&self, id: crate::UserId) -> Option<&User> {
        self.members.iter().find(|u| u.id == id)
    }

    pub fn epics(&self) -> &Vector<Epic> {
        &self.epics
    }

    pub fn active_sprint(&self) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.is_active)
    }

    pub fn active_sprint_count(&self) -> usize {
        self.sprints.iter().filter(|s| s.is_active).count()
    }

    pub fn has_container(&self, container: ContainerId) -> bool {
        match container {
            ContainerId::Backlog => true,
            ContainerId::Sprint(id) => self.sprint(id).is_some(),
        }
    }

    /// Ordered member ids of a container, or `None` for an unknown sprint.
    pub fn item_ids_in(&self, container: ContainerId) -> Option<&Vector<ItemId>> {
        match container {
            ContainerId::Backlog => Some(&self.backlog.item_ids),
            ContainerId::Sprint(id) => self.sprint(id).map(|s| &s.item_ids),
        }
    }

    /// Ordered member items of a container.
    pub fn items_in(&self, container: ContainerId) -> Vec<&Item> {
        self.item_ids_in(container)
            .map(|ids| ids.iter().filter_map(|id| self.items.get(id)).collect())
            .unwrap_or_default()
    }

    /// Find the container holding an item. Sprints are searched before the backlog.
    pub fn location_of(&self, item_id: ItemId) -> Location {
        if let Some(sprint) = self.sprints.iter().find(|s| s.contains(item_id)) {
            return Location::Sprint {
                id: sprint.id,
                name: sprint.name.clone(),
            };
        }
        if self.backlog.contains(item_id) {
            return Location::Backlog;
        }
        Location::Unknown
    }

    /// Item ids breaking the membership invariant: present in zero or several
    /// containers, or referenced by a container without an item record.
    pub fn exclusivity_violations(&self) -> Vec<ItemId> {
        let mut counts: std::collections::HashMap<ItemId, usize> =
            self.items.keys().map(|id| (*id, 0)).collect();
        let mut violations = Vec::new();

        let memberships = self
            .backlog
            .item_ids
            .iter()
            .chain(self.sprints.iter().flat_map(|s| s.item_ids.iter()));
        for id in memberships {
            match counts.get_mut(id) {
                Some(count) => *count += 1,
                None => violations.push(*id),
            }
        }

        violations.extend(
            counts
                .into_iter()
                .filter(|(_, count)| *count != 1)
                .map(|(id, _)| id),
        );
        violations.sort();
        violations.dedup();
        violations
    }

    pub fn check_exclusivity(&self) -> bool {
        self.exclusivity_violations().is_empty()
    }

    // ------------------------------------------------------------------
    // Pure mutators
    // ------------------------------------------------------------------

    /// Insert a new item and attach it to a container in one step.
    pub fn with_item_inserted(
        &self,
        item: Item,
        container: ContainerId,
        index: Option<usize>,
    ) -> BoardResult<Self> {
        if self.items.contains_key(&item.id) {
            return Err(BoardError::Validation(format!(
                "Item {} already exists",
                item.id
            )));
        }
        if !self.has_container(container) {
            return Err(BoardError::NotFound(format!("Container {}", container)));
        }

        let mut next = self.clone();
        let id = item.id;
        if let Some(parent_id) = item.parent {
            if let Some(parent) = next.items.get_mut(&parent_id) {
                if let Some(children) = parent.children.as_mut() {
                    if !children.contains(&id) {
                        children.push(id);
                    }
                }
            }
        }
        next.items.insert(id, item);
        next.attach(id, container, index);
        Ok(next)
    }

    /// Remove an item, its subtasks, and every membership entry pointing at them.
    pub fn without_item(&self, item_id: ItemId) -> Self {
        let mut next = self.clone();
        let Some(item) = next.items.remove(&item_id) else {
            return next;
        };

        let mut removed = vec![item_id];
        let child_ids: Vec<ItemId> = next
            .items
            .values()
            .filter(|candidate| candidate.parent == Some(item_id))
            .map(|candidate| candidate.id)
            .collect();
        for child in child_ids {
            next.items.remove(&child);
            removed.push(child);
        }

        if let Some(parent_id) = item.parent {
            if let Some(parent) = next.items.get_mut(&parent_id) {
                if let Some(children) = parent.children.as_mut() {
                    children.retain(|c| *c != item_id);
                }
            }
        }

        for id in removed {
            next.detach(id);
        }
        next
    }

    /// Replace an item record wholesale, keeping its membership.
    pub fn with_item_replaced(&self, item: Item) -> BoardResult<Self> {
        if !self.items.contains_key(&item.id) {
            return Err(BoardError::NotFound(format!("Item {}", item.id)));
        }
        let mut next = self.clone();
        next.items.insert(item.id, item);
        Ok(next)
    }

    /// Merge server-returned fields into an item.
    ///
    /// Only keys present in `patch` are taken. When the patch names a sprint
    /// other than the one holding the item, the item moves to the end of the
    /// server's container; without a sprint key membership is left alone.
    /// A response for an item that is gone locally is dropped.
    pub fn with_item_reconciled(&self, item_id: ItemId, patch: ItemPatch) -> Self {
        if !self.items.contains_key(&item_id) {
            tracing::debug!("Dropping reconciliation for removed item {}", item_id);
            return self.clone();
        }

        let mut next = self.clone();
        let remote_container = patch.sprint.map(|s| next.resolve_container(s.into()));
        if let Some(item) = next.items.get_mut(&item_id) {
            item.merge_remote(patch);
        }

        if let Some(container) = remote_container {
            if next.location_of(item_id).container() != Some(container) {
                next.detach(item_id);
                next.attach(item_id, container, None);
            }
        }
        next
    }

    /// Put an item back into `container` at `index`, taking it out of
    /// wherever it is now. Every other member keeps its current order.
    pub fn with_item_returned(&self, item_id: ItemId, container: ContainerId, index: usize) -> Self {
        if !self.items.contains_key(&item_id) {
            return self.clone();
        }
        let mut next = self.clone();
        let container = next.resolve_container(container);
        next.detach(item_id);
        next.attach(item_id, container, Some(index));
        next
    }

    /// Add a sprint, or replace an existing one's attributes (membership kept).
    pub fn with_sprint(&self, sprint: Sprint) -> Self {
        let mut next = self.clone();
        match next.sprints.iter().position(|s| s.id == sprint.id) {
            Some(idx) => {
                let members = next.sprints[idx].item_ids.clone();
                let mut replaced = sprint;
                replaced.item_ids = members;
                next.sprints.set(idx, replaced);
            }
            None => {
                let mut added = sprint;
                added.item_ids = Vector::new();
                next.sprints.push_back(added);
            }
        }
        next
    }

    pub fn with_sprint_fields(&self, sprint_id: SprintId, fields: SprintFields) -> Self {
        let mut next = self.clone();
        if let Some(sprint) = next.sprint_mut(sprint_id) {
            sprint.apply_remote(fields);
        }
        next
    }

    /// Remove a sprint and append its members to the backlog.
    pub fn without_sprint(&self, sprint_id: SprintId) -> Self {
        let mut next = self.clone();
        if let Some(idx) = next.sprints.iter().position(|s| s.id == sprint_id) {
            let sprint = next.sprints.remove(idx);
            next.backlog.item_ids.append(sprint.item_ids);
        }
        next
    }

    pub fn with_backlog_name(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.backlog.rename(name);
        next
    }

    /// Record a parent's loaded subtask list.
    pub fn with_children(&self, parent_id: ItemId, children: Vec<ItemId>) -> Self {
        let mut next = self.clone();
        if let Some(parent) = next.items.get_mut(&parent_id) {
            parent.children = Some(children);
        }
        next
    }

    // ------------------------------------------------------------------
    // In-place helpers for commands operating on a private clone
    // ------------------------------------------------------------------

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub(crate) fn sprint_mut(&mut self, id: SprintId) -> Option<&mut Sprint> {
        self.sprints.iter_mut().find(|s| s.id == id)
    }

    pub(crate) fn sprints_mut(&mut self) -> impl Iterator<Item = &mut Sprint> {
        self.sprints.iter_mut()
    }

    pub(crate) fn backlog_mut(&mut self) -> &mut Backlog {
        &mut self.backlog
    }

    pub(crate) fn container_ids_mut(&mut self, container: ContainerId) -> Option<&mut Vector<ItemId>> {
        match container {
            ContainerId::Backlog => Some(&mut self.backlog.item_ids),
            ContainerId::Sprint(id) => self.sprint_mut(id).map(|s| &mut s.item_ids),
        }
    }

    /// Remove an item id from every container. Returns where it was.
    pub(crate) fn detach(&mut self, item_id: ItemId) -> Option<(ContainerId, usize)> {
        let mut found = None;
        for sprint in self.sprints.iter_mut() {
            if let Some(idx) = sprint.item_ids.iter().position(|id| *id == item_id) {
                sprint.item_ids.remove(idx);
                found = found.or(Some((ContainerId::Sprint(sprint.id), idx)));
            }
        }
        if let Some(idx) = self.backlog.item_ids.iter().position(|id| *id == item_id) {
            self.backlog.item_ids.remove(idx);
            found = found.or(Some((ContainerId::Backlog, idx)));
        }
        found
    }

    /// Insert an item id into a container at `index` (clamped), or at the end.
    pub(crate) fn attach(&mut self, item_id: ItemId, container: ContainerId, index: Option<usize>) {
        if let Some(ids) = self.container_ids_mut(container) {
            let at = index.map_or(ids.len(), |i| i.min(ids.len()));
            ids.insert(at, item_id);
        }
    }

    /// Map a container reference to one that exists, defaulting to the backlog.
    fn resolve_container(&self, container: ContainerId) -> ContainerId {
        if self.has_container(container) {
            container
        } else {
            tracing::warn!("Unknown container {}, using backlog", container);
            ContainerId::Backlog
        }
    }
}
