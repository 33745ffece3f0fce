use crate::session::Session;
use crate::state::{PendingLink, SessionState};
use sprintboard_core::{BoardError, BoardResult};
use sprintboard_domain::commands::{
    ApplyFieldChange, InsertItem, MoveItem, ReconcileItem, RemoveItem,
};
use sprintboard_domain::{
    plan_move, ContainerId, DropTarget, EntityModel, EpicId, FieldChange, Item, ItemFields,
    ItemId, ItemKind, ItemPatch, ItemStatus, MovePlan, Priority, SprintId, UserId,
};
use sprintboard_sync::{NewTask, Transport};

/// What the user filled in to create an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub title: String,
    pub kind: ItemKind,
    pub status: ItemStatus,
    pub priority: Priority,
    pub container: ContainerId,
    pub description: Option<String>,
    pub epic: Option<EpicId>,
}

impl ItemDraft {
    pub fn new(title: impl Into<String>, container: ContainerId) -> Self {
        Self {
            title: title.into(),
            kind: ItemKind::Task,
            status: ItemStatus::ToDo,
            priority: Priority::Medium,
            container,
            description: None,
            epic: None,
        }
    }
}

/// Container for a server record: the sprint it names, or the backlog when
/// that sprint is unknown locally.
fn container_for(model: &EntityModel, sprint: Option<SprintId>) -> ContainerId {
    let container = ContainerId::from(sprint);
    if model.has_container(container) {
        container
    } else {
        ContainerId::Backlog
    }
}

/// Record `child` in the parent's loaded children list.
fn with_child_linked(model: &EntityModel, parent: ItemId, child: ItemId) -> EntityModel {
    match model.item(parent).and_then(|p| p.children.clone()) {
        Some(mut children) => {
            if !children.contains(&child) {
                children.push(child);
            }
            model.with_children(parent, children)
        }
        None => model.clone(),
    }
}

/// Fold a confirmed parent link into the model.
fn record_link(
    state: &mut SessionState,
    child: ItemId,
    parent: ItemId,
    patch: ItemPatch,
) -> BoardResult<()> {
    if let Err(e) = state.execute(&ReconcileItem {
        item_id: child,
        patch,
    }) {
        state.report(&e);
        return Err(e);
    }
    state.model = with_child_linked(&state.model, parent, child);
    Ok(())
}

impl<T: Transport> Session<T> {
    /// Items can only be created by a signed-in project member.
    fn reporter(&self) -> BoardResult<UserId> {
        let user = self.config.current_user.ok_or_else(|| {
            BoardError::Validation("No current user configured".to_string())
        })?;
        let state = self.state.lock();
        if state.model.member(user).is_none() {
            return Err(BoardError::Validation(format!(
                "User {} is not a member of project {}",
                user, self.config.project_id
            )));
        }
        Ok(user)
    }

    /// Move an item between containers, or reorder it within one.
    ///
    /// A stale `source` is ignored. Reordering is local only; a container
    /// change is sent as a sprint edit. If the server refuses it, the item
    /// goes back to its old position in `source` and any reordering done in
    /// the meantime is kept.
    pub async fn move_item(
        &self,
        item_id: ItemId,
        source: ContainerId,
        target: ContainerId,
        drop: Option<DropTarget>,
    ) -> BoardResult<()> {
        let command = MoveItem {
            item_id,
            source,
            target,
            drop,
        };
        let (plan, origin) = {
            let state = self.state.lock();
            let plan = plan_move(&state.model, item_id, source, target, drop);
            let origin = state
                .model
                .item_ids_in(source)
                .and_then(|ids| ids.iter().position(|id| *id == item_id));
            (plan, origin)
        };

        let change = match plan.map_err(|e| self.fail(e))? {
            MovePlan::Unchanged => return Ok(()),
            MovePlan::Reordered(_) => {
                let mut state = self.state.lock();
                if let Err(e) = state.execute(&command) {
                    state.report(&e);
                    return Err(e);
                }
                state.clear_error();
                return Ok(());
            }
            MovePlan::Relocated { change, .. } => change,
        };
        let origin = origin
            .ok_or_else(|| self.fail(BoardError::NotFound(format!("Item {}", item_id))))?;

        let token = self.token();
        self.with_rollback(
            &command,
            self.sync.apply(item_id, &change, &token),
            |model, patch| model.with_item_reconciled(item_id, patch),
            |model, _| model.with_item_returned(item_id, source, origin),
        )
        .await?;
        Ok(())
    }

    /// Edit one field of an item optimistically.
    pub async fn apply_field_update(&self, item_id: ItemId, change: FieldChange) -> BoardResult<()> {
        let location = {
            let state = self.state.lock();
            if state.model.item(item_id).is_none() {
                None
            } else {
                Some(state.model.location_of(item_id).container())
            }
        };
        let location = location
            .ok_or_else(|| self.fail(BoardError::NotFound(format!("Item {}", item_id))))?;

        if let FieldChange::Sprint(sprint) = change {
            let source = location.ok_or_else(|| {
                self.fail(BoardError::Validation(format!(
                    "Item {} is not in any container",
                    item_id
                )))
            })?;
            return self
                .move_item(item_id, source, ContainerId::from(sprint), None)
                .await;
        }

        let command = ApplyFieldChange {
            item_id,
            change: change.clone(),
        };
        let token = self.token();
        self.with_optimism(
            &command,
            self.sync.apply(item_id, &change, &token),
            |model, patch| model.with_item_reconciled(item_id, patch),
        )
        .await?;
        Ok(())
    }

    /// Create an item. Waits for the server before touching the model.
    pub async fn create_item(&self, draft: ItemDraft) -> BoardResult<ItemId> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(self.fail(BoardError::Validation(
                "Title cannot be empty".to_string(),
            )));
        }
        if !self.state.lock().model.has_container(draft.container) {
            return Err(self.fail(BoardError::NotFound(format!(
                "Container {}",
                draft.container
            ))));
        }
        let reporter = self.reporter().map_err(|e| self.fail(e))?;

        let task = NewTask {
            kind: draft.kind,
            status: draft.status,
            priority: draft.priority,
            sprint: draft.container.sprint_id(),
            description: draft.description,
            epic: draft.epic,
            ..NewTask::new(self.config.project_id, title, reporter)
        };
        let token = self.token();
        let (id, fields) = self
            .sync
            .create_task(&task, &token)
            .await
            .map_err(|e| self.fail(e))?;

        self.insert_remote_item(id, fields)?;
        self.succeed();
        tracing::info!("Created item {}", id);
        Ok(id)
    }

    fn insert_remote_item(&self, id: ItemId, fields: ItemFields) -> BoardResult<()> {
        let mut state = self.state.lock();
        let container = container_for(&state.model, fields.sprint);
        let command = InsertItem {
            item: Item::from_fields(id, fields),
            container,
        };
        if let Err(e) = state.execute(&command) {
            state.report(&e);
            return Err(e);
        }
        Ok(())
    }

    /// Delete an item once the server confirms.
    pub async fn delete_item(&self, item_id: ItemId) -> BoardResult<()> {
        if self.state.lock().model.item(item_id).is_none() {
            return Err(self.fail(BoardError::NotFound(format!("Item {}", item_id))));
        }
        let token = self.token();
        self.sync
            .delete_task(item_id, &token)
            .await
            .map_err(|e| self.fail(e))?;

        let mut state = self.state.lock();
        if let Err(e) = state.execute(&RemoveItem { item_id }) {
            state.report(&e);
            return Err(e);
        }
        state.forget_links_of(item_id);
        state.clear_error();
        Ok(())
    }

    /// Create a subtask in two steps: create the item, then link it to its
    /// parent.
    ///
    /// If linking fails the child is kept (it exists remotely) and the link
    /// is remembered for [`Session::adopt_orphans`].
    pub async fn create_subtask(&self, parent: ItemId, title: &str) -> BoardResult<ItemId> {
        let title = title.trim().to_string();
        let container = {
            let state = self.state.lock();
            match state.model.item(parent) {
                None => Err(BoardError::NotFound(format!("Item {}", parent))),
                Some(p) if p.is_subtask() => Err(BoardError::Validation(format!(
                    "Item {} is a subtask and cannot have subtasks",
                    parent
                ))),
                Some(_) if title.is_empty() => {
                    Err(BoardError::Validation("Title cannot be empty".to_string()))
                }
                Some(_) => Ok(state
                    .model
                    .location_of(parent)
                    .container()
                    .unwrap_or(ContainerId::Backlog)),
            }
        }
        .map_err(|e| self.fail(e))?;
        let reporter = self.reporter().map_err(|e| self.fail(e))?;

        let task = NewTask {
            kind: ItemKind::Subtask,
            sprint: container.sprint_id(),
            ..NewTask::new(self.config.project_id, title, reporter)
        };
        let token = self.token();
        let (child, fields) = self
            .sync
            .create_task(&task, &token)
            .await
            .map_err(|e| self.fail(e))?;
        self.insert_remote_item(child, fields)?;

        match self.sync.link_parent(child, parent, &token).await {
            Ok(patch) => {
                let mut state = self.state.lock();
                record_link(&mut state, child, parent, patch)?;
                state.clear_error();
                Ok(child)
            }
            Err(e) => {
                tracing::warn!(
                    "Subtask {} created but not linked to {}: {}",
                    child,
                    parent,
                    e
                );
                let mut state = self.state.lock();
                state.add_pending_link(PendingLink { child, parent });
                state.report(&e);
                Err(e)
            }
        }
    }

    /// Fetch the subtasks of `parent` and record them as its children.
    pub async fn load_subtasks(&self, parent: ItemId) -> BoardResult<Vec<ItemId>> {
        if self.state.lock().model.item(parent).is_none() {
            return Err(self.fail(BoardError::NotFound(format!("Item {}", parent))));
        }
        let token = self.token();
        let records = self
            .sync
            .subtasks(parent, &token)
            .await
            .map_err(|e| self.fail(e))?;

        let mut state = self.state.lock();
        let mut model = state.model.clone();
        let mut children = Vec::with_capacity(records.len());
        for (id, patch) in records {
            children.push(id);
            model = if model.item(id).is_some() {
                model.with_item_reconciled(id, patch)
            } else {
                let fields = patch.into_fields();
                let container = container_for(&model, fields.sprint);
                match model.with_item_inserted(Item::from_fields(id, fields), container, None) {
                    Ok(next) => next,
                    Err(e) => {
                        state.report(&e);
                        return Err(e);
                    }
                }
            };
        }
        state.model = model.with_children(parent, children.clone());
        state.clear_error();
        Ok(children)
    }

    /// Retry parent links that failed earlier. Links whose child or parent
    /// is gone are dropped. Returns how many links were confirmed.
    pub async fn adopt_orphans(&self) -> BoardResult<usize> {
        let links = std::mem::take(&mut self.state.lock().pending_links);
        if links.is_empty() {
            return Ok(0);
        }

        let token = self.token();
        let mut adopted = 0;
        let mut remaining = Vec::new();
        for link in links {
            let present = {
                let state = self.state.lock();
                state.model.item(link.child).is_some() && state.model.item(link.parent).is_some()
            };
            if !present {
                tracing::debug!("Dropping pending link {} -> {}", link.child, link.parent);
                continue;
            }

            match self.sync.link_parent(link.child, link.parent, &token).await {
                Ok(patch) => {
                    let mut state = self.state.lock();
                    if let Err(e) = record_link(&mut state, link.child, link.parent, patch) {
                        tracing::warn!("Adopting subtask {} failed: {}", link.child, e);
                        remaining.push(link);
                        continue;
                    }
                    adopted += 1;
                    tracing::info!("Adopted orphaned subtask {} under {}", link.child, link.parent);
                }
                Err(e) => {
                    tracing::warn!(
                        "Subtask {} still not linked to {}: {}",
                        link.child,
                        link.parent,
                        e
                    );
                    remaining.push(link);
                }
            }
        }

        let mut state = self.state.lock();
        for link in remaining {
            state.add_pending_link(link);
        }
        Ok(adopted)
    }
}
