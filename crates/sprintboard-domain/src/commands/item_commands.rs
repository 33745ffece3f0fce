use super::Command;
use crate::mutation::{plan_move, DropTarget, MovePlan};
use crate::{ContainerId, EntityModel, FieldChange, Item, ItemId, ItemPatch};
use sprintboard_core::{BoardError, BoardResult};

/// Apply a single-field edit to an item
pub struct ApplyFieldChange {
    pub item_id: ItemId,
    pub change: FieldChange,
}

impl Command for ApplyFieldChange {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        self.change.validate()?;
        let item = model
            .item(self.item_id)
            .ok_or_else(|| BoardError::NotFound(format!("Item {}", self.item_id)))?;

        if let FieldChange::Sprint(sprint_id) = self.change {
            let source = model.location_of(self.item_id).container().ok_or_else(|| {
                BoardError::Validation(format!("Item {} is not in any container", self.item_id))
            })?;
            let target = ContainerId::from(sprint_id);
            return match plan_move(model, self.item_id, source, target, None)? {
                MovePlan::Unchanged => Ok(model.clone()),
                MovePlan::Reordered(next) | MovePlan::Relocated { model: next, .. } => Ok(next),
            };
        }

        let mut updated = item.clone();
        self.change.apply_to(&mut updated);
        model.with_item_replaced(updated)
    }

    fn description(&self) -> String {
        format!(
            "Set {} of item {}",
            self.change.field_name(),
            self.item_id
        )
    }
}

/// Move an item between (or within) containers
pub struct MoveItem {
    pub item_id: ItemId,
    pub source: ContainerId,
    pub target: ContainerId,
    pub drop: Option<DropTarget>,
}

impl Command for MoveItem {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        let plan = plan_move(model, self.item_id, self.source, self.target, self.drop)?;
        Ok(plan.model().cloned().unwrap_or_else(|| model.clone()))
    }

    fn description(&self) -> String {
        format!(
            "Move item {} from {} to {}",
            self.item_id, self.source, self.target
        )
    }
}

/// Insert a server-created item and attach it to a container
pub struct InsertItem {
    pub item: Item,
    pub container: ContainerId,
}

impl Command for InsertItem {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        model.with_item_inserted(self.item.clone(), self.container, None)
    }

    fn description(&self) -> String {
        format!("Insert item {} into {}", self.item.id, self.container)
    }
}

/// Remove an item (and its subtasks) from the model and every container
pub struct RemoveItem {
    pub item_id: ItemId,
}

impl Command for RemoveItem {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        Ok(model.without_item(self.item_id))
    }

    fn description(&self) -> String {
        format!("Remove item {}", self.item_id)
    }
}

/// Merge server-returned fields into an item
pub struct ReconcileItem {
    pub item_id: ItemId,
    pub patch: ItemPatch,
}

impl Command for ReconcileItem {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        Ok(model.with_item_reconciled(self.item_id, self.patch.clone()))
    }

    fn description(&self) -> String {
        format!("Reconcile item {}", self.item_id)
    }
}
