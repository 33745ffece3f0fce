//! Moving items between containers (backlog and sprints).
//!
//! Pure: `plan_move` reads a model and returns the model that should replace
//! it, together with the remote edit the move implies, if any.

use sprintboard_core::{BoardError, BoardResult};

use crate::container::ContainerId;
use crate::field_change::FieldChange;
use crate::ids::ItemId;
use crate::model::EntityModel;

/// Where in the target container a dropped item should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// After the last member.
    End,
    /// Index in the target's canonical order, counted after the moved item
    /// has been taken out. Clamped to the list length.
    Index(usize),
    /// In front of an existing member. Falls back to the end if that item is
    /// not in the target container.
    OnItem(ItemId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MovePlan {
    /// Stale drag state, or a same-container drop with nothing to reorder.
    Unchanged,
    /// Reordered inside one container. Order has no remote representation.
    Reordered(EntityModel),
    /// Moved to another container; `change` must be sent to the remote API.
    Relocated {
        model: EntityModel,
        change: FieldChange,
    },
}

impl MovePlan {
    pub fn model(&self) -> Option<&EntityModel> {
        match self {
            Self::Unchanged => None,
            Self::Reordered(model) | Self::Relocated { model, .. } => Some(model),
        }
    }
}

/// Compute the result of moving `item_id` from `source` to `target`.
///
/// `drop` is `None` when the drop did not resolve to an explicit position:
/// the item goes to the end of another container, or nothing happens if the
/// container is unchanged.
pub fn plan_move(
    model: &EntityModel,
    item_id: ItemId,
    source: ContainerId,
    target: ContainerId,
    drop: Option<DropTarget>,
) -> BoardResult<MovePlan> {
    let current = model.location_of(item_id).container();
    if current != Some(source) {
        tracing::debug!(
            "Ignoring stale move of item {}: expected {}, found {:?}",
            item_id,
            source,
            current
        );
        return Ok(MovePlan::Unchanged);
    }

    let Some(target_ids) = model.item_ids_in(target) else {
        return Err(BoardError::NotFound(format!("Container {}", target)));
    };

    if let ContainerId::Sprint(sprint_id) = target {
        let ended = model.sprint(sprint_id).is_some_and(|s| s.is_ended);
        let open = model.item(item_id).is_some_and(|i| !i.is_done());
        if ended && open && source != target {
            return Err(BoardError::Validation(format!(
                "Sprint {} is completed and cannot take open items",
                sprint_id
            )));
        }
    }

    let same_container = source == target;
    let drop = match (drop, same_container) {
        (None, true) => return Ok(MovePlan::Unchanged),
        (Some(DropTarget::OnItem(on)), true) if on == item_id => return Ok(MovePlan::Unchanged),
        (None, false) => DropTarget::End,
        (Some(drop), _) => drop,
    };

    let original_index = target_ids.iter().position(|id| *id == item_id);

    let mut next = model.clone();
    next.detach(item_id);

    let index = {
        let ids = next
            .item_ids_in(target)
            .ok_or_else(|| BoardError::NotFound(format!("Container {}", target)))?;
        match drop {
            DropTarget::End => ids.len(),
            DropTarget::Index(i) => i.min(ids.len()),
            DropTarget::OnItem(on) => ids.iter().position(|id| *id == on).unwrap_or(ids.len()),
        }
    };
    next.attach(item_id, target, Some(index));

    if same_container {
        if original_index == Some(index) {
            return Ok(MovePlan::Unchanged);
        }
        return Ok(MovePlan::Reordered(next));
    }

    Ok(MovePlan::Relocated {
        model: next,
        change: FieldChange::Sprint(target.sprint_id()),
    })
}
