//! Sprint lifecycle rules.
//!
//! Pure functions encoding the Planned -> Active -> Completed state machine.
//! The async controller in the session crate decides *when* to apply them;
//! these decide *what* the resulting model looks like.

use chrono::{Duration, NaiveDate};
use sprintboard_core::{BoardError, BoardResult};

use crate::container::ContainerId;
use crate::ids::{ItemId, SprintId};
use crate::model::EntityModel;
use crate::sprint::{Sprint, SprintFields, SprintState};

/// Result of computing a sprint start.
#[derive(Debug, Clone, PartialEq)]
pub enum StartTransition {
    /// The sprint is already the active one.
    AlreadyActive,
    Started {
        model: EntityModel,
        /// Sprints that were active before and have been switched off.
        deactivated: Vec<SprintId>,
    },
}

/// Everything needed to finish a sprint, computed before any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPlan {
    pub sprint_id: SprintId,
    pub destination: ContainerId,
    /// Members whose status is Done; they stay in the sprint.
    pub completed: Vec<ItemId>,
    /// Everything else; moved to `destination`.
    pub open: Vec<ItemId>,
}

/// Dates a sprint runs with once started: its own, or today and
/// today + `duration_days` when unset.
pub fn scheduled_dates(
    sprint: &Sprint,
    today: NaiveDate,
    duration_days: u32,
) -> BoardResult<(NaiveDate, NaiveDate)> {
    let start = sprint.start_date.unwrap_or(today);
    let end = match sprint.end_date {
        Some(end) => end,
        None => start
            .checked_add_signed(Duration::days(i64::from(duration_days)))
            .ok_or_else(|| {
                BoardError::Validation(format!(
                    "Sprint '{}' cannot end {} days after {}",
                    sprint.name, duration_days, start
                ))
            })?,
    };
    Ok((start, end))
}

/// Compute the model after making `sprint_id` the single active sprint.
pub fn start_transition(model: &EntityModel, sprint_id: SprintId) -> BoardResult<StartTransition> {
    let sprint = model
        .sprint(sprint_id)
        .ok_or_else(|| BoardError::NotFound(format!("Sprint {}", sprint_id)))?;

    match sprint.state() {
        SprintState::Active => return Ok(StartTransition::AlreadyActive),
        SprintState::Completed => {
            return Err(BoardError::Validation(format!(
                "Sprint '{}' is completed and cannot be started",
                sprint.name
            )))
        }
        SprintState::Planned => {}
    }

    let mut next = model.clone();
    let mut deactivated = Vec::new();
    for other in next.sprints_mut() {
        if other.id == sprint_id {
            other.is_active = true;
        } else if other.is_active {
            other.is_active = false;
            deactivated.push(other.id);
        }
    }

    Ok(StartTransition::Started {
        model: next,
        deactivated,
    })
}

/// Split a sprint's members into (completed, open), keeping display order.
pub fn partition_members(model: &EntityModel, sprint_id: SprintId) -> (Vec<ItemId>, Vec<ItemId>) {
    let Some(sprint) = model.sprint(sprint_id) else {
        return (Vec::new(), Vec::new());
    };
    sprint
        .item_ids
        .iter()
        .copied()
        .partition(|id| model.item(*id).is_some_and(|item| item.is_done()))
}

/// Check that open issues may be sent to `destination` when `sprint_id` ends.
///
/// Valid destinations are the backlog or another sprint that is neither
/// active nor completed.
pub fn validate_destination(
    model: &EntityModel,
    sprint_id: SprintId,
    destination: ContainerId,
) -> BoardResult<()> {
    let ContainerId::Sprint(target_id) = destination else {
        return Ok(());
    };
    if target_id == sprint_id {
        return Err(BoardError::Validation(
            "Open items cannot be moved into the sprint being completed".to_string(),
        ));
    }
    let target = model
        .sprint(target_id)
        .ok_or_else(|| BoardError::NotFound(format!("Sprint {}", target_id)))?;
    match target.state() {
        SprintState::Planned => Ok(()),
        SprintState::Active => Err(BoardError::Validation(format!(
            "Sprint '{}' is active and cannot receive open items",
            target.name
        ))),
        SprintState::Completed => Err(BoardError::Validation(format!(
            "Sprint '{}' is completed and cannot receive open items",
            target.name
        ))),
    }
}

/// Validate a completion request and work out which items move.
pub fn plan_completion(
    model: &EntityModel,
    sprint_id: SprintId,
    destination: ContainerId,
) -> BoardResult<CompletionPlan> {
    let sprint = model
        .sprint(sprint_id)
        .ok_or_else(|| BoardError::NotFound(format!("Sprint {}", sprint_id)))?;
    if sprint.state() != SprintState::Active {
        return Err(BoardError::Validation(format!(
            "Sprint '{}' is not active",
            sprint.name
        )));
    }
    validate_destination(model, sprint_id, destination)?;

    let (completed, open) = partition_members(model, sprint_id);
    Ok(CompletionPlan {
        sprint_id,
        destination,
        completed,
        open,
    })
}

/// Apply a confirmed completion: migrate open items, then take the server's
/// view of the sprint's flags and attributes.
pub fn apply_completion(
    model: &EntityModel,
    plan: &CompletionPlan,
    fields: SprintFields,
) -> EntityModel {
    let mut next = model.clone();
    for item_id in &plan.open {
        if let Some(ids) = next.container_ids_mut(ContainerId::Sprint(plan.sprint_id)) {
            ids.retain(|id| id != item_id);
        }
        if next.location_of(*item_id).container().is_none() {
            next.attach(*item_id, plan.destination, None);
        }
    }
    next.with_sprint_fields(plan.sprint_id, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Item, ItemStatus, ProjectId, Sprint, UserId};

    const A: SprintId = SprintId(1);
    const B: SprintId = SprintId(2);
    const NEXT: SprintId = SprintId(3);

    fn item(id: u64, status: ItemStatus) -> Item {
        let mut item = Item::new(ItemId(id), format!("Item {}", id), UserId(1));
        item.status = status;
        item
    }

    fn ended_fields(name: &str) -> SprintFields {
        SprintFields {
            name: name.to_string(),
            goal: String::new(),
            start_date: None,
            end_date: None,
            is_active: false,
            is_ended: true,
            epic: None,
        }
    }

    /// Sprint A (active) holds [10 Done, 11 To Do, 12 In Review]; B and NEXT are planned.
    fn model() -> EntityModel {
        let mut a = Sprint::new(A, "Sprint A");
        a.is_active = true;
        EntityModel::from_records(
            ProjectId(1),
            "Backlog",
            vec![a, Sprint::new(B, "Sprint B"), Sprint::new(NEXT, "Next")],
            vec![
                (item(10, ItemStatus::Done), Some(A)),
                (item(11, ItemStatus::ToDo), Some(A)),
                (item(12, ItemStatus::InReview), Some(A)),
                (item(20, ItemStatus::ToDo), None),
            ],
            vec![],
            vec![],
        )
    }

    fn ids(model: &EntityModel, container: ContainerId) -> Vec<u64> {
        model
            .item_ids_in(container)
            .unwrap()
            .iter()
            .map(|id| id.0)
            .collect()
    }

    // --- start ---

    #[test]
    fn start_deactivates_previous_sprint() {
        let model = model();
        let StartTransition::Started { model: next, deactivated } =
            start_transition(&model, B).unwrap()
        else {
            panic!("expected start");
        };

        assert_eq!(deactivated, vec![A]);
        assert_eq!(next.active_sprint().map(|s| s.id), Some(B));
        assert_eq!(next.active_sprint_count(), 1);
    }

    #[test]
    fn start_active_sprint_is_a_no_op() {
        assert_eq!(
            start_transition(&model(), A).unwrap(),
            StartTransition::AlreadyActive
        );
    }

    #[test]
    fn start_completed_sprint_is_rejected() {
        let model = model().with_sprint_fields(B, ended_fields("Sprint B"));
        assert!(matches!(
            start_transition(&model, B),
            Err(BoardError::Validation(_))
        ));
        assert!(matches!(
            start_transition(&model, SprintId(99)),
            Err(BoardError::NotFound(_))
        ));
    }

    // --- complete ---

    #[test]
    fn partition_keeps_order() {
        let (completed, open) = partition_members(&model(), A);
        assert_eq!(completed, vec![ItemId(10)]);
        assert_eq!(open, vec![ItemId(11), ItemId(12)]);
    }

    #[test]
    fn completion_moves_open_items_to_backlog() {
        let model = model();
        let plan = plan_completion(&model, A, ContainerId::Backlog).unwrap();
        let next = apply_completion(&model, &plan, ended_fields("Sprint A"));

        assert_eq!(ids(&next, ContainerId::Sprint(A)), vec![10]);
        assert_eq!(ids(&next, ContainerId::Backlog), vec![20, 11, 12]);
        let sprint = next.sprint(A).unwrap();
        assert!(sprint.is_ended);
        assert!(!sprint.is_active);
        assert!(next.check_exclusivity());
    }

    #[test]
    fn completion_moves_open_items_to_planned_sprint() {
        let model = model();
        let plan = plan_completion(&model, A, ContainerId::Sprint(NEXT)).unwrap();
        let next = apply_completion(&model, &plan, ended_fields("Sprint A"));

        assert_eq!(ids(&next, ContainerId::Sprint(NEXT)), vec![11, 12]);
        assert!(next.check_exclusivity());
    }

    #[test]
    fn completion_rejects_bad_destinations() {
        let model = model();
        assert!(matches!(
            plan_completion(&model, A, ContainerId::Sprint(A)),
            Err(BoardError::Validation(_))
        ));

        let ended = model.with_sprint_fields(B, ended_fields("Sprint B"));
        assert!(matches!(
            plan_completion(&ended, A, ContainerId::Sprint(B)),
            Err(BoardError::Validation(_))
        ));

        assert!(matches!(
            plan_completion(&model, B, ContainerId::Backlog),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn destination_cannot_be_active_sprint() {
        let StartTransition::Started { model, .. } = start_transition(&model(), B).unwrap() else {
            panic!("expected start");
        };
        assert!(matches!(
            validate_destination(&model, A, ContainerId::Sprint(B)),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn test_scheduled_dates_fill_missing() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut sprint = Sprint::new(SprintId(1), "S");
        assert_eq!(
            scheduled_dates(&sprint, today, 14).unwrap(),
            (today, NaiveDate::from_ymd_opt(2026, 3, 16).unwrap())
        );

        sprint.start_date = NaiveDate::from_ymd_opt(2026, 3, 9);
        sprint.end_date = NaiveDate::from_ymd_opt(2026, 3, 13);
        assert_eq!(
            scheduled_dates(&sprint, today, 14).unwrap(),
            (
                NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 13).unwrap()
            )
        );
    }

    #[test]
    fn test_scheduled_dates_overflow_is_rejected() {
        let mut sprint = Sprint::new(SprintId(1), "Far future");
        sprint.start_date = Some(NaiveDate::MAX);
        assert!(matches!(
            scheduled_dates(&sprint, NaiveDate::MAX, 14),
            Err(BoardError::Validation(_))
        ));
    }
}
