#![allow(dead_code)]

use serde_json::{json, Value};
use sprintboard_core::BoardError;
use sprintboard_domain::{
    ContainerId, EntityModel, Item, ItemId, ItemStatus, ProjectId, Sprint, SprintId, User, UserId,
};
use sprintboard_session::{Session, SessionConfig};
use sprintboard_sync::{RemoteSync, RetryPolicy, Transport};

pub const ACTIVE: SprintId = SprintId(10);
pub const NEXT: SprintId = SprintId(11);
pub const ENDED: SprintId = SprintId(12);

pub fn item(id: u64, title: &str, status: ItemStatus) -> Item {
    let mut item = Item::new(ItemId(id), title, UserId(1));
    item.status = status;
    item
}

/// Sprint 10 (active): A(Done), B(To Do), C(In Review)
/// Sprint 11 (planned): P, Q
/// Sprint 12 (completed): empty
/// Backlog: X, Y, Z
pub fn fixture() -> EntityModel {
    let mut active = Sprint::new(ACTIVE, "Sprint 10");
    active.is_active = true;
    let mut ended = Sprint::new(ENDED, "Sprint 12");
    ended.is_ended = true;

    let records = vec![
        (item(1, "A", ItemStatus::Done), Some(ACTIVE)),
        (item(2, "B", ItemStatus::ToDo), Some(ACTIVE)),
        (item(3, "C", ItemStatus::InReview), Some(ACTIVE)),
        (item(7, "P", ItemStatus::ToDo), Some(NEXT)),
        (item(8, "Q", ItemStatus::ToDo), Some(NEXT)),
        (item(4, "X", ItemStatus::ToDo), None),
        (item(5, "Y", ItemStatus::ToDo), None),
        (item(6, "Z", ItemStatus::ToDo), None),
    ];
    EntityModel::from_records(
        ProjectId(1),
        "Backlog",
        vec![active, Sprint::new(NEXT, "Sprint 11"), ended],
        records,
        vec![User {
            id: UserId(1),
            username: "ana".to_string(),
            display_name: None,
        }],
        vec![],
    )
}

pub fn config() -> SessionConfig {
    SessionConfig::new(ProjectId(1)).with_current_user(UserId(1))
}

pub fn session_with<T: Transport>(transport: T) -> Session<T> {
    Session::from_model(RemoteSync::new(transport, RetryPolicy::none()), config(), fixture())
}

pub fn ids(model: &EntityModel, container: ContainerId) -> Vec<u64> {
    model
        .item_ids_in(container)
        .unwrap()
        .iter()
        .map(|id| id.get())
        .collect()
}

pub fn rejection(status: u16) -> BoardError {
    BoardError::RemoteRejection {
        status,
        message: "rejected".to_string(),
    }
}

pub fn task_json(id: u64, title: &str) -> Value {
    json!({ "id": id, "title": title, "reporter": 1 })
}
