mod common;

use common::*;
use serde_json::{json, Value};
use sprintboard_core::BoardError;
use sprintboard_domain::{ContainerId, ItemId, ItemStatus, SprintState, SprintUpdate};
use sprintboard_session::SprintDraft;
use sprintboard_sync::MockTransport;

#[tokio::test]
async fn test_start_keeps_single_active_sprint() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|r| r.path == "sprints/11/activate/")
        .times(1)
        .returning(|_| Ok(Value::Null));
    let session = session_with(mock);

    session.start_sprint(NEXT).await.unwrap();

    let model = session.model();
    assert_eq!(model.active_sprint_count(), 1);
    assert_eq!(model.active_sprint().unwrap().id, NEXT);
    assert_eq!(model.sprint(ACTIVE).unwrap().state(), SprintState::Planned);
    let next = model.sprint(NEXT).unwrap();
    assert!(next.start_date.is_some());
    assert!(next.end_date > next.start_date);
}

#[tokio::test]
async fn test_refused_start_restores_previous_active_sprint() {
    let mut mock = MockTransport::new();
    mock.expect_send().times(1).returning(|_| Err(rejection(409)));
    let session = session_with(mock);
    let before = session.model();

    assert!(session.start_sprint(NEXT).await.is_err());

    let model = session.model();
    assert_eq!(model, before);
    assert_eq!(model.active_sprint().unwrap().id, ACTIVE);
}

#[tokio::test]
async fn test_start_rules() {
    let mut mock = MockTransport::new();
    mock.expect_send().times(0);
    let session = session_with(mock);

    // Already active: nothing to do
    session.start_sprint(ACTIVE).await.unwrap();

    let result = session.start_sprint(ENDED).await;
    assert!(matches!(result, Err(BoardError::Validation(_))));
    assert_eq!(session.model().active_sprint().unwrap().id, ACTIVE);
}

#[tokio::test]
async fn test_completion_moves_only_open_items() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|r| {
            (r.path == "tasks/2/" || r.path == "tasks/3/")
                && r.body == Some(json!({ "sprint": null }))
        })
        .times(2)
        .returning(|_| Ok(Value::Null));
    mock.expect_send()
        .withf(|r| r.path == "sprints/10/end/")
        .times(1)
        .returning(|_| {
            Ok(json!({"id": 10, "name": "Sprint 10", "is_active": false, "is_ended": true}))
        });
    let session = session_with(mock);

    let report = session
        .complete_sprint(ACTIVE, ContainerId::Backlog)
        .await
        .unwrap();

    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.moved.len(), 2);
    assert!(report.failed.is_empty());

    let model = session.model();
    assert_eq!(ids(&model, ContainerId::Sprint(ACTIVE)), vec![1]);
    assert_eq!(ids(&model, ContainerId::Backlog), vec![4, 5, 6, 2, 3]);
    assert!(model.sprint(ACTIVE).unwrap().is_ended);
    assert_eq!(model.active_sprint_count(), 0);
    assert!(model.check_exclusivity());
    assert!(session.error().is_none());
}

#[tokio::test]
async fn test_completion_into_planned_sprint() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|r| r.body == Some(json!({ "sprint": 11 })))
        .times(2)
        .returning(|_| Ok(Value::Null));
    mock.expect_send()
        .withf(|r| r.path == "sprints/10/end/")
        .returning(|_| Ok(json!({})));
    let session = session_with(mock);

    session
        .complete_sprint(ACTIVE, ContainerId::Sprint(NEXT))
        .await
        .unwrap();

    let model = session.model();
    assert_eq!(ids(&model, ContainerId::Sprint(NEXT)), vec![7, 8, 2, 3]);
    assert_eq!(model.sprint(ACTIVE).unwrap().state(), SprintState::Completed);
}

#[tokio::test]
async fn test_partial_completion_is_reported() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|r| r.path == "tasks/2/")
        .returning(|_| Err(rejection(400)));
    mock.expect_send()
        .withf(|r| r.path == "tasks/3/")
        .returning(|_| Ok(Value::Null));
    mock.expect_send()
        .withf(|r| r.path == "sprints/10/end/")
        .times(1)
        .returning(|_| Ok(Value::Null));
    let session = session_with(mock);

    let result = session.complete_sprint(ACTIVE, ContainerId::Backlog).await;

    assert!(matches!(
        result,
        Err(BoardError::PartialBulkFailure {
            failed: 1,
            attempted: 2
        })
    ));
    let model = session.model();
    assert!(model.sprint(ACTIVE).unwrap().is_ended);
    assert_eq!(ids(&model, ContainerId::Sprint(ACTIVE)), vec![1]);
    assert_eq!(
        session.error_message().as_deref(),
        Some("1 of 2 operations failed")
    );
}

#[tokio::test]
async fn test_refused_completion_changes_nothing() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|r| r.path.starts_with("tasks/"))
        .returning(|_| Ok(Value::Null));
    mock.expect_send()
        .withf(|r| r.path == "sprints/10/end/")
        .returning(|_| Err(rejection(400)));
    let session = session_with(mock);
    let before = session.model();

    let result = session.complete_sprint(ACTIVE, ContainerId::Backlog).await;

    assert!(matches!(result, Err(BoardError::RemoteRejection { .. })));
    assert_eq!(session.model(), before);
}

#[tokio::test]
async fn test_completion_rejects_bad_destination() {
    let mut mock = MockTransport::new();
    mock.expect_send().times(0);
    let session = session_with(mock);

    for destination in [ContainerId::Sprint(ACTIVE), ContainerId::Sprint(ENDED)] {
        let result = session.complete_sprint(ACTIVE, destination).await;
        assert!(matches!(result, Err(BoardError::Validation(_))));
    }
    let result = session.complete_sprint(NEXT, ContainerId::Backlog).await;
    assert!(matches!(result, Err(BoardError::Validation(_))));
}

#[tokio::test]
async fn test_create_sprint_waits_for_server() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|r| r.path == "sprints/" && r.body.as_ref().unwrap()["name"] == "Sprint 13")
        .times(1)
        .returning(|_| Ok(json!({"id": 13, "name": "Sprint 13", "goal": "Polish"})));
    let session = session_with(mock);

    let id = session
        .create_sprint(SprintDraft {
            name: "  Sprint 13 ".to_string(),
            goal: "Polish".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let model = session.model();
    let sprint = model.sprint(id).unwrap();
    assert_eq!(sprint.goal, "Polish");
    assert_eq!(sprint.state(), SprintState::Planned);
    assert!(sprint.item_ids.is_empty());
}

#[tokio::test]
async fn test_update_sprint_rolls_back_on_refusal() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|r| r.path == "sprints/11/")
        .returning(|_| Err(rejection(400)));
    let session = session_with(mock);

    let result = session
        .update_sprint(
            NEXT,
            SprintUpdate {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(result.is_err());
    assert_eq!(session.model().sprint(NEXT).unwrap().name, "Sprint 11");
}

#[tokio::test]
async fn test_delete_sprint_returns_items_to_backlog() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|r| r.path == "sprints/11/")
        .times(1)
        .returning(|_| Ok(Value::Null));
    let session = session_with(mock);

    session.delete_sprint(NEXT).await.unwrap();

    let model = session.model();
    assert!(model.sprint(NEXT).is_none());
    assert_eq!(ids(&model, ContainerId::Backlog), vec![4, 5, 6, 7, 8]);
}

#[tokio::test]
async fn test_refused_sprint_delete_leaves_model() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|r| r.path == "sprints/11/")
        .times(1)
        .returning(|_| Err(rejection(403)));
    let session = session_with(mock);
    let before = session.model();

    let result = session.delete_sprint(NEXT).await;

    assert!(matches!(result, Err(BoardError::RemoteRejection { status: 403, .. })));
    assert_eq!(session.model(), before);
    assert_eq!(session.error().unwrap().kind, "remote_rejection");
}

#[tokio::test]
async fn test_completion_moves_survive_partial_echo() {
    let mut mock = MockTransport::new();
    mock.expect_send()
        .withf(|r| r.path == "tasks/2/")
        .returning(|_| Ok(json!({"id": 2, "title": "B"})));
    mock.expect_send()
        .withf(|r| r.path == "tasks/3/")
        .returning(|_| Ok(json!({"id": 3, "title": "C"})));
    mock.expect_send()
        .withf(|r| r.path == "sprints/10/end/")
        .returning(|_| Ok(Value::Null));
    let session = session_with(mock);

    session
        .complete_sprint(ACTIVE, ContainerId::Sprint(NEXT))
        .await
        .unwrap();

    let model = session.model();
    assert_eq!(ids(&model, ContainerId::Sprint(NEXT)), vec![7, 8, 2, 3]);
    assert_eq!(
        model.item(ItemId(3)).unwrap().status,
        ItemStatus::InReview
    );
}
