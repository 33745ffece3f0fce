//! Request descriptions and the endpoint table of the remote API.
//!
//! Paths are relative to the configured API base (`.../api/`) and always end
//! with a slash.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use sprintboard_domain::{
    EpicId, FieldChange, ItemId, ItemKind, ItemStatus, Priority, ProjectId, Sprint, SprintId,
    UserId,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// Whether sending the request twice has the same effect as once.
    /// POST creates a new record each time.
    pub fn is_idempotent(self) -> bool {
        !matches!(self, Self::Post)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Patch,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Payload for creating an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub project: ProjectId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(serialize_with = "serialize_status")]
    pub status: ItemStatus,
    #[serde(serialize_with = "serialize_priority")]
    pub priority: Priority,
    pub reporter: UserId,
    pub sprint: Option<SprintId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic: Option<EpicId>,
}

impl NewTask {
    pub fn new(project: ProjectId, title: impl Into<String>, reporter: UserId) -> Self {
        Self {
            project,
            title: title.into(),
            kind: ItemKind::Task,
            status: ItemStatus::ToDo,
            priority: Priority::Medium,
            reporter,
            sprint: None,
            parent: None,
            description: None,
            epic: None,
        }
    }
}

/// Payload for creating a sprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSprint {
    pub project: ProjectId,
    pub name: String,
    pub goal: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub epic: Option<EpicId>,
}

fn serialize_status<S: serde::Serializer>(status: &ItemStatus, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u32(status.id())
}

fn serialize_priority<S: serde::Serializer>(priority: &Priority, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&priority.as_wire())
}

fn sprint_body(sprint: &Sprint) -> Value {
    json!({
        "name": sprint.name,
        "goal": sprint.goal,
        "start_date": sprint.start_date,
        "end_date": sprint.end_date,
        "epic": sprint.epic,
    })
}

pub fn project(id: ProjectId) -> ApiRequest {
    ApiRequest::get(format!("projects/{}/", id))
}

pub fn rename_backlog(id: ProjectId, name: &str) -> ApiRequest {
    ApiRequest::patch(format!("projects/{}/", id), json!({ "backlog_name": name }))
}

/// The single-field edit dispatch.
///
/// Status, assignee, due date, story points and description each have their
/// own sub-path; sprint, priority and title go through the item endpoint.
pub fn field_update(item_id: ItemId, change: &FieldChange) -> ApiRequest {
    let (suffix, body) = match change {
        FieldChange::Status(status) => ("status/", json!({ "status": status.id() })),
        FieldChange::Assignee(user) => {
            let assignees: Vec<UserId> = user.iter().copied().collect();
            ("assignees/", json!({ "assignees": assignees }))
        }
        FieldChange::DueDate(date) => ("due-date/", json!({ "due_date": date })),
        FieldChange::StoryPoints(points) => {
            ("story-points/", json!({ "story_points": points }))
        }
        FieldChange::Description(text) => ("description/", json!({ "description": text })),
        FieldChange::Sprint(sprint) => ("", json!({ "sprint": sprint })),
        FieldChange::Priority(priority) => ("", json!({ "priority": priority.as_wire() })),
        FieldChange::Title(title) => ("", json!({ "title": title.trim() })),
    };
    ApiRequest::patch(format!("tasks/{}/{}", item_id, suffix), body)
}

pub fn create_task(task: &NewTask) -> ApiRequest {
    ApiRequest::post("tasks/", json!(task))
}

pub fn delete_task(id: ItemId) -> ApiRequest {
    ApiRequest::delete(format!("tasks/{}/", id))
}

pub fn link_parent(child: ItemId, parent: ItemId) -> ApiRequest {
    ApiRequest::patch(format!("tasks/{}/parent/", child), json!({ "parent": parent }))
}

pub fn subtasks(parent: ItemId) -> ApiRequest {
    ApiRequest::get(format!("tasks/{}/subtasks/", parent))
}

pub fn create_sprint(sprint: &NewSprint) -> ApiRequest {
    ApiRequest::post("sprints/", json!(sprint))
}

pub fn update_sprint(sprint: &Sprint) -> ApiRequest {
    ApiRequest::patch(format!("sprints/{}/", sprint.id), sprint_body(sprint))
}

pub fn activate_sprint(sprint: &Sprint) -> ApiRequest {
    ApiRequest::patch(
        format!("sprints/{}/activate/", sprint.id),
        json!({
            "name": sprint.name,
            "goal": sprint.goal,
            "start_date": sprint.start_date,
            "end_date": sprint.end_date,
        }),
    )
}

pub fn end_sprint(id: SprintId) -> ApiRequest {
    ApiRequest::patch(format!("sprints/{}/end/", id), json!({}))
}

pub fn delete_sprint(id: SprintId) -> ApiRequest {
    ApiRequest::delete(format!("sprints/{}/", id))
}
