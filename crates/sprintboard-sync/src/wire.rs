//! JSON shapes returned by the remote API.
//!
//! Decoding is lenient where servers are known to vary: status may be a bare
//! id or an `{id, title}` object, priority may come in any casing, users may
//! be referenced by id or as embedded objects.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sprintboard_core::{BoardError, BoardResult};
use sprintboard_domain::{
    EntityModel, Epic, EpicId, Item, ItemFields, ItemId, ItemKind, ItemPatch, ItemStatus, Priority,
    ProjectId, Sprint, SprintFields, SprintId, User, UserId, DEFAULT_BACKLOG_NAME,
};

/// A reference to another entity, either by id or embedded.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireRef {
    Id(u64),
    Object { id: u64 },
}

impl WireRef {
    pub fn id(&self) -> u64 {
        match self {
            Self::Id(id) | Self::Object { id } => *id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireStatus {
    Id(u32),
    Object {
        id: Option<u32>,
        title: Option<String>,
    },
    Title(String),
}

impl WireStatus {
    pub fn resolve(&self) -> Option<ItemStatus> {
        match self {
            Self::Id(id) => ItemStatus::from_id(*id),
            Self::Object { id, title } => id
                .and_then(ItemStatus::from_id)
                .or_else(|| title.as_deref().and_then(ItemStatus::parse)),
            Self::Title(title) => ItemStatus::parse(title),
        }
    }
}

/// Keeps an explicit `null` apart from an absent key: absent stays `None`
/// through `#[serde(default)]`, `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireTask {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<WireStatus>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub assignees: Option<Option<Vec<WireRef>>>,
    #[serde(default)]
    pub reporter: Option<WireRef>,
    #[serde(default, deserialize_with = "nullable")]
    pub story_points: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent: Option<Option<WireRef>>,
    #[serde(default, deserialize_with = "nullable")]
    pub epic: Option<Option<WireRef>>,
    #[serde(default, deserialize_with = "nullable")]
    pub sprint: Option<Option<WireRef>>,
}

impl WireTask {
    /// The keys this body carried. Unknown priorities and kinds are skipped
    /// rather than reset.
    pub fn into_patch(self) -> BoardResult<(ItemId, ItemPatch)> {
        let id = self.id;
        let status = self
            .status
            .as_ref()
            .map(|raw| {
                raw.resolve().ok_or_else(|| {
                    BoardError::Serialization(format!("Task {}: unknown status {:?}", id, raw))
                })
            })
            .transpose()?;
        let priority = self.priority.as_deref().and_then(|raw| {
            let parsed = Priority::normalize(raw);
            if parsed.is_none() {
                tracing::warn!("Task {}: unknown priority '{}'", id, raw);
            }
            parsed
        });

        let patch = ItemPatch {
            title: self.title,
            description: self.description.map(|d| d.filter(|d| !d.is_empty())),
            status,
            priority,
            kind: self.kind.as_deref().and_then(ItemKind::parse),
            assignee: self
                .assignees
                .map(|list| list.and_then(|l| l.first().map(|u| UserId(u.id())))),
            reporter: self.reporter.map(|r| UserId(r.id())),
            story_points: self.story_points,
            due_date: self.due_date.map(|d| d.as_deref().and_then(parse_date)),
            parent: self.parent.map(|p| p.map(|p| ItemId(p.id()))),
            epic: self.epic.map(|e| e.map(|e| EpicId(e.id()))),
            sprint: self.sprint.map(|s| s.map(|s| SprintId(s.id()))),
        };
        Ok((ItemId(id), patch))
    }

    /// A full record; absent keys take their defaults.
    pub fn into_fields(self) -> BoardResult<(ItemId, ItemFields)> {
        let (id, patch) = self.into_patch()?;
        Ok((id, patch.into_fields()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireSprint {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_ended: bool,
    #[serde(default)]
    pub epic: Option<WireRef>,
}

impl WireSprint {
    pub fn into_fields(self) -> (SprintId, SprintFields) {
        let fields = SprintFields {
            name: self.name,
            goal: self.goal.unwrap_or_default(),
            start_date: self.start_date.as_deref().and_then(parse_date),
            end_date: self.end_date.as_deref().and_then(parse_date),
            is_active: self.is_active && !self.is_ended,
            is_ended: self.is_ended,
            epic: self.epic.map(|e| EpicId(e.id())),
        };
        (SprintId(self.id), fields)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "name", alias = "full_name")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireEpic {
    pub id: u64,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireProject {
    pub id: u64,
    #[serde(default)]
    pub backlog_name: Option<String>,
    #[serde(default)]
    pub tasks: Vec<WireTask>,
    #[serde(default)]
    pub sprints: Vec<WireSprint>,
    #[serde(default)]
    pub members: Vec<WireUser>,
    #[serde(default)]
    pub epics: Vec<WireEpic>,
}

impl WireProject {
    pub fn into_model(self) -> BoardResult<EntityModel> {
        let sprints = self
            .sprints
            .into_iter()
            .map(|s| {
                let (id, fields) = s.into_fields();
                Sprint::from_fields(id, fields)
            })
            .collect();
        let records = self
            .tasks
            .into_iter()
            .map(|t| {
                let (id, fields) = t.into_fields()?;
                let sprint = fields.sprint;
                Ok((Item::from_fields(id, fields), sprint))
            })
            .collect::<BoardResult<Vec<_>>>()?;
        let members = self
            .members
            .into_iter()
            .map(|u| User {
                id: UserId(u.id),
                username: u.username,
                display_name: u.display_name,
            })
            .collect();
        let epics = self
            .epics
            .into_iter()
            .map(|e| Epic {
                id: EpicId(e.id),
                name: e.name,
                color: e.color,
            })
            .collect();

        let backlog_name = self
            .backlog_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKLOG_NAME.to_string());

        Ok(EntityModel::from_records(
            ProjectId(self.id),
            backlog_name,
            sprints,
            records,
            members,
            epics,
        ))
    }
}

/// Accepts `YYYY-MM-DD` and full RFC 3339 timestamps (date part only).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Decode a full task record, as returned by create. Bodies without an id
/// and title yield `None`.
pub fn decode_task(value: Value) -> BoardResult<Option<(ItemId, ItemFields)>> {
    if value.get("id").is_none() || value.get("title").is_none() {
        return Ok(None);
    }
    let task: WireTask = serde_json::from_value(value)?;
    task.into_fields().map(Some)
}

/// Decode the echo of a write. Only the keys the body carries end up in the
/// patch; a body that is not a task object gives an empty patch.
pub fn decode_task_patch(value: Value) -> BoardResult<ItemPatch> {
    if value.get("id").is_none() {
        return Ok(ItemPatch::default());
    }
    let task: WireTask = serde_json::from_value(value)?;
    Ok(task.into_patch()?.1)
}

pub fn decode_sprint(value: Value) -> BoardResult<Option<(SprintId, SprintFields)>> {
    if value.get("id").is_none() || value.get("name").is_none() {
        return Ok(None);
    }
    let sprint: WireSprint = serde_json::from_value(value)?;
    Ok(Some(sprint.into_fields()))
}

/// Task lists come bare or wrapped in `{"results": [...]}`.
pub fn decode_task_list(value: Value) -> BoardResult<Vec<(ItemId, ItemPatch)>> {
    let list = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(mut map) => map.remove("results").unwrap_or(Value::Array(Vec::new())),
        other => other,
    };
    let tasks: Vec<WireTask> = serde_json::from_value(list)?;
    tasks.into_iter().map(WireTask::into_patch).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sprintboard_domain::ContainerId;

    #[test]
    fn test_task_status_shapes() {
        for status in [json!(3), json!({"id": 3, "title": "In Review"}), json!("in review")] {
            let (_, fields) = decode_task(json!({"id": 1, "title": "T", "status": status}))
                .unwrap()
                .unwrap();
            assert_eq!(fields.status, ItemStatus::InReview);
        }

        let err = decode_task(json!({"id": 1, "title": "T", "status": 42})).unwrap_err();
        assert!(matches!(err, BoardError::Serialization(_)));
    }

    #[test]
    fn test_task_lenient_fields() {
        let (id, fields) = decode_task(json!({
            "id": 8,
            "title": "Fix login",
            "priority": "LOWEST",
            "type": "Bug",
            "assignees": [{"id": 4, "username": "ana"}, 5],
            "reporter": 2,
            "due_date": "2026-04-01T10:00:00Z",
            "sprint": {"id": 6},
            "description": ""
        }))
        .unwrap()
        .unwrap();

        assert_eq!(id, ItemId(8));
        assert_eq!(fields.priority, Priority::Lowest);
        assert_eq!(fields.priority.to_string(), "Lowest");
        assert_eq!(fields.kind, ItemKind::Bug);
        assert_eq!(fields.assignee, Some(UserId(4)));
        assert_eq!(fields.reporter, UserId(2));
        assert_eq!(fields.due_date, NaiveDate::from_ymd_opt(2026, 4, 1));
        assert_eq!(fields.sprint, Some(SprintId(6)));
        assert_eq!(fields.description, None);
    }

    #[test]
    fn test_partial_bodies_decode_to_none() {
        assert!(decode_task(Value::Null).unwrap().is_none());
        assert!(decode_task(json!({"status": 2})).unwrap().is_none());
        assert!(decode_sprint(json!({"detail": "ok"})).unwrap().is_none());
        assert!(decode_task_patch(Value::Null).unwrap().is_empty());
        assert!(decode_task_patch(json!({"detail": "ok"})).unwrap().is_empty());
    }

    #[test]
    fn test_patch_tells_absent_from_null() {
        let patch = decode_task_patch(json!({
            "id": 3,
            "title": "C",
            "priority": "HIGH",
            "epic": null,
            "assignees": []
        }))
        .unwrap();

        assert_eq!(patch.priority, Some(Priority::High));
        assert_eq!(patch.epic, Some(None));
        assert_eq!(patch.assignee, Some(None));
        assert_eq!(patch.sprint, None);
        assert_eq!(patch.status, None);
        assert_eq!(patch.parent, None);
        assert_eq!(patch.due_date, None);
    }

    #[test]
    fn test_patch_skips_unknown_priority() {
        let patch = decode_task_patch(json!({"id": 3, "priority": "urgent"})).unwrap();
        assert_eq!(patch.priority, None);
    }

    #[test]
    fn test_task_list_shapes() {
        let bare = decode_task_list(json!([{"id": 1, "title": "A"}])).unwrap();
        assert_eq!(bare.len(), 1);
        let wrapped = decode_task_list(json!({"results": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]})).unwrap();
        assert_eq!(wrapped.len(), 2);
        assert!(decode_task_list(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_project_into_model() {
        let project: WireProject = serde_json::from_value(json!({
            "id": 1,
            "tasks": [
                {"id": 10, "title": "A", "sprint": 2},
                {"id": 11, "title": "B"},
                {"id": 12, "title": "C", "sprint": 99}
            ],
            "sprints": [{"id": 2, "name": "Sprint 2", "is_active": true, "start_date": "2026-01-05"}],
            "members": [{"id": 4, "username": "ana", "name": "Ana"}],
            "epics": [{"id": 3, "title": "Auth"}]
        }))
        .unwrap();

        let model = project.into_model().unwrap();
        assert_eq!(model.project_id(), Some(ProjectId(1)));
        assert_eq!(model.backlog().name, "Backlog");
        assert_eq!(model.active_sprint().unwrap().id, SprintId(2));
        assert_eq!(
            model.location_of(ItemId(10)).container(),
            Some(ContainerId::Sprint(SprintId(2)))
        );
        // Unknown sprint falls back to the backlog
        assert_eq!(
            model.location_of(ItemId(12)).container(),
            Some(ContainerId::Backlog)
        );
        assert_eq!(model.members()[0].label(), "Ana");
        assert_eq!(model.epics()[0].name, "Auth");
        assert!(model.check_exclusivity());
    }
}
