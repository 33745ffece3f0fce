use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::ids::{EpicId, ItemId, SprintId, UserId};

/// Workflow status of an item. Each variant has a fixed numeric id on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    ToDo,
    InProgress,
    InReview,
    Done,
    Testing,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 5] = [
        ItemStatus::ToDo,
        ItemStatus::InProgress,
        ItemStatus::InReview,
        ItemStatus::Done,
        ItemStatus::Testing,
    ];

    pub fn id(self) -> u32 {
        match self {
            Self::ToDo => 1,
            Self::InProgress => 2,
            Self::InReview => 3,
            Self::Done => 4,
            Self::Testing => 5,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::InReview => "In Review",
            Self::Done => "Done",
            Self::Testing => "Testing",
        }
    }

    /// Case-insensitive title lookup; also accepts the numeric id.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<u32>() {
            return Self::from_id(id);
        }
        Self::ALL
            .into_iter()
            .find(|status| status.title().eq_ignore_ascii_case(trimmed))
    }

    pub fn is_done(self) -> bool {
        self == Self::Done
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Item priority.
///
/// Rendered locally in title case ("Highest"), sent to the remote API upper-cased
/// ("HIGHEST"), and accepted in any casing on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Priority {
    Highest,
    High,
    #[default]
    Medium,
    Low,
    Lowest,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::Highest,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Lowest,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Highest => "Highest",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Lowest => "Lowest",
        }
    }

    pub fn normalize(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(trimmed))
    }

    pub fn as_wire(self) -> String {
        self.label().to_ascii_uppercase()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Priority::normalize(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown priority '{}'", raw)))
    }
}

/// Work-item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    #[default]
    Task,
    Bug,
    Subtask,
}

impl ItemKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "story" => Some(Self::Story),
            "task" => Some(Self::Task),
            "bug" => Some(Self::Bug),
            "subtask" | "sub-task" => Some(Self::Subtask),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Task => "task",
            Self::Bug => "bug",
            Self::Subtask => "subtask",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub status: ItemStatus,
    pub priority: Priority,
    pub kind: ItemKind,
    pub assignee: Option<UserId>,
    /// Set at creation, never changed afterwards.
    pub reporter: UserId,
    pub story_points: Option<u32>,
    pub due_date: Option<NaiveDate>,
    pub parent: Option<ItemId>,
    pub epic: Option<EpicId>,
    /// `None` until subtasks have been fetched.
    #[serde(default)]
    pub children: Option<Vec<ItemId>>,
}

/// The fields the remote API is authoritative for, as returned after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub title: String,
    pub description: Option<String>,
    pub status: ItemStatus,
    pub priority: Priority,
    pub kind: ItemKind,
    pub assignee: Option<UserId>,
    pub reporter: UserId,
    pub story_points: Option<u32>,
    pub due_date: Option<NaiveDate>,
    pub parent: Option<ItemId>,
    pub epic: Option<EpicId>,
    pub sprint: Option<SprintId>,
}

/// Item fields as echoed by the server after a write.
///
/// `None` means the key was absent and the local value stands. For nullable
/// fields `Some(None)` is an explicit `null` and clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<ItemStatus>,
    pub priority: Option<Priority>,
    pub kind: Option<ItemKind>,
    pub assignee: Option<Option<UserId>>,
    pub reporter: Option<UserId>,
    pub story_points: Option<Option<u32>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub parent: Option<Option<ItemId>>,
    pub epic: Option<Option<EpicId>>,
    pub sprint: Option<Option<SprintId>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer `other` over `self`; keys present in `other` win.
    pub fn overlay(self, other: ItemPatch) -> Self {
        Self {
            title: other.title.or(self.title),
            description: other.description.or(self.description),
            status: other.status.or(self.status),
            priority: other.priority.or(self.priority),
            kind: other.kind.or(self.kind),
            assignee: other.assignee.or(self.assignee),
            reporter: other.reporter.or(self.reporter),
            story_points: other.story_points.or(self.story_points),
            due_date: other.due_date.or(self.due_date),
            parent: other.parent.or(self.parent),
            epic: other.epic.or(self.epic),
            sprint: other.sprint.or(self.sprint),
        }
    }

    /// A complete record, with defaults for every absent key. An absent
    /// reporter becomes user 0.
    pub fn into_fields(self) -> ItemFields {
        ItemFields {
            title: self.title.unwrap_or_default(),
            description: self.description.flatten(),
            status: self.status.unwrap_or(ItemStatus::ToDo),
            priority: self.priority.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            assignee: self.assignee.flatten(),
            reporter: self.reporter.unwrap_or(UserId(0)),
            story_points: self.story_points.flatten(),
            due_date: self.due_date.flatten(),
            parent: self.parent.flatten(),
            epic: self.epic.flatten(),
            sprint: self.sprint.flatten(),
        }
    }
}

impl From<ItemFields> for ItemPatch {
    fn from(fields: ItemFields) -> Self {
        Self {
            title: Some(fields.title),
            description: Some(fields.description),
            status: Some(fields.status),
            priority: Some(fields.priority),
            kind: Some(fields.kind),
            assignee: Some(fields.assignee),
            reporter: Some(fields.reporter),
            story_points: Some(fields.story_points),
            due_date: Some(fields.due_date),
            parent: Some(fields.parent),
            epic: Some(fields.epic),
            sprint: Some(fields.sprint),
        }
    }
}

impl Item {
    pub fn new(id: ItemId, title: impl Into<String>, reporter: UserId) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            status: ItemStatus::ToDo,
            priority: Priority::Medium,
            kind: ItemKind::Task,
            assignee: None,
            reporter,
            story_points: None,
            due_date: None,
            parent: None,
            epic: None,
            children: None,
        }
    }

    /// Build a fresh item from a server record.
    pub fn from_fields(id: ItemId, fields: ItemFields) -> Self {
        let mut item = Self::new(id, fields.title.clone(), fields.reporter);
        item.merge_remote(fields.into());
        item
    }

    /// Current values as the remote API would report them.
    pub fn fields(&self, sprint: Option<SprintId>) -> ItemFields {
        ItemFields {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            kind: self.kind,
            assignee: self.assignee,
            reporter: self.reporter,
            story_points: self.story_points,
            due_date: self.due_date,
            parent: self.parent,
            epic: self.epic,
            sprint,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    pub fn is_subtask(&self) -> bool {
        self.parent.is_some()
    }

    /// Take the server's value for every key it returned. The reporter and
    /// the lazily loaded children list are kept.
    pub fn merge_remote(&mut self, patch: ItemPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = assignee;
        }
        if let Some(points) = patch.story_points {
            self.story_points = points;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(parent) = patch.parent {
            self.parent = parent;
        }
        if let Some(epic) = patch.epic {
            self.epic = epic;
        }
    }
}
