//! Closed set of single-field item edits.
//!
//! Each variant carries its own typed payload and maps to exactly one remote
//! endpoint, so there is no way to construct an edit the remote side cannot
//! route. String field names only appear at the edge (`FieldChange::parse`).

use chrono::NaiveDate;
use serde::Serialize;
use sprintboard_core::{BoardError, BoardResult};

use crate::ids::{SprintId, UserId};
use crate::item::{Item, ItemPatch, ItemStatus, Priority};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldChange {
    Status(ItemStatus),
    Assignee(Option<UserId>),
    DueDate(Option<NaiveDate>),
    StoryPoints(Option<u32>),
    Description(Option<String>),
    Sprint(Option<SprintId>),
    Priority(Priority),
    Title(String),
}

impl FieldChange {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Assignee(_) => "assignee",
            Self::DueDate(_) => "due_date",
            Self::StoryPoints(_) => "story_points",
            Self::Description(_) => "description",
            Self::Sprint(_) => "sprint",
            Self::Priority(_) => "priority",
            Self::Title(_) => "title",
        }
    }

    /// Parse a `field`/`value` pair as typed by a user.
    ///
    /// `none`, `null` and the empty string clear nullable fields.
    pub fn parse(field: &str, raw: &str) -> BoardResult<Self> {
        let value = raw.trim();
        let cleared = value.is_empty()
            || value.eq_ignore_ascii_case("none")
            || value.eq_ignore_ascii_case("null");

        let change = match field.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "status" => Self::Status(ItemStatus::parse(value).ok_or_else(|| {
                BoardError::Validation(format!("Unknown status '{}'", value))
            })?),
            "assignee" => Self::Assignee(if cleared {
                None
            } else {
                Some(parse_number(field, value)?)
            }),
            "due_date" => Self::DueDate(if cleared {
                None
            } else {
                Some(NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                    BoardError::Validation(format!(
                        "Invalid date '{}'. Expected YYYY-MM-DD",
                        value
                    ))
                })?)
            }),
            "story_points" => Self::StoryPoints(if cleared {
                None
            } else {
                Some(parse_number(field, value)?)
            }),
            "description" => Self::Description(if cleared {
                None
            } else {
                Some(raw.to_string())
            }),
            "sprint" => Self::Sprint(if cleared || value.eq_ignore_ascii_case("backlog") {
                None
            } else {
                Some(parse_number(field, value)?)
            }),
            "priority" => Self::Priority(Priority::normalize(value).ok_or_else(|| {
                BoardError::Validation(format!("Unknown priority '{}'", value))
            })?),
            "title" => Self::Title(value.to_string()),
            other => return Err(BoardError::UnsupportedField(other.to_string())),
        };
        change.validate()?;
        Ok(change)
    }

    pub fn validate(&self) -> BoardResult<()> {
        match self {
            Self::Title(title) if title.trim().is_empty() => {
                Err(BoardError::Validation("Title cannot be empty".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Apply the edit to an item's own fields. Sprint membership is not an
    /// item field; the caller moves the item between containers.
    pub fn apply_to(&self, item: &mut Item) {
        match self {
            Self::Status(status) => item.status = *status,
            Self::Assignee(user) => item.assignee = *user,
            Self::DueDate(date) => item.due_date = *date,
            Self::StoryPoints(points) => item.story_points = *points,
            Self::Description(text) => item.description = text.clone(),
            Self::Priority(priority) => item.priority = *priority,
            Self::Title(title) => item.title = title.trim().to_string(),
            Self::Sprint(_) => {}
        }
    }
}

impl From<&FieldChange> for ItemPatch {
    /// What the server is expected to echo for this edit.
    fn from(change: &FieldChange) -> Self {
        let mut patch = ItemPatch::default();
        match change {
            FieldChange::Status(status) => patch.status = Some(*status),
            FieldChange::Assignee(user) => patch.assignee = Some(*user),
            FieldChange::DueDate(date) => patch.due_date = Some(*date),
            FieldChange::StoryPoints(points) => patch.story_points = Some(*points),
            FieldChange::Description(text) => patch.description = Some(text.clone()),
            FieldChange::Sprint(sprint) => patch.sprint = Some(*sprint),
            FieldChange::Priority(priority) => patch.priority = Some(*priority),
            FieldChange::Title(title) => patch.title = Some(title.trim().to_string()),
        }
        patch
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> BoardResult<T> {
    value
        .parse()
        .map_err(|_| BoardError::Validation(format!("Invalid {} '{}'", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ItemId;

    #[test]
    fn test_parse_known_fields() {
        assert_eq!(
            FieldChange::parse("status", "in progress").unwrap(),
            FieldChange::Status(ItemStatus::InProgress)
        );
        assert_eq!(
            FieldChange::parse("assignee", "none").unwrap(),
            FieldChange::Assignee(None)
        );
        assert_eq!(
            FieldChange::parse("story-points", "8").unwrap(),
            FieldChange::StoryPoints(Some(8))
        );
        assert_eq!(
            FieldChange::parse("due_date", "2026-02-28").unwrap(),
            FieldChange::DueDate(NaiveDate::from_ymd_opt(2026, 2, 28))
        );
        assert_eq!(
            FieldChange::parse("sprint", "backlog").unwrap(),
            FieldChange::Sprint(None)
        );
        assert_eq!(
            FieldChange::parse("priority", "highest").unwrap(),
            FieldChange::Priority(Priority::Highest)
        );
    }

    #[test]
    fn test_parse_unsupported_field() {
        let err = FieldChange::parse("reporter", "3").unwrap_err();
        assert!(matches!(err, BoardError::UnsupportedField(ref f) if f == "reporter"));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(
            FieldChange::parse("story_points", "-1"),
            Err(BoardError::Validation(_))
        ));
        assert!(matches!(
            FieldChange::parse("due_date", "tomorrow"),
            Err(BoardError::Validation(_))
        ));
        assert!(matches!(
            FieldChange::parse("title", "   "),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn test_expected_patch_touches_one_key() {
        let patch = ItemPatch::from(&FieldChange::Sprint(None));
        assert_eq!(patch.sprint, Some(None));
        assert!(patch.status.is_none());

        let patch = ItemPatch::from(&FieldChange::Title(" Login ".to_string()));
        assert_eq!(patch.title.as_deref(), Some("Login"));
        assert!(patch.sprint.is_none());
    }

    #[test]
    fn test_apply_to_item() {
        let mut item = Item::new(ItemId(1), "Title", UserId(1));
        FieldChange::Priority(Priority::Low).apply_to(&mut item);
        FieldChange::Title("  Trimmed ".to_string()).apply_to(&mut item);
        FieldChange::StoryPoints(Some(2)).apply_to(&mut item);

        assert_eq!(item.priority, Priority::Low);
        assert_eq!(item.title, "Trimmed");
        assert_eq!(item.story_points, Some(2));
    }
}
