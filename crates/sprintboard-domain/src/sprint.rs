use chrono::NaiveDate;
use im::Vector;
use serde::{Deserialize, Serialize};

use crate::ids::{EpicId, ItemId, SprintId};
use crate::FieldUpdate;

/// Lifecycle state derived from the active/ended flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SprintState {
    Planned,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub name: String,
    pub goal: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub is_ended: bool,
    /// Display order only.
    pub item_ids: Vector<ItemId>,
    pub epic: Option<EpicId>,
}

/// Sprint attributes the remote API is authoritative for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintFields {
    pub name: String,
    pub goal: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub is_ended: bool,
    pub epic: Option<EpicId>,
}

impl Sprint {
    pub fn new(id: SprintId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            goal: String::new(),
            start_date: None,
            end_date: None,
            is_active: false,
            is_ended: false,
            item_ids: Vector::new(),
            epic: None,
        }
    }

    pub fn from_fields(id: SprintId, fields: SprintFields) -> Self {
        let mut sprint = Self::new(id, fields.name.clone());
        sprint.apply_remote(fields);
        sprint
    }

    pub fn state(&self) -> SprintState {
        if self.is_ended {
            SprintState::Completed
        } else if self.is_active {
            SprintState::Active
        } else {
            SprintState::Planned
        }
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.item_ids.contains(&item_id)
    }

    pub fn fields(&self) -> SprintFields {
        SprintFields {
            name: self.name.clone(),
            goal: self.goal.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            is_active: self.is_active,
            is_ended: self.is_ended,
            epic: self.epic,
        }
    }

    pub fn apply_remote(&mut self, fields: SprintFields) {
        self.name = fields.name;
        self.goal = fields.goal;
        self.start_date = fields.start_date;
        self.end_date = fields.end_date;
        self.is_active = fields.is_active;
        self.is_ended = fields.is_ended;
        self.epic = fields.epic;
    }

    /// Update sprint with partial changes
    pub fn update(&mut self, updates: SprintUpdate) {
        if let Some(name) = updates.name {
            self.name = name;
        }
        if let Some(goal) = updates.goal {
            self.goal = goal;
        }
        updates.start_date.apply_to(&mut self.start_date);
        updates.end_date.apply_to(&mut self.end_date);
        updates.epic.apply_to(&mut self.epic);
    }
}

/// Partial update struct for Sprint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SprintUpdate {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub start_date: FieldUpdate<NaiveDate>,
    pub end_date: FieldUpdate<NaiveDate>,
    pub epic: FieldUpdate<EpicId>,
}

impl SprintUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.goal.is_none()
            && !self.start_date.is_change()
            && !self.end_date.is_change()
            && !self.epic.is_change()
    }
}
