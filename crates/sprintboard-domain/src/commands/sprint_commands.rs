use super::Command;
use crate::lifecycle::{apply_completion, start_transition, CompletionPlan, StartTransition};
use crate::{EntityModel, Sprint, SprintFields, SprintId, SprintUpdate};
use chrono::NaiveDate;
use sprintboard_core::{BoardError, BoardResult};

/// Make a sprint the single active sprint, setting its dates when given
pub struct StartSprint {
    pub sprint_id: SprintId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Command for StartSprint {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        let next = match start_transition(model, self.sprint_id)? {
            StartTransition::AlreadyActive => return Ok(model.clone()),
            StartTransition::Started { model, deactivated } => {
                for id in deactivated {
                    tracing::debug!("Deactivating sprint {}", id);
                }
                model
            }
        };

        let Some(sprint) = next.sprint(self.sprint_id) else {
            return Ok(next);
        };
        let mut dated = sprint.clone();
        if let Some(start) = self.start_date {
            dated.start_date = Some(start);
        }
        if let Some(end) = self.end_date {
            dated.end_date = Some(end);
        }
        Ok(next.with_sprint(dated))
    }

    fn description(&self) -> String {
        format!("Start sprint {}", self.sprint_id)
    }
}

/// Update sprint properties (name, goal, dates, epic)
pub struct UpdateSprint {
    pub sprint_id: SprintId,
    pub updates: SprintUpdate,
}

impl Command for UpdateSprint {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        let sprint = model
            .sprint(self.sprint_id)
            .ok_or_else(|| BoardError::NotFound(format!("Sprint {}", self.sprint_id)))?;
        if let Some(name) = &self.updates.name {
            if name.trim().is_empty() {
                return Err(BoardError::Validation(
                    "Sprint name cannot be empty".to_string(),
                ));
            }
        }

        let start = self.updates.start_date.resolve(sprint.start_date.as_ref());
        let end = self.updates.end_date.resolve(sprint.end_date.as_ref());
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(BoardError::Validation(format!(
                    "Sprint end date {} is before start date {}",
                    end, start
                )));
            }
        }

        let mut updated = sprint.clone();
        updated.update(self.updates.clone());
        Ok(model.with_sprint(updated))
    }

    fn description(&self) -> String {
        "Update sprint".to_string()
    }
}

/// Add a sprint confirmed by the server
pub struct CreateSprint {
    pub sprint: Sprint,
}

impl Command for CreateSprint {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        if model.sprint(self.sprint.id).is_some() {
            return Err(BoardError::Validation(format!(
                "Sprint {} already exists",
                self.sprint.id
            )));
        }
        Ok(model.with_sprint(self.sprint.clone()))
    }

    fn description(&self) -> String {
        format!("Create sprint '{}'", self.sprint.name)
    }
}

/// Finish a sprint: migrate open items and take the server's flags
pub struct CompleteSprint {
    pub plan: CompletionPlan,
    pub fields: SprintFields,
}

impl Command for CompleteSprint {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        Ok(apply_completion(model, &self.plan, self.fields.clone()))
    }

    fn description(&self) -> String {
        format!(
            "Complete sprint {} ({} open items to {})",
            self.plan.sprint_id,
            self.plan.open.len(),
            self.plan.destination
        )
    }
}

/// Delete a sprint; its members go back to the backlog
pub struct DeleteSprint {
    pub sprint_id: SprintId,
}

impl Command for DeleteSprint {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        Ok(model.without_sprint(self.sprint_id))
    }

    fn description(&self) -> String {
        format!("Delete sprint {}", self.sprint_id)
    }
}

/// Rename the backlog
pub struct RenameBacklog {
    pub name: String,
}

impl Command for RenameBacklog {
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(BoardError::Validation(
                "Backlog name cannot be empty".to_string(),
            ));
        }
        Ok(model.with_backlog_name(name))
    }

    fn description(&self) -> String {
        format!("Rename backlog to '{}'", self.name)
    }
}
