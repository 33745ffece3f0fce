use crate::session::Session;
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use sprintboard_core::{BoardError, BoardResult};
use sprintboard_domain::commands::{
    CompleteSprint, CreateSprint, DeleteSprint, RenameBacklog, StartSprint, UpdateSprint,
};
use sprintboard_domain::lifecycle::{plan_completion, scheduled_dates};
use sprintboard_domain::{ContainerId, EpicId, FieldChange, ItemId, SprintId, SprintUpdate};
use sprintboard_sync::{NewSprint, Transport};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SprintDraft {
    pub name: String,
    pub goal: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub epic: Option<EpicId>,
}

/// Outcome of a sprint completion that reached the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionReport {
    pub sprint_id: SprintId,
    pub destination: ContainerId,
    /// Done items left in the completed sprint.
    pub completed: Vec<ItemId>,
    /// Open items moved to the destination.
    pub moved: Vec<ItemId>,
    /// Open items whose move the server refused.
    pub failed: Vec<ItemId>,
}

impl<T: Transport> Session<T> {
    /// Create a sprint. Waits for the server before touching the model.
    pub async fn create_sprint(&self, draft: SprintDraft) -> BoardResult<SprintId> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(self.fail(BoardError::Validation(
                "Sprint name cannot be empty".to_string(),
            )));
        }
        if let (Some(start), Some(end)) = (draft.start_date, draft.end_date) {
            if end < start {
                return Err(self.fail(BoardError::Validation(format!(
                    "Sprint end date {} is before start date {}",
                    end, start
                ))));
            }
        }

        let request = NewSprint {
            project: self.config.project_id,
            name,
            goal: draft.goal,
            start_date: draft.start_date,
            end_date: draft.end_date,
            epic: draft.epic,
        };
        let token = self.token();
        let sprint = self
            .sync
            .create_sprint(&request, &token)
            .await
            .map_err(|e| self.fail(e))?;

        let id = sprint.id;
        let mut state = self.state.lock();
        if let Err(e) = state.execute(&CreateSprint { sprint }) {
            state.report(&e);
            return Err(e);
        }
        state.clear_error();
        tracing::info!("Created sprint {}", id);
        Ok(id)
    }

    /// Edit sprint attributes optimistically.
    pub async fn update_sprint(&self, sprint_id: SprintId, updates: SprintUpdate) -> BoardResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let updated = {
            let state = self.state.lock();
            state.model.sprint(sprint_id).cloned().map(|mut sprint| {
                sprint.update(updates.clone());
                sprint
            })
        }
        .ok_or_else(|| self.fail(BoardError::NotFound(format!("Sprint {}", sprint_id))))?;

        let command = UpdateSprint { sprint_id, updates };
        let token = self.token();
        self.with_optimism(
            &command,
            self.sync.update_sprint(&updated, &token),
            |model, fields| model.with_sprint_fields(sprint_id, fields),
        )
        .await?;
        Ok(())
    }

    /// Make `sprint_id` the single active sprint.
    ///
    /// Any other active sprint is switched off locally in the same step; if
    /// the server refuses, both changes are rolled back together. Missing
    /// dates default to today and the configured sprint length.
    pub async fn start_sprint(&self, sprint_id: SprintId) -> BoardResult<()> {
        let today = Utc::now().date_naive();
        let dated = {
            let state = self.state.lock();
            state.model.sprint(sprint_id).cloned()
        }
        .ok_or_else(|| self.fail(BoardError::NotFound(format!("Sprint {}", sprint_id))))?;

        if dated.is_active && !dated.is_ended {
            tracing::debug!("Sprint {} is already active", sprint_id);
            return Ok(());
        }

        let (start, end) = scheduled_dates(&dated, today, self.config.sprint_duration_days)
            .map_err(|e| self.fail(e))?;
        let mut dated = dated;
        dated.start_date = Some(start);
        dated.end_date = Some(end);

        let command = StartSprint {
            sprint_id,
            start_date: Some(start),
            end_date: Some(end),
        };
        let token = self.token();
        tracing::info!("Starting sprint {} ({} to {})", sprint_id, start, end);
        self.with_optimism(
            &command,
            self.sync.activate_sprint(&dated, &token),
            |model, fields| model.with_sprint_fields(sprint_id, fields),
        )
        .await?;
        Ok(())
    }

    /// Finish the active sprint `sprint_id`, moving its open items to
    /// `destination`.
    ///
    /// The per-item moves run concurrently and the completion call is sent
    /// whatever their outcome. The model only changes once the completion
    /// call succeeds; if some moves failed the change is still applied and
    /// the call reports `PartialBulkFailure`.
    pub async fn complete_sprint(
        &self,
        sprint_id: SprintId,
        destination: ContainerId,
    ) -> BoardResult<CompletionReport> {
        let (plan, sprint) = {
            let state = self.state.lock();
            let model = &state.model;
            plan_completion(model, sprint_id, destination)
                .map(|plan| (plan, model.sprint(sprint_id).cloned()))
        }
        .map_err(|e| self.fail(e))?;
        let sprint =
            sprint.ok_or_else(|| self.fail(BoardError::NotFound(format!("Sprint {}", sprint_id))))?;

        tracing::info!(
            "Completing sprint {}: {} done, {} open -> {}",
            sprint_id,
            plan.completed.len(),
            plan.open.len(),
            destination
        );

        let token = self.token();
        let change = FieldChange::Sprint(destination.sprint_id());
        let moves = join_all(plan.open.iter().map(|id| {
            let change = &change;
            let token = &token;
            async move { (*id, self.sync.apply(*id, change, token).await) }
        }))
        .await;

        let ended = self
            .sync
            .end_sprint(&sprint, &token)
            .await
            .map_err(|e| self.fail(e))?;

        let mut moved = Vec::new();
        let mut failed = Vec::new();
        let mut state = self.state.lock();
        if let Err(e) = state.execute(&CompleteSprint {
            plan: plan.clone(),
            fields: ended,
        }) {
            state.report(&e);
            return Err(e);
        }
        for (id, result) in moves {
            match result {
                Ok(patch) => {
                    let next = state.model.with_item_reconciled(id, patch);
                    state.model = next;
                    moved.push(id);
                }
                Err(e) => {
                    tracing::warn!("Moving item {} out of sprint {} failed: {}", id, sprint_id, e);
                    failed.push(id);
                }
            }
        }

        let report = CompletionReport {
            sprint_id,
            destination,
            completed: plan.completed,
            moved,
            failed,
        };
        if report.failed.is_empty() {
            state.clear_error();
            Ok(report)
        } else {
            let error = BoardError::PartialBulkFailure {
                failed: report.failed.len(),
                attempted: plan.open.len(),
            };
            state.report(&error);
            Err(error)
        }
    }

    /// Delete a sprint once the server confirms; its items go to the backlog.
    pub async fn delete_sprint(&self, sprint_id: SprintId) -> BoardResult<()> {
        if self.state.lock().model.sprint(sprint_id).is_none() {
            return Err(self.fail(BoardError::NotFound(format!("Sprint {}", sprint_id))));
        }
        let token = self.token();
        self.sync
            .delete_sprint(sprint_id, &token)
            .await
            .map_err(|e| self.fail(e))?;

        let mut state = self.state.lock();
        if let Err(e) = state.execute(&DeleteSprint { sprint_id }) {
            state.report(&e);
            return Err(e);
        }
        state.clear_error();
        tracing::info!("Deleted sprint {}", sprint_id);
        Ok(())
    }

    /// Rename the backlog optimistically.
    pub async fn rename_backlog(&self, name: &str) -> BoardResult<()> {
        let command = RenameBacklog {
            name: name.to_string(),
        };
        let token = self.token();
        self.with_optimism(
            &command,
            self.sync
                .rename_backlog(self.config.project_id, name.trim(), &token),
            |model, stored| model.with_backlog_name(stored),
        )
        .await?;
        Ok(())
    }
}
