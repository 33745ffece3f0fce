//! Typed calls against the remote task-tracking API.
//!
//! Every call goes through the retry policy and honours a cancellation token.
//! Write responses come back as an [`ItemPatch`]: the value the edit was
//! expected to produce, overlaid with whatever keys the server echoed.

use crate::request::{self, ApiRequest, NewSprint, NewTask};
use crate::retry::RetryPolicy;
use crate::transport::Transport;
use crate::wire::{decode_sprint, decode_task, decode_task_list, decode_task_patch, WireProject};
use serde_json::Value;
use sprintboard_core::{BoardError, BoardResult};
use sprintboard_domain::{
    EntityModel, FieldChange, ItemFields, ItemId, ItemPatch, ProjectId, Sprint, SprintFields,
    SprintId,
};
use tokio_util::sync::CancellationToken;

pub struct RemoteSync<T: Transport> {
    transport: T,
    retry: RetryPolicy,
}

impl<T: Transport> RemoteSync<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Send `request`, retrying transient failures only when the method is
    /// idempotent. A POST that timed out may have been committed.
    async fn call(&self, request: ApiRequest, token: &CancellationToken) -> BoardResult<Value> {
        tracing::debug!("Remote call: {}", request);
        let single = RetryPolicy::none();
        let policy = if request.method.is_idempotent() {
            &self.retry
        } else {
            &single
        };
        let transport = &self.transport;
        policy
            .run(token, move || transport.send(request.clone()))
            .await
    }

    pub async fn load_project(
        &self,
        project: ProjectId,
        token: &CancellationToken,
    ) -> BoardResult<EntityModel> {
        let value = self.call(request::project(project), token).await?;
        let wire: WireProject = serde_json::from_value(value)?;
        wire.into_model()
    }

    /// Send a single-field edit. Keys the server does not echo keep their
    /// local values; the edited key falls back to the requested value.
    pub async fn apply(
        &self,
        item_id: ItemId,
        change: &FieldChange,
        token: &CancellationToken,
    ) -> BoardResult<ItemPatch> {
        change.validate()?;
        let value = self
            .call(request::field_update(item_id, change), token)
            .await?;
        Ok(ItemPatch::from(change).overlay(decode_task_patch(value)?))
    }

    pub async fn create_task(
        &self,
        task: &NewTask,
        token: &CancellationToken,
    ) -> BoardResult<(ItemId, ItemFields)> {
        let value = self.call(request::create_task(task), token).await?;
        decode_task(value)?.ok_or_else(|| {
            BoardError::Serialization("Create task response did not contain a task".to_string())
        })
    }

    pub async fn delete_task(&self, id: ItemId, token: &CancellationToken) -> BoardResult<()> {
        self.call(request::delete_task(id), token).await?;
        Ok(())
    }

    /// Second step of subtask creation: attach `child` to `parent`.
    pub async fn link_parent(
        &self,
        child: ItemId,
        parent: ItemId,
        token: &CancellationToken,
    ) -> BoardResult<ItemPatch> {
        let value = self
            .call(request::link_parent(child, parent), token)
            .await?;
        let expected = ItemPatch {
            parent: Some(Some(parent)),
            ..Default::default()
        };
        Ok(expected.overlay(decode_task_patch(value)?))
    }

    pub async fn subtasks(
        &self,
        parent: ItemId,
        token: &CancellationToken,
    ) -> BoardResult<Vec<(ItemId, ItemPatch)>> {
        let value = self.call(request::subtasks(parent), token).await?;
        decode_task_list(value)
    }

    pub async fn create_sprint(
        &self,
        sprint: &NewSprint,
        token: &CancellationToken,
    ) -> BoardResult<Sprint> {
        let value = self.call(request::create_sprint(sprint), token).await?;
        let (id, fields) = decode_sprint(value)?.ok_or_else(|| {
            BoardError::Serialization("Create sprint response did not contain a sprint".to_string())
        })?;
        Ok(Sprint::from_fields(id, fields))
    }

    pub async fn update_sprint(
        &self,
        sprint: &Sprint,
        token: &CancellationToken,
    ) -> BoardResult<SprintFields> {
        let value = self.call(request::update_sprint(sprint), token).await?;
        Ok(decode_sprint(value)?
            .map(|(_, fields)| fields)
            .unwrap_or_else(|| sprint.fields()))
    }

    pub async fn activate_sprint(
        &self,
        sprint: &Sprint,
        token: &CancellationToken,
    ) -> BoardResult<SprintFields> {
        let value = self.call(request::activate_sprint(sprint), token).await?;
        Ok(decode_sprint(value)?
            .map(|(_, fields)| fields)
            .unwrap_or_else(|| SprintFields {
                is_active: true,
                ..sprint.fields()
            }))
    }

    pub async fn end_sprint(
        &self,
        sprint: &Sprint,
        token: &CancellationToken,
    ) -> BoardResult<SprintFields> {
        let value = self.call(request::end_sprint(sprint.id), token).await?;
        Ok(decode_sprint(value)?
            .map(|(_, fields)| fields)
            .unwrap_or_else(|| SprintFields {
                is_active: false,
                is_ended: true,
                ..sprint.fields()
            }))
    }

    pub async fn delete_sprint(&self, id: SprintId, token: &CancellationToken) -> BoardResult<()> {
        self.call(request::delete_sprint(id), token).await?;
        Ok(())
    }

    /// Returns the name the server stored.
    pub async fn rename_backlog(
        &self,
        project: ProjectId,
        name: &str,
        token: &CancellationToken,
    ) -> BoardResult<String> {
        let value = self
            .call(request::rename_backlog(project, name), token)
            .await?;
        Ok(value
            .get("backlog_name")
            .and_then(Value::as_str)
            .unwrap_or(name)
            .to_string())
    }
}
