use crate::signal::ErrorSignal;
use crate::state::{PendingLink, SessionState};
use parking_lot::Mutex;
use sprintboard_core::{AppConfig, BoardError, BoardResult};
use sprintboard_domain::{EntityModel, ProjectId, UserId, ViewProjection, ViewQuery};
use sprintboard_sync::{RemoteSync, Transport};
use tokio_util::sync::CancellationToken;

const DEFAULT_SPRINT_DURATION_DAYS: u32 = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub project_id: ProjectId,
    /// The signed-in user; must be a project member to create items.
    pub current_user: Option<UserId>,
    pub sprint_duration_days: u32,
}

impl SessionConfig {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            current_user: None,
            sprint_duration_days: DEFAULT_SPRINT_DURATION_DAYS,
        }
    }

    pub fn with_current_user(mut self, user: UserId) -> Self {
        self.current_user = Some(user);
        self
    }

    pub fn from_app_config(config: &AppConfig) -> BoardResult<Self> {
        let project_id = config
            .project_id
            .ok_or_else(|| BoardError::Config("No project_id configured".to_string()))?;
        Ok(Self {
            project_id: ProjectId(project_id),
            current_user: config.current_user.map(UserId),
            sprint_duration_days: config.effective_sprint_duration_days(),
        })
    }
}

/// One project's live state and the intents that change it.
///
/// The state lock is only ever taken between awaits, so intents may run
/// concurrently; when two of them race on the network, the one that
/// reconciles (or rolls back) last wins.
pub struct Session<T: Transport> {
    pub(crate) sync: RemoteSync<T>,
    pub(crate) config: SessionConfig,
    pub(crate) state: Mutex<SessionState>,
    scope: Mutex<CancellationToken>,
}

impl<T: Transport> Session<T> {
    /// Start with an empty model; call [`Session::load`] to fetch the project.
    pub fn new(sync: RemoteSync<T>, config: SessionConfig) -> Self {
        let model = EntityModel::new(config.project_id);
        Self::from_model(sync, config, model)
    }

    /// Start from an already built model.
    pub fn from_model(sync: RemoteSync<T>, config: SessionConfig, model: EntityModel) -> Self {
        Self {
            sync,
            config,
            state: Mutex::new(SessionState::new(model)),
            scope: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot of the current model.
    pub fn model(&self) -> EntityModel {
        self.state.lock().model.clone()
    }

    pub fn project(&self, query: &ViewQuery) -> ViewProjection {
        let model = self.model();
        ViewProjection::compute(&model, query)
    }

    pub fn error(&self) -> Option<ErrorSignal> {
        self.state.lock().error.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.lock().error.as_ref().map(|e| e.message.clone())
    }

    pub fn pending_links(&self) -> Vec<PendingLink> {
        self.state.lock().pending_links.clone()
    }

    /// Abort every in-flight remote call and open a fresh scope for new ones.
    pub fn cancel_pending(&self) {
        let mut scope = self.scope.lock();
        scope.cancel();
        *scope = CancellationToken::new();
        tracing::debug!("Cancelled pending remote calls");
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.scope.lock().clone()
    }

    /// Record `error` on the signal and hand it back for `?`/`Err`.
    pub(crate) fn fail(&self, error: BoardError) -> BoardError {
        self.state.lock().report(&error);
        error
    }

    pub(crate) fn succeed(&self) {
        self.state.lock().clear_error();
    }

    /// Fetch the project and replace the model, then retry pending subtask
    /// links.
    pub async fn load(&self) -> BoardResult<()> {
        let token = self.token();
        let model = self
            .sync
            .load_project(self.config.project_id, &token)
            .await
            .map_err(|e| self.fail(e))?;

        tracing::info!(
            "Loaded project {}: {} items, {} sprints",
            self.config.project_id,
            model.items().len(),
            model.sprints().len()
        );
        {
            let mut state = self.state.lock();
            state.model = model;
            state.clear_error();
        }

        self.adopt_orphans().await?;
        Ok(())
    }
}
