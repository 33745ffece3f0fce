use crate::session::Session;
use sprintboard_core::BoardResult;
use sprintboard_domain::commands::Command;
use sprintboard_domain::EntityModel;
use sprintboard_sync::Transport;
use std::future::Future;

impl<T: Transport> Session<T> {
    /// Apply `local` right away, then await `remote`.
    ///
    /// On success `reconcile` folds the server's answer into whatever the
    /// model is by then. On failure the model is restored to the snapshot
    /// taken before `local` ran, whole. A cancelled call rolls back without
    /// touching the error signal.
    pub(crate) async fn with_optimism<R, Fut, F>(
        &self,
        local: &dyn Command,
        remote: Fut,
        reconcile: F,
    ) -> BoardResult<R>
    where
        R: Clone,
        Fut: Future<Output = BoardResult<R>>,
        F: FnOnce(&EntityModel, R) -> EntityModel,
    {
        self.with_rollback(local, remote, reconcile, |_, snapshot| snapshot.clone())
            .await
    }

    /// [`Session::with_optimism`] with a custom undo. `rollback` gets the
    /// model as it is when the failure arrives and the pre-`local` snapshot,
    /// and returns the model to keep.
    pub(crate) async fn with_rollback<R, Fut, F, B>(
        &self,
        local: &dyn Command,
        remote: Fut,
        reconcile: F,
        rollback: B,
    ) -> BoardResult<R>
    where
        R: Clone,
        Fut: Future<Output = BoardResult<R>>,
        F: FnOnce(&EntityModel, R) -> EntityModel,
        B: FnOnce(&EntityModel, &EntityModel) -> EntityModel,
    {
        let snapshot = {
            let mut state = self.state.lock();
            let snapshot = state.model.clone();
            if let Err(e) = state.execute(local) {
                state.report(&e);
                return Err(e);
            }
            snapshot
        };

        match remote.await {
            Ok(value) => {
                let mut state = self.state.lock();
                let next = reconcile(&state.model, value.clone());
                state.model = next;
                state.clear_error();
                Ok(value)
            }
            Err(e) => {
                let mut state = self.state.lock();
                if e.is_cancelled() {
                    tracing::debug!("Rolling back cancelled '{}'", local.description());
                } else {
                    tracing::warn!("Rolling back '{}': {}", local.description(), e);
                }
                let restored = rollback(&state.model, &snapshot);
                state.model = restored;
                state.report(&e);
                Err(e)
            }
        }
    }
}
