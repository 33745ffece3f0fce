use crate::signal::ErrorSignal;
use serde::Serialize;
use sprintboard_core::{BoardError, BoardResult};
use sprintboard_domain::commands::Command;
use sprintboard_domain::{EntityModel, ItemId};

/// A subtask created remotely whose parent link has not been confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingLink {
    pub child: ItemId,
    pub parent: ItemId,
}

/// Everything a session owns, behind one lock.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub model: EntityModel,
    pub error: Option<ErrorSignal>,
    pub pending_links: Vec<PendingLink>,
}

impl SessionState {
    pub fn new(model: EntityModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    /// Execute a command and swap in the model it produces
    pub fn execute(&mut self, command: &dyn Command) -> BoardResult<()> {
        let description = command.description();
        tracing::debug!("Executing: {}", description);

        let next = command.execute(&self.model)?;
        debug_assert!(next.check_exclusivity(), "{} broke exclusivity", description);
        self.model = next;
        Ok(())
    }

    /// Record a failure for the error signal. Cancellation is not a failure
    /// the user needs to see.
    pub fn report(&mut self, error: &BoardError) {
        if error.is_cancelled() {
            return;
        }
        tracing::error!("{}", error);
        self.error = Some(ErrorSignal::from_error(error));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn add_pending_link(&mut self, link: PendingLink) {
        if !self.pending_links.contains(&link) {
            self.pending_links.push(link);
        }
    }

    pub fn forget_links_of(&mut self, item_id: ItemId) {
        self.pending_links
            .retain(|link| link.child != item_id && link.parent != item_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprintboard_domain::commands::RenameBacklog;

    #[test]
    fn test_execute_replaces_model() {
        let mut state = SessionState::default();
        state
            .execute(&RenameBacklog {
                name: "Icebox".to_string(),
            })
            .unwrap();
        assert_eq!(state.model.backlog().name, "Icebox");
    }

    #[test]
    fn test_failed_command_leaves_model() {
        let mut state = SessionState::default();
        let before = state.model.clone();
        assert!(state
            .execute(&RenameBacklog {
                name: String::new(),
            })
            .is_err());
        assert_eq!(state.model, before);
    }

    #[test]
    fn test_report_skips_cancellation() {
        let mut state = SessionState::default();
        state.report(&BoardError::Cancelled);
        assert!(state.error.is_none());

        state.report(&BoardError::Validation("no".to_string()));
        assert_eq!(state.error.as_ref().unwrap().kind, "validation");

        state.clear_error();
        assert!(state.error.is_none());
    }

    #[test]
    fn test_pending_links_dedup_and_forget() {
        let mut state = SessionState::default();
        let link = PendingLink {
            child: ItemId(2),
            parent: ItemId(1),
        };
        state.add_pending_link(link);
        state.add_pending_link(link);
        assert_eq!(state.pending_links.len(), 1);

        state.forget_links_of(ItemId(1));
        assert!(state.pending_links.is_empty());
    }
}
