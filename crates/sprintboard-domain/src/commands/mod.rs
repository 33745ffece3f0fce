use crate::EntityModel;
use sprintboard_core::BoardResult;

pub mod item_commands;
pub mod sprint_commands;

pub use item_commands::*;
pub use sprint_commands::*;

/// Trait for domain commands that compute a new model
///
/// Commands represent intent. Executing one never touches the input model;
/// it returns the model that should replace it, so the caller can keep the
/// input as a rollback snapshot.
pub trait Command: Send + Sync {
    /// Execute this command against a model, producing the next model
    fn execute(&self, model: &EntityModel) -> BoardResult<EntityModel>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}
