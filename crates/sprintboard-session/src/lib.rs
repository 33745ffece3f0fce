//! Session state for one project: the entity model, the error signal, and
//! the async intents that keep both in step with the remote API.

mod items;
mod optimistic;
mod session;
mod signal;
mod sprints;
mod state;

pub use items::ItemDraft;
pub use session::{Session, SessionConfig};
pub use signal::ErrorSignal;
pub use sprints::{CompletionReport, SprintDraft};
pub use state::{PendingLink, SessionState};
