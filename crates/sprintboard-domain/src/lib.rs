pub mod backlog;
pub mod commands;
pub mod container;
pub mod field_change;
pub mod field_update;
pub mod filter;
pub mod ids;
pub mod item;
pub mod lifecycle;
pub mod model;
pub mod mutation;
pub mod project;
pub mod projection;
pub mod search;
pub mod sprint;

pub use backlog::{Backlog, DEFAULT_BACKLOG_NAME};
pub use container::{ContainerId, Location};
pub use field_change::FieldChange;
pub use field_update::FieldUpdate;
pub use filter::{ItemFilter, ItemFilters};
pub use ids::{EpicId, ItemId, ProjectId, SprintId, UserId};
pub use item::{Item, ItemFields, ItemKind, ItemPatch, ItemStatus, Priority};
pub use lifecycle::{scheduled_dates, CompletionPlan, StartTransition};
pub use model::EntityModel;
pub use mutation::{plan_move, DropTarget, MovePlan};
pub use project::{Epic, User};
pub use projection::{SprintView, ViewProjection, ViewQuery};
pub use search::ItemSearcher;
pub use sprint::{Sprint, SprintFields, SprintState, SprintUpdate};
