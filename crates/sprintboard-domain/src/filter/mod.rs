//! Item filtering functionality.
//!
//! Provides the ItemFilter trait, its implementations, and the ItemFilters
//! settings struct used to build them.

pub mod item_filter;
pub mod item_filters;

pub use item_filter::{
    AssigneeFilter, CompositeFilter, EpicFilter, ItemFilter, KindFilter, PriorityFilter,
    StatusFilter,
};
pub use item_filters::ItemFilters;
