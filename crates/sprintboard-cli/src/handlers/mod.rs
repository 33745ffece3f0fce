pub mod backlog;
pub mod board;
pub mod item;
pub mod sprint;
