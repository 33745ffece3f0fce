use im::Vector;
use serde::{Deserialize, Serialize};

use crate::ids::ItemId;

pub const DEFAULT_BACKLOG_NAME: &str = "Backlog";

/// The project's single container for items not scheduled in any sprint.
///
/// It always exists; it can be renamed but never created or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backlog {
    pub name: String,
    pub item_ids: Vector<ItemId>,
}

impl Backlog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            item_ids: Vector::new(),
        }
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.item_ids.contains(&item_id)
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

impl Default for Backlog {
    fn default() -> Self {
        Self::new(DEFAULT_BACKLOG_NAME)
    }
}
