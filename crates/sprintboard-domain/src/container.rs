use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ids::SprintId;

/// Something that holds an ordered list of item ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerId {
    Backlog,
    Sprint(SprintId),
}

impl ContainerId {
    /// The value the remote API stores in an item's `sprint` field.
    pub fn sprint_id(self) -> Option<SprintId> {
        match self {
            Self::Backlog => None,
            Self::Sprint(id) => Some(id),
        }
    }
}

impl From<Option<SprintId>> for ContainerId {
    fn from(sprint: Option<SprintId>) -> Self {
        match sprint {
            Some(id) => Self::Sprint(id),
            None => Self::Backlog,
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backlog => f.write_str("backlog"),
            Self::Sprint(id) => write!(f, "sprint:{}", id),
        }
    }
}

impl FromStr for ContainerId {
    type Err = String;

    /// Accepts `backlog`, `sprint:<id>` or a bare sprint id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("backlog") {
            return Ok(Self::Backlog);
        }
        let raw = trimmed.strip_prefix("sprint:").unwrap_or(trimmed);
        raw.parse::<SprintId>()
            .map(Self::Sprint)
            .map_err(|_| format!("Invalid container '{}'. Use 'backlog' or 'sprint:<id>'", s))
    }
}

/// Where an item currently lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Location {
    Backlog,
    Sprint { id: SprintId, name: String },
    /// The item is not attached to any container.
    Unknown,
}

impl Location {
    pub fn container(&self) -> Option<ContainerId> {
        match self {
            Self::Backlog => Some(ContainerId::Backlog),
            Self::Sprint { id, .. } => Some(ContainerId::Sprint(*id)),
            Self::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_container() {
        assert_eq!("backlog".parse::<ContainerId>(), Ok(ContainerId::Backlog));
        assert_eq!(
            "sprint:4".parse::<ContainerId>(),
            Ok(ContainerId::Sprint(SprintId(4)))
        );
        assert_eq!("4".parse::<ContainerId>(), Ok(ContainerId::Sprint(SprintId(4))));
        assert!("sprint:x".parse::<ContainerId>().is_err());
    }

    #[test]
    fn test_container_display_roundtrip() {
        for container in [ContainerId::Backlog, ContainerId::Sprint(SprintId(12))] {
            assert_eq!(container.to_string().parse::<ContainerId>(), Ok(container));
        }
    }
}
