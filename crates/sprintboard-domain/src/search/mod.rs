//! Free-text search over items.
//!
//! A search term matches an item when it is a case-insensitive substring of
//! the title or of the numeric identifier. A leading `#` on the term is
//! ignored for identifier matching, so `#12` and `12` are the same query.

use crate::Item;

pub trait ItemSearcher {
    fn matches(&self, item: &Item) -> bool;
}

/// Which part of an item a term is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Identifier,
}

/// One normalised term bound to one field. An empty term matches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSearch {
    field: SearchField,
    needle: String,
}

impl FieldSearch {
    pub fn new(field: SearchField, term: &str) -> Self {
        let term = term.trim();
        let needle = match field {
            SearchField::Title => term.to_lowercase(),
            SearchField::Identifier => term.trim_start_matches('#').to_string(),
        };
        Self { field, needle }
    }

    pub fn title(term: &str) -> Self {
        Self::new(SearchField::Title, term)
    }

    pub fn identifier(term: &str) -> Self {
        Self::new(SearchField::Identifier, term)
    }
}

impl ItemSearcher for FieldSearch {
    fn matches(&self, item: &Item) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        match self.field {
            SearchField::Title => item.title.to_lowercase().contains(&self.needle),
            SearchField::Identifier => item.id.0.to_string().contains(&self.needle),
        }
    }
}

/// Matches when any of its searches does, or always when it holds none.
#[derive(Debug, Clone, Default)]
pub struct CompositeSearcher {
    searches: Vec<FieldSearch>,
}

impl CompositeSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The board search box: title or identifier.
    pub fn all(term: &str) -> Self {
        Self::new()
            .with_search(FieldSearch::title(term))
            .with_search(FieldSearch::identifier(term))
    }

    pub fn with_search(mut self, search: FieldSearch) -> Self {
        self.searches.push(search);
        self
    }
}

impl ItemSearcher for CompositeSearcher {
    fn matches(&self, item: &Item) -> bool {
        self.searches.is_empty() || self.searches.iter().any(|s| s.matches(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemId, UserId};

    #[test]
    fn title_is_case_insensitive() {
        let item = Item::new(ItemId(1), "Fix authentication bug", UserId(1));

        assert!(FieldSearch::title("AUTH").matches(&item));
        assert!(FieldSearch::title("  bug ").matches(&item));
        assert!(!FieldSearch::title("database").matches(&item));
        assert!(FieldSearch::title("").matches(&item));
    }

    #[test]
    fn identifier_ignores_hash_prefix() {
        let item = Item::new(ItemId(1234), "Anything", UserId(1));

        assert!(FieldSearch::identifier("23").matches(&item));
        assert!(FieldSearch::identifier("#1234").matches(&item));
        assert!(!FieldSearch::identifier("99").matches(&item));
    }

    #[test]
    fn composite_matches_either_field() {
        let item = Item::new(ItemId(42), "Fix bug", UserId(1));

        assert!(CompositeSearcher::all("bug").matches(&item));
        assert!(CompositeSearcher::all("#42").matches(&item));
        assert!(!CompositeSearcher::all("login").matches(&item));
        assert!(CompositeSearcher::new().matches(&item));
    }
}
