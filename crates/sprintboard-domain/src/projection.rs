//! Derived, filtered views over the entity model.
//!
//! A [`ViewProjection`] is recomputed from the model on demand and never
//! written back. Ordering is the stored display order.

use im::HashMap;
use serde::Serialize;

use crate::container::ContainerId;
use crate::filter::{ItemFilter, ItemFilters};
use crate::ids::{EpicId, ItemId, SprintId};
use crate::item::Item;
use crate::model::EntityModel;
use crate::search::{CompositeSearcher, ItemSearcher};
use crate::sprint::SprintState;

/// What the user asked to see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewQuery {
    pub search: String,
    pub filters: ItemFilters,
    /// Restrict the sprint list to sprints of this epic.
    pub epic: Option<EpicId>,
}

impl ViewQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && !self.filters.has_active_filters() && self.epic.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SprintView {
    pub id: SprintId,
    pub name: String,
    pub state: SprintState,
    /// Visible members, in display order.
    pub item_ids: Vec<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewProjection {
    /// The visible subset of the item map.
    pub items: HashMap<ItemId, Item>,
    pub backlog_name: String,
    pub backlog: Vec<ItemId>,
    pub sprints: Vec<SprintView>,
}

impl ViewProjection {
    pub fn compute(model: &EntityModel, query: &ViewQuery) -> Self {
        let searcher = CompositeSearcher::all(query.search.trim());
        let filter = query.filters.to_filter();

        let items: HashMap<ItemId, Item> = model
            .items()
            .iter()
            .filter(|(_, item)| searcher.matches(item) && filter.matches(item))
            .map(|(id, item)| (*id, item.clone()))
            .collect();

        let visible = |ids: &im::Vector<ItemId>| -> Vec<ItemId> {
            ids.iter().filter(|id| items.contains_key(*id)).copied().collect()
        };

        let backlog = visible(&model.backlog().item_ids);
        let sprints = model
            .sprints()
            .iter()
            .filter(|sprint| query.epic.is_none() || sprint.epic == query.epic)
            .map(|sprint| SprintView {
                id: sprint.id,
                name: sprint.name.clone(),
                state: sprint.state(),
                item_ids: visible(&sprint.item_ids),
            })
            .collect();

        Self {
            items,
            backlog_name: model.backlog().name.clone(),
            backlog,
            sprints,
        }
    }

    /// Visible members of a container, or `None` if it is not in the view.
    pub fn visible_ids(&self, container: ContainerId) -> Option<&[ItemId]> {
        match container {
            ContainerId::Backlog => Some(&self.backlog),
            ContainerId::Sprint(id) => self
                .sprints
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.item_ids.as_slice()),
        }
    }

    pub fn sprint(&self, id: SprintId) -> Option<&SprintView> {
        self.sprints.iter().find(|s| s.id == id)
    }

    /// Translate a drop position in the visible list of `container` into an
    /// index in the container's canonical order.
    ///
    /// Both orders are taken with `moving` already removed, which is what
    /// `DropTarget::Index` expects. Dropping at a visible position lands in
    /// front of the item shown there; dropping past the last visible item
    /// lands right after it, ahead of any hidden items that follow.
    pub fn canonical_drop_index(
        &self,
        model: &EntityModel,
        container: ContainerId,
        moving: ItemId,
        visible_index: usize,
    ) -> Option<usize> {
        let canonical: Vec<ItemId> = model
            .item_ids_in(container)?
            .iter()
            .copied()
            .filter(|id| *id != moving)
            .collect();
        let visible: Vec<ItemId> = self
            .visible_ids(container)
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|id| *id != moving)
            .collect();

        let position = |id: ItemId| canonical.iter().position(|c| *c == id);
        if let Some(anchor) = visible.get(visible_index) {
            return position(*anchor).or(Some(canonical.len()));
        }
        match visible.last() {
            Some(last) => position(*last).map(|i| i + 1).or(Some(canonical.len())),
            None => Some(canonical.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::{plan_move, DropTarget};
    use crate::{ItemStatus, ProjectId, Sprint, UserId};

    fn model() -> EntityModel {
        let titles = ["Login page", "Logout", "Billing", "Login API", "Reports"];
        let records = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                let mut item = Item::new(ItemId(i as u64 + 1), *title, UserId(1));
                if i % 2 == 1 {
                    item.status = ItemStatus::Done;
                }
                (item, None)
            })
            .collect();
        let mut sprint = Sprint::new(SprintId(9), "Sprint 9");
        sprint.epic = Some(EpicId(2));
        EntityModel::from_records(
            ProjectId(1),
            "Backlog",
            vec![sprint, Sprint::new(SprintId(10), "Sprint 10")],
            records,
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_search_never_changes_model() {
        let model = model();
        let before = model.items().len();

        let view = ViewProjection::compute(&model, &ViewQuery::search("login"));

        assert_eq!(model.items().len(), before);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.backlog, vec![ItemId(1), ItemId(4)]);
    }

    #[test]
    fn test_empty_query_shows_everything_in_order() {
        let model = model();
        let view = ViewProjection::compute(&model, &ViewQuery::default());
        assert_eq!(view.items.len(), 5);
        assert_eq!(
            view.backlog,
            vec![ItemId(1), ItemId(2), ItemId(3), ItemId(4), ItemId(5)]
        );
        assert_eq!(view.sprints.len(), 2);
        assert_eq!(view.backlog_name, "Backlog");
    }

    #[test]
    fn test_status_filter_and_epic_restriction() {
        let model = model();
        let mut query = ViewQuery::default();
        query.filters.statuses.insert(ItemStatus::Done);
        query.epic = Some(EpicId(2));

        let view = ViewProjection::compute(&model, &query);
        assert_eq!(view.backlog, vec![ItemId(2), ItemId(4)]);
        assert_eq!(view.sprints.len(), 1);
        assert_eq!(view.sprints[0].id, SprintId(9));
        assert!(view.sprint(SprintId(10)).is_none());
    }

    #[test]
    fn test_canonical_drop_index_under_filter() {
        let model = model();
        // Visible: [1, 4]; canonical: [1, 2, 3, 4, 5]
        let view = ViewProjection::compute(&model, &ViewQuery::search("login"));

        // Move 5 in front of the second visible item (4)
        let index = view
            .canonical_drop_index(&model, ContainerId::Backlog, ItemId(5), 1)
            .unwrap();
        assert_eq!(index, 3);

        let plan = plan_move(
            &model,
            ItemId(5),
            ContainerId::Backlog,
            ContainerId::Backlog,
            Some(DropTarget::Index(index)),
        )
        .unwrap();
        let order: Vec<_> = plan.model().unwrap().backlog().item_ids.iter().copied().collect();
        assert_eq!(
            order,
            vec![ItemId(1), ItemId(2), ItemId(3), ItemId(5), ItemId(4)]
        );

        // Past the end of the visible list: right after item 4
        let index = view
            .canonical_drop_index(&model, ContainerId::Backlog, ItemId(2), 2)
            .unwrap();
        assert_eq!(index, 3);
    }

    #[test]
    fn test_canonical_drop_index_into_empty_view() {
        let model = model();
        let view = ViewProjection::compute(&model, &ViewQuery::search("nothing matches"));
        assert_eq!(
            view.canonical_drop_index(&model, ContainerId::Sprint(SprintId(9)), ItemId(1), 0),
            Some(0)
        );
        assert_eq!(
            view.canonical_drop_index(&model, ContainerId::Sprint(SprintId(77)), ItemId(1), 0),
            None
        );
    }
}
