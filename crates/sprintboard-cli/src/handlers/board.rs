use crate::cli::BoardArgs;
use crate::context::CliContext;
use crate::output;
use sprintboard_domain::{ItemFilters, ViewQuery};

pub fn build_query(args: BoardArgs) -> ViewQuery {
    ViewQuery {
        search: args.search.unwrap_or_default(),
        filters: ItemFilters {
            assignees: args.assignee.into_iter().collect(),
            unassigned: args.unassigned,
            statuses: args.status.into_iter().collect(),
            priorities: args.priority.into_iter().collect(),
            kinds: args.kind.into_iter().collect(),
            epics: args.item_epic.into_iter().collect(),
        },
        epic: args.epic,
    }
}

pub fn handle(ctx: &CliContext, args: BoardArgs) -> anyhow::Result<()> {
    let query = build_query(args);
    output::output_success(ctx.session.project(&query))
}
