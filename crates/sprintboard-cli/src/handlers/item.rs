use crate::cli::{ItemAction, ItemCreateArgs, ItemMoveArgs};
use crate::context::CliContext;
use crate::output;
use sprintboard_core::BoardError;
use sprintboard_domain::{DropTarget, FieldChange, ItemId, ViewQuery};
use sprintboard_session::ItemDraft;

pub async fn handle(ctx: &CliContext, action: ItemAction) -> anyhow::Result<()> {
    match action {
        ItemAction::Move(args) => {
            let id = args.id;
            handle_move(ctx, args).await?;
            output_item(ctx, id)?;
        }
        ItemAction::Set { id, field, value } => {
            let change = FieldChange::parse(&field, &value)?;
            ctx.session.apply_field_update(id, change).await?;
            output_item(ctx, id)?;
        }
        ItemAction::Create(args) => {
            let id = ctx.session.create_item(build_draft(args)).await?;
            output_item(ctx, id)?;
        }
        ItemAction::Delete { id } => {
            ctx.session.delete_item(id).await?;
            output::output_success(serde_json::json!({ "deleted": id }))?;
        }
        ItemAction::Subtask { parent, title } => {
            let id = ctx.session.create_subtask(parent, &title).await?;
            output_item(ctx, id)?;
        }
        ItemAction::Subtasks { parent } => {
            let ids = ctx.session.load_subtasks(parent).await?;
            let model = ctx.session.model();
            let items = ids.iter().filter_map(|id| model.item(*id).cloned()).collect();
            output::output_list(items)?;
        }
    }
    Ok(())
}

async fn handle_move(ctx: &CliContext, args: ItemMoveArgs) -> anyhow::Result<()> {
    let model = ctx.session.model();
    let source = match args.from {
        Some(source) => source,
        None => model
            .location_of(args.id)
            .container()
            .ok_or_else(|| BoardError::NotFound(format!("Item {}", args.id)))?,
    };

    let drop = match (args.index, args.before) {
        (Some(index), _) => match args.search {
            Some(term) => {
                let view = ctx.session.project(&ViewQuery::search(term));
                view.canonical_drop_index(&model, args.to, args.id, index)
                    .map(DropTarget::Index)
            }
            None => Some(DropTarget::Index(index)),
        },
        (None, Some(before)) => Some(DropTarget::OnItem(before)),
        (None, None) => None,
    };

    ctx.session.move_item(args.id, source, args.to, drop).await?;
    Ok(())
}

fn build_draft(args: ItemCreateArgs) -> ItemDraft {
    let mut draft = ItemDraft::new(args.title, args.container);
    if let Some(kind) = args.kind {
        draft.kind = kind;
    }
    if let Some(status) = args.status {
        draft.status = status;
    }
    if let Some(priority) = args.priority {
        draft.priority = priority;
    }
    draft.description = args.description;
    draft.epic = args.epic;
    draft
}

fn output_item(ctx: &CliContext, id: ItemId) -> anyhow::Result<()> {
    let model = ctx.session.model();
    let item = model
        .item(id)
        .ok_or_else(|| BoardError::NotFound(format!("Item {}", id)))?;
    output::output_success(serde_json::json!({
        "item": item,
        "location": model.location_of(id),
    }))
}
