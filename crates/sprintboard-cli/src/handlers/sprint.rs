use crate::cli::{SprintAction, SprintCreateArgs, SprintUpdateArgs};
use crate::context::CliContext;
use crate::output;
use sprintboard_core::BoardError;
use sprintboard_domain::{FieldUpdate, SprintId, SprintUpdate};
use sprintboard_session::SprintDraft;

pub async fn handle(ctx: &CliContext, action: SprintAction) -> anyhow::Result<()> {
    match action {
        SprintAction::Create(args) => {
            let id = ctx.session.create_sprint(build_draft(args)).await?;
            output_sprint(ctx, id)?;
        }
        SprintAction::Update(args) => {
            let id = args.id;
            ctx.session.update_sprint(id, build_update(args)).await?;
            output_sprint(ctx, id)?;
        }
        SprintAction::Start { id } => {
            ctx.session.start_sprint(id).await?;
            output_sprint(ctx, id)?;
        }
        SprintAction::Complete { id, to } => {
            let report = ctx.session.complete_sprint(id, to).await?;
            output::output_success(&report)?;
        }
        SprintAction::Delete { id } => {
            ctx.session.delete_sprint(id).await?;
            output::output_success(serde_json::json!({ "deleted": id }))?;
        }
    }
    Ok(())
}

fn build_draft(args: SprintCreateArgs) -> SprintDraft {
    SprintDraft {
        name: args.name,
        goal: args.goal,
        start_date: args.start,
        end_date: args.end,
        epic: args.epic,
    }
}

fn build_update(args: SprintUpdateArgs) -> SprintUpdate {
    SprintUpdate {
        name: args.name,
        goal: args.goal,
        start_date: FieldUpdate::from_flags(args.start, args.clear_start),
        end_date: FieldUpdate::from_flags(args.end, args.clear_end),
        epic: FieldUpdate::from_flags(args.epic, args.clear_epic),
    }
}

fn output_sprint(ctx: &CliContext, id: SprintId) -> anyhow::Result<()> {
    let model = ctx.session.model();
    let sprint = model
        .sprint(id)
        .ok_or_else(|| BoardError::NotFound(format!("Sprint {}", id)))?;
    output::output_success(sprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_build_update() {
        let update = build_update(SprintUpdateArgs {
            id: SprintId(1),
            name: None,
            goal: Some("Ship".to_string()),
            start: NaiveDate::from_ymd_opt(2026, 2, 2),
            clear_start: false,
            end: None,
            clear_end: true,
            epic: None,
            clear_epic: false,
        });
        assert_eq!(update.goal.as_deref(), Some("Ship"));
        assert!(matches!(update.start_date, FieldUpdate::Set(_)));
        assert!(matches!(update.end_date, FieldUpdate::Clear));
        assert!(matches!(update.epic, FieldUpdate::NoChange));
    }
}
