use crate::cli::BacklogAction;
use crate::context::CliContext;
use crate::output;

pub async fn handle(ctx: &CliContext, action: BacklogAction) -> anyhow::Result<()> {
    match action {
        BacklogAction::Rename { name } => {
            ctx.session.rename_backlog(&name).await?;
            let model = ctx.session.model();
            output::output_success(serde_json::json!({ "name": model.backlog().name }))?;
        }
    }
    Ok(())
}
