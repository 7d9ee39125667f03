use super::load_context;
use crate::cli::output::Output;
use crate::errors::{Result, StrataError};
use crate::stack::sync;
use crate::utils::spinner::Spinner;
use dialoguer::Confirm;

pub fn run(no_prune: bool) -> Result<()> {
    let ctx = load_context()?;
    ctx.settings.validate()?;
    let host = ctx.review_host()?;

    let branches = ctx.meta.tracked_branches()?;
    if branches.is_empty() {
        Output::info("no tracked branches");
        return Ok(());
    }

    let spinner = Spinner::new("Refreshing pull request info...".to_string());
    let statuses = sync::refresh_pr_info(&ctx, host.as_ref(), &branches);
    spinner.stop();
    let statuses = statuses?;

    Output::success(format!(
        "refreshed PR info for {} of {} tracked branch(es)",
        statuses.len(),
        branches.len()
    ));

    if no_prune {
        return Ok(());
    }

    let prunable = sync::prunable_branches(&ctx)?;
    if prunable.is_empty() {
        return Ok(());
    }

    if !ctx.interactive {
        for (name, state) in &prunable {
            Output::warning(format!("branch '{name}' has a {state} pull request"));
        }
        Output::tip("run 'strata sync' from a terminal to prune these branches");
        return Ok(());
    }

    for (name, state) in prunable {
        let confirm = Confirm::new()
            .with_prompt(format!(
                "The pull request for '{name}' is {state}. Delete the local branch?"
            ))
            .default(false)
            .interact()
            .map_err(|_| StrataError::Killed)?;

        if confirm {
            sync::prune_branch(&ctx, &name)?;
            Output::success(format!("pruned '{name}'"));
        }
    }

    Ok(())
}
