use super::load_context;
use crate::cli::output::Output;
use crate::errors::{Result, StrataError};
use dialoguer::Select;

pub fn run(parent: Option<String>) -> Result<()> {
    let ctx = load_context()?;
    let current = ctx.current_branch()?;

    if ctx.is_trunk(&current) {
        return Err(StrataError::preconditions(format!(
            "'{current}' is a trunk branch and is not tracked"
        )));
    }

    let parent = match parent {
        Some(p) => p,
        None => pick_parent(&ctx, &current)?,
    };

    if parent == current {
        return Err(StrataError::preconditions(
            "a branch cannot be its own parent",
        ));
    }
    if !ctx.git.branch_exists(&parent) {
        return Err(StrataError::preconditions(format!(
            "parent branch '{parent}' does not exist"
        )));
    }
    if !ctx.is_trunk(&parent) && ctx.meta.parent(&parent)?.is_none() {
        return Err(StrataError::preconditions(format!(
            "parent '{parent}' is neither a trunk nor a tracked branch. Track it first"
        )));
    }

    ctx.meta.set_parent(&current, &parent)?;
    Output::success(format!("tracking '{current}' on top of '{parent}'"));
    Ok(())
}

pub fn untrack(branch: Option<String>) -> Result<()> {
    let ctx = load_context()?;
    let branch = match branch {
        Some(b) => b,
        None => ctx.current_branch()?,
    };

    let target = ctx.branch(&branch);
    let Some(new_parent) = target.parent_name()? else {
        Output::info(format!("'{branch}' is not tracked"));
        return Ok(());
    };

    // Children keep a working chain by moving onto this branch's parent.
    for child in target.children()? {
        child.set_parent(&new_parent)?;
        Output::sub_item(format!(
            "reparented '{}' onto '{}'",
            child.name(),
            new_parent
        ));
    }

    ctx.meta.remove_branch(&branch)?;
    Output::success(format!("stopped tracking '{branch}'"));
    Ok(())
}

/// Choose a parent interactively from trunks and tracked branches; fall
/// back to the first trunk when not attached to a terminal.
fn pick_parent(ctx: &crate::context::EngineContext, current: &str) -> Result<String> {
    let mut candidates: Vec<String> = ctx.settings.repo.trunks.clone();
    for tracked in ctx.meta.tracked_branches()? {
        if tracked != current {
            candidates.push(tracked);
        }
    }

    if !ctx.interactive || candidates.len() == 1 {
        return Ok(candidates[0].clone());
    }

    let index = Select::new()
        .with_prompt(format!("Parent for '{current}'"))
        .items(&candidates)
        .default(0)
        .interact()
        .map_err(|_| StrataError::Killed)?;

    Ok(candidates[index].clone())
}
