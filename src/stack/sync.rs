use crate::context::EngineContext;
use crate::errors::{Result, StrataError};
use crate::meta::PrInfo;
use crate::providers::{PrState, PrStatus, PrStatusQuery, ReviewHost};
use chrono::Utc;
use tracing::debug;

/// Pull current PR state for a set of branches and merge it into meta.
///
/// Branches with no PR on the host produce no write. Read-side only; the
/// caller decides what a failure means for its operation.
pub fn refresh_pr_info(
    ctx: &EngineContext,
    host: &dyn ReviewHost,
    branches: &[String],
) -> Result<Vec<PrStatus>> {
    if branches.is_empty() {
        return Ok(Vec::new());
    }

    let query = PrStatusQuery {
        repo_owner: ctx.settings.repo.owner.clone(),
        repo_name: ctx.settings.repo.name.clone(),
        pr_head_branch_names: branches.to_vec(),
    };

    let statuses = host.fetch_statuses(&query)?;
    for status in &statuses {
        ctx.meta
            .upsert_pr_info(&status.head_branch_name, pr_info_from_status(status))?;
    }

    debug!(
        "refreshed PR info for {} of {} branch(es)",
        statuses.len(),
        branches.len()
    );
    Ok(statuses)
}

fn pr_info_from_status(status: &PrStatus) -> PrInfo {
    PrInfo {
        number: status.pr_number,
        url: status.url.clone(),
        base: status.base_branch_name.clone(),
        state: status.state,
        title: status.title.clone(),
        body: status.body.clone(),
        draft: status.is_draft,
        review_decision: status.review_decision.clone(),
        synced_at: Utc::now(),
    }
}

/// Branches whose PR has been merged or closed upstream, candidates for
/// pruning.
pub fn prunable_branches(ctx: &EngineContext) -> Result<Vec<(String, PrState)>> {
    let mut prunable = Vec::new();
    for name in ctx.meta.tracked_branches()? {
        if let Some(info) = ctx.meta.pr_info(&name)? {
            if matches!(info.state, PrState::Merged | PrState::Closed) {
                prunable.push((name, info.state));
            }
        }
    }
    Ok(prunable)
}

/// Remove a merged or closed branch: its children are reparented onto its
/// recorded parent, its meta is destroyed, and the local ref is deleted.
pub fn prune_branch(ctx: &EngineContext, name: &str) -> Result<()> {
    let branch = ctx.branch(name);
    let new_parent = match branch.parent_name()? {
        Some(p) => p,
        None => ctx
            .settings
            .repo
            .trunks
            .first()
            .cloned()
            .ok_or_else(|| StrataError::config("no trunk branches configured"))?,
    };

    for child in branch.children()? {
        debug!("reparenting '{}' onto '{}'", child.name(), new_parent);
        child.set_parent(&new_parent)?;
    }

    // Step off the branch before deleting its ref.
    if ctx.git.current_branch()?.as_deref() == Some(name) {
        ctx.git.checkout(&new_parent)?;
    }
    if ctx.git.branch_exists(name) {
        ctx.git.delete_branch(name)?;
    }
    ctx.meta.remove_branch(name)?;

    Ok(())
}
