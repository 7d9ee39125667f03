use super::builder::{Scope, Stack};
use super::validator;
use crate::cli::output::Output;
use crate::context::EngineContext;
use crate::errors::{Result, StrataError};
use crate::git::RebaseOutcome;
use tracing::debug;

/// Branches rewritten by a restack run, in traversal order.
#[derive(Debug, Default)]
pub struct RestackSummary {
    pub rebased: Vec<String>,
}

/// Rewrites descendant branches so each sits on its current parent's tip.
///
/// Before a branch is rebased, its tip is recorded as its prev-ref; the
/// range transplanted by the next rebase of that branch is
/// `(prev_ref, tip]`, the commits authored on it since the engine last
/// rewrote it. A branch never restacked before has no prev-ref and falls
/// back to the live merge base with its parent.
pub struct RestackEngine<'a> {
    ctx: &'a EngineContext,
}

impl<'a> RestackEngine<'a> {
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Restack every descendant of `origin`, depth-first, siblings in name
    /// order. The original branch is checked out again on success; on a
    /// conflict the traversal stops where Git stopped.
    pub fn restack(&self, origin: &str) -> Result<RestackSummary> {
        let mut summary = RestackSummary::default();
        self.traverse_children(origin, &mut summary)?;
        self.ctx.git.checkout(origin)?;
        Ok(summary)
    }

    /// Move `branch` onto `target` and restack its descendants.
    ///
    /// Requires the recorded stack to match Git's actual graph: moving a
    /// diverged stack would compound the divergence.
    pub fn restack_onto(&self, branch_name: &str, target: &str) -> Result<RestackSummary> {
        if self.ctx.is_trunk(branch_name) {
            return Err(StrataError::preconditions(format!(
                "'{branch_name}' is a trunk branch and is never rewritten"
            )));
        }
        if !self.ctx.git.branch_exists(target) {
            return Err(StrataError::preconditions(format!(
                "target branch '{target}' does not exist"
            )));
        }

        let stack = Stack::build(self.ctx, branch_name, Scope::Fullstack)?;
        validator::validate(self.ctx, &stack)?;

        // Moving onto a descendant would create a cycle in the recorded
        // tree: refuse if the target's parent chain passes through us.
        let mut seen = std::collections::HashSet::new();
        let mut cursor = Some(target.to_string());
        while let Some(name) = cursor {
            if name == branch_name {
                return Err(StrataError::preconditions(format!(
                    "cannot move '{branch_name}' onto its own descendant '{target}'"
                )));
            }
            if !seen.insert(name.clone()) {
                break;
            }
            cursor = self.ctx.meta.parent(&name)?;
        }

        self.require_clean_worktree()?;

        let branch = self.ctx.branch(branch_name);
        let parent = branch.parent_required()?;
        let merge_base = self.ctx.git.merge_base(branch_name, parent.name())?;

        branch.set_prev_ref(&branch.current_ref()?)?;
        self.ctx.git.checkout(branch_name)?;

        match self.ctx.git.rebase_onto(target, &merge_base, branch_name)? {
            RebaseOutcome::Clean => {}
            RebaseOutcome::Conflict { stderr } => {
                return Err(StrataError::RebaseConflict {
                    branch: branch_name.to_string(),
                    stderr,
                });
            }
        }

        branch.set_parent(target)?;
        Output::progress(format!("moved '{branch_name}' onto '{target}'"));

        let mut summary = RestackSummary::default();
        summary.rebased.push(branch_name.to_string());
        self.traverse_children(branch_name, &mut summary)?;
        self.ctx.git.checkout(branch_name)?;
        Ok(summary)
    }

    /// Iterative depth-first traversal: a branch's whole subtree is
    /// rewritten before its next sibling.
    fn traverse_children(&self, origin: &str, summary: &mut RestackSummary) -> Result<()> {
        let mut work: Vec<String> = Vec::new();
        for child in self.ctx.branch(origin).children()?.iter().rev() {
            work.push(child.name().to_string());
        }

        while let Some(name) = work.pop() {
            self.restack_branch(&name, summary)?;
            for child in self.ctx.branch(&name).children()?.iter().rev() {
                work.push(child.name().to_string());
            }
        }

        Ok(())
    }

    fn restack_branch(&self, name: &str, summary: &mut RestackSummary) -> Result<()> {
        if self.ctx.is_trunk(name) {
            return Err(StrataError::preconditions(format!(
                "'{name}' is a trunk branch and is never rewritten"
            )));
        }
        self.require_clean_worktree()?;

        let branch = self.ctx.branch(name);
        let parent = branch.parent_required()?;

        let merge_base = branch.meta_merge_base()?;
        debug!(
            "restacking '{}' onto '{}' (old base {})",
            name,
            parent.name(),
            &merge_base[..8.min(merge_base.len())]
        );

        // Record the tip before the rewrite; the next rebase of this
        // branch transplants exactly the commits above it.
        branch.set_prev_ref(&branch.current_ref()?)?;
        self.ctx.git.checkout(name)?;

        match self.ctx.git.rebase_onto(parent.name(), &merge_base, name)? {
            RebaseOutcome::Clean => {
                Output::progress(format!("restacked '{}' onto '{}'", name, parent.name()));
                summary.rebased.push(name.to_string());
                Ok(())
            }
            RebaseOutcome::Conflict { stderr } => Err(StrataError::RebaseConflict {
                branch: name.to_string(),
                stderr,
            }),
        }
    }

    fn require_clean_worktree(&self) -> Result<()> {
        if self.ctx.git.rebase_in_progress() {
            return Err(StrataError::preconditions(
                "a rebase is already in progress. Finish it with 'git rebase --continue' or 'git rebase --abort', then rerun",
            ));
        }
        if self.ctx.git.has_uncommitted_changes()? {
            return Err(StrataError::preconditions(
                "the working tree has uncommitted changes. Commit or stash them, then rerun",
            ));
        }
        Ok(())
    }
}
