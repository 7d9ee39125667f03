use crate::context::EngineContext;
use crate::errors::{Result, StrataError};
use crate::meta::PrInfo;

/// A branch bound to its metadata and Git state.
///
/// Holds no data of its own beyond the name; every accessor reads through
/// the meta store or the Git adapter, so a `Branch` is never stale.
#[derive(Clone)]
pub struct Branch<'a> {
    ctx: &'a EngineContext,
    name: String,
}

impl<'a> Branch<'a> {
    pub fn new(ctx: &'a EngineContext, name: &str) -> Self {
        Self {
            ctx,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_trunk(&self) -> bool {
        self.ctx.is_trunk(&self.name)
    }

    /// The SHA this branch points at right now.
    pub fn current_ref(&self) -> Result<String> {
        self.ctx.git.branch_tip(&self.name)
    }

    /// The SHA recorded before the most recent engine rewrite, if any.
    pub fn prev_ref(&self) -> Result<Option<String>> {
        self.ctx.meta.prev_ref(&self.name)
    }

    pub fn set_prev_ref(&self, sha: &str) -> Result<()> {
        self.ctx.meta.set_prev_ref(&self.name, sha)
    }

    pub fn parent_name(&self) -> Result<Option<String>> {
        self.ctx.meta.parent(&self.name)
    }

    pub fn parent(&self) -> Result<Option<Branch<'a>>> {
        Ok(self.parent_name()?.map(|p| Branch::new(self.ctx, &p)))
    }

    /// The parent, or a preconditions failure: a non-trunk branch without
    /// parent meta is untracked and the engine cannot operate on it.
    pub fn parent_required(&self) -> Result<Branch<'a>> {
        self.parent()?.ok_or_else(|| {
            StrataError::preconditions(format!(
                "branch '{}' has no recorded parent. Run 'strata track' on it first",
                self.name
            ))
        })
    }

    pub fn set_parent(&self, parent: &str) -> Result<()> {
        self.ctx.meta.set_parent(&self.name, parent)
    }

    /// Tracked branches whose recorded parent is this branch, in
    /// lexicographic name order so traversals are reproducible.
    pub fn children(&self) -> Result<Vec<Branch<'a>>> {
        let mut children = Vec::new();
        for candidate in self.ctx.meta.tracked_branches()? {
            if self.ctx.meta.parent(&candidate)?.as_deref() == Some(self.name.as_str()) {
                children.push(Branch::new(self.ctx, &candidate));
            }
        }
        Ok(children)
    }

    /// The `old_base` for this branch's next rebase: this branch's own
    /// recorded prev-ref when set, else the live merge base with the
    /// parent. The fallback covers the first restack after a branch is
    /// created.
    pub fn meta_merge_base(&self) -> Result<String> {
        if let Some(sha) = self.prev_ref()? {
            return Ok(sha);
        }
        let parent = self.parent_required()?;
        self.ctx.git.merge_base(&self.name, parent.name())
    }

    pub fn pr_info(&self) -> Result<Option<PrInfo>> {
        self.ctx.meta.pr_info(&self.name)
    }

    pub fn upsert_pr_info(&self, info: PrInfo) -> Result<PrInfo> {
        self.ctx.meta.upsert_pr_info(&self.name, info)
    }
}

impl std::fmt::Debug for Branch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Branch").field("name", &self.name).finish()
    }
}
