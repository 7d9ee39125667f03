use crate::context::EngineContext;
use crate::errors::{Result, StrataError};
use clap::ValueEnum;
use std::collections::HashSet;

/// The subset of the forest a command acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    /// Just the starting branch
    Branch,
    /// The starting branch and all of its descendants, ancestors included
    Upstack,
    /// The starting branch and its ancestors up to trunk
    Downstack,
    /// Ancestors, the starting branch, and all descendants
    Fullstack,
}

/// An ordered slice of the branch forest.
///
/// Branches are listed root-first so a parent always precedes its children;
/// the trunk terminating the downward walk is recorded but never part of
/// the mutation set. Siblings appear in lexicographic name order.
#[derive(Debug)]
pub struct Stack {
    trunk: String,
    branches: Vec<String>,
}

impl Stack {
    /// Materialize the scope around `start`.
    ///
    /// Fails with a structural error when any encountered branch is
    /// untracked, points at a missing parent, or participates in a cycle.
    pub fn build(ctx: &EngineContext, start: &str, scope: Scope) -> Result<Stack> {
        if !ctx.git.branch_exists(start) {
            return Err(StrataError::stack(format!(
                "branch '{start}' does not exist"
            )));
        }

        let (ancestors, trunk) = chain_to_trunk(ctx, start)?;
        let start_is_trunk = ctx.is_trunk(start);

        let mut branches = Vec::new();
        match scope {
            Scope::Branch => {
                if !start_is_trunk {
                    branches.push(start.to_string());
                }
            }
            Scope::Upstack => {
                branches.extend(ancestors);
                if !start_is_trunk {
                    branches.push(start.to_string());
                }
                branches.extend(descendants(ctx, start)?);
            }
            Scope::Downstack => {
                branches.extend(ancestors);
                if !start_is_trunk {
                    branches.push(start.to_string());
                }
            }
            Scope::Fullstack => {
                branches.extend(ancestors);
                if !start_is_trunk {
                    branches.push(start.to_string());
                }
                branches.extend(descendants(ctx, start)?);
            }
        }

        Ok(Stack { trunk, branches })
    }

    /// The trunk branch terminating this stack's downward walk.
    pub fn trunk(&self) -> &str {
        &self.trunk
    }

    /// Member branches, root-first, trunk excluded.
    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.branches.iter().any(|b| b == name)
    }
}

/// Walk the parent chain from `start` up to a trunk. Returns the chain in
/// root-first order (trunk and `start` excluded) plus the trunk name.
fn chain_to_trunk(ctx: &EngineContext, start: &str) -> Result<(Vec<String>, String)> {
    if ctx.is_trunk(start) {
        return Ok((Vec::new(), start.to_string()));
    }

    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(start.to_string());

    let mut current = start.to_string();
    loop {
        let parent = ctx.meta.parent(&current)?.ok_or_else(|| {
            StrataError::stack(format!(
                "branch '{current}' is not tracked. Run 'strata track' on it first"
            ))
        })?;

        if !ctx.git.branch_exists(&parent) {
            return Err(StrataError::stack(format!(
                "parent '{parent}' of '{current}' does not exist in the repository"
            )));
        }

        if ctx.is_trunk(&parent) {
            chain.reverse();
            return Ok((chain, parent));
        }

        if !visited.insert(parent.clone()) {
            return Err(StrataError::stack(format!(
                "cycle detected in branch metadata at '{parent}'"
            )));
        }

        chain.push(parent.clone());
        current = parent;
    }
}

/// Depth-first pre-order walk of `start`'s descendants, siblings in name
/// order, `start` excluded.
fn descendants(ctx: &EngineContext, start: &str) -> Result<Vec<String>> {
    let mut result = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(start.to_string());

    let mut work: Vec<String> = Vec::new();
    for child in ctx.branch(start).children()?.iter().rev() {
        work.push(child.name().to_string());
    }

    while let Some(name) = work.pop() {
        if !seen.insert(name.clone()) {
            return Err(StrataError::stack(format!(
                "cycle detected in branch metadata at '{name}'"
            )));
        }
        for child in ctx.branch(&name).children()?.iter().rev() {
            work.push(child.name().to_string());
        }
        result.push(name);
    }

    Ok(result)
}
