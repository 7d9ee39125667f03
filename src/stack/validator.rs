use super::builder::Stack;
use crate::context::EngineContext;
use crate::errors::{Result, StrataError};
use std::collections::HashMap;
use tracing::debug;

/// How far back the first-parent walk looks before giving up on finding
/// the recorded parent's tip.
const ANCESTRY_LIMIT: usize = 10_000;

/// Check that the recorded tree matches Git's actual commit graph.
///
/// For every member of the stack, the recorded parent's tip must be
/// reachable in the member's first-parent history. The first divergence is
/// reported with the base actually found (a trunk tip or another stack
/// member's tip, whichever shows up first). Validation never mutates.
pub fn validate(ctx: &EngineContext, stack: &Stack) -> Result<()> {
    // Tips of every branch a diverged member could actually be based on.
    let mut tips: HashMap<String, String> = HashMap::new();
    for trunk in &ctx.settings.repo.trunks {
        if ctx.git.branch_exists(trunk) {
            tips.entry(ctx.git.branch_tip(trunk)?)
                .or_insert_with(|| trunk.clone());
        }
    }
    for name in stack.branches() {
        tips.entry(ctx.git.branch_tip(name)?)
            .or_insert_with(|| name.clone());
    }

    for name in stack.branches() {
        let branch = ctx.branch(name);
        let parent = branch.parent_required()?;
        let parent_tip = ctx.git.branch_tip(parent.name())?;
        let tip = branch.current_ref()?;

        // An empty branch sits exactly on its parent.
        if tip == parent_tip {
            continue;
        }

        let ancestry = ctx.git.first_parent_ancestry(name, ANCESTRY_LIMIT)?;
        let mut actual_base = None;
        let mut found = false;
        for sha in &ancestry {
            if *sha == parent_tip {
                found = true;
                break;
            }
            if let Some(other) = tips.get(sha) {
                if other != name {
                    actual_base = Some(other.clone());
                    break;
                }
            }
        }

        if !found {
            debug!(
                "branch '{}' diverged from recorded parent '{}'",
                name,
                parent.name()
            );
            return Err(StrataError::Validation {
                branch: name.clone(),
                expected_parent: parent.name().to_string(),
                actual_base: actual_base.unwrap_or_else(|| "(none)".to_string()),
            });
        }
    }

    Ok(())
}
