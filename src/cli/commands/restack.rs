use super::load_context;
use crate::cli::output::Output;
use crate::errors::{Result, StrataError};
use crate::stack::RestackEngine;

pub fn run(onto: Option<String>) -> Result<()> {
    let ctx = load_context()?;
    let current = ctx.current_branch()?;
    let engine = RestackEngine::new(&ctx);

    let summary = match onto {
        Some(target) => match engine.restack_onto(&current, &target) {
            Err(err @ StrataError::Validation { .. }) => {
                Output::tip(
                    "the recorded stack has diverged from Git's history; \
                     run 'strata restack' first, then retry with --onto",
                );
                return Err(err);
            }
            other => other?,
        },
        None => engine.restack(&current)?,
    };

    if summary.rebased.is_empty() {
        Output::info(format!("'{current}' has no descendants to restack"));
    } else {
        Output::success(format!("restacked {} branch(es)", summary.rebased.len()));
    }
    Ok(())
}
