use super::load_context;
use crate::cli::output::Output;
use crate::errors::Result;
use crate::providers::SubmitStatus;
use crate::stack::{Scope, SubmitOptions, SubmitOutcome, SubmitPipeline};

pub fn run(scope: Scope, draft: bool, merge_when_ready: bool) -> Result<()> {
    let ctx = load_context()?;
    ctx.settings.validate()?;
    let current = ctx.current_branch()?;
    let host = ctx.review_host()?;

    let pipeline = SubmitPipeline::new(&ctx, host.as_ref());
    let opts = SubmitOptions {
        scope,
        draft,
        merge_when_ready,
    };

    match pipeline.run(&current, &opts)? {
        SubmitOutcome::Submitted { results } => {
            Output::success(format!("submitted {} pull request(s)", results.len()));
            for result in &results {
                let number = result
                    .pr_number
                    .map(|n| host.format_pr_number(n))
                    .unwrap_or_default();
                let verb = match result.status {
                    SubmitStatus::Created => "created",
                    SubmitStatus::Updated => "updated",
                    SubmitStatus::Error => "failed",
                };
                let url = result.pr_url.as_deref().unwrap_or("");
                Output::sub_item(format!("{}: {verb} {number} {url}", result.head));
            }
        }
        SubmitOutcome::AbortedEmpty { branch } => {
            Output::warning(format!(
                "branch '{branch}' has no changes relative to its parent; nothing was submitted"
            ));
        }
        SubmitOutcome::NothingToSubmit => {
            Output::info("no branches to submit in this scope");
        }
    }

    Ok(())
}
