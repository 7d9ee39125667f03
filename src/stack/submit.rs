use super::builder::{Scope, Stack};
use super::sync;
use crate::context::EngineContext;
use crate::errors::{Result, StrataError};
use crate::meta::PrInfo;
use crate::providers::{
    PrState, PrSubmitEntry, PrSubmitResult, ReviewHost, SubmitAction, SubmitBatchRequest,
    SubmitStatus,
};
use chrono::Utc;
use dialoguer::Confirm;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub scope: Scope,
    pub draft: bool,
    pub merge_when_ready: bool,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// The batch went out; per-branch results as reported by the host.
    Submitted { results: Vec<PrSubmitResult> },
    /// Non-interactive run hit an empty branch: nothing was sent.
    AbortedEmpty { branch: String },
    /// The scope resolved to no branches.
    NothingToSubmit,
}

/// Turns a validated stack into one batched review-host call and writes
/// the responses back into meta.
pub struct SubmitPipeline<'a> {
    ctx: &'a EngineContext,
    host: &'a dyn ReviewHost,
}

impl<'a> SubmitPipeline<'a> {
    pub fn new(ctx: &'a EngineContext, host: &'a dyn ReviewHost) -> Self {
        Self { ctx, host }
    }

    pub fn run(&self, start: &str, opts: &SubmitOptions) -> Result<SubmitOutcome> {
        // 1. Resolve the scope; trunk is never submitted.
        let stack = Stack::build(self.ctx, start, opts.scope)?;
        let branches: Vec<String> = stack.branches().to_vec();
        if branches.is_empty() {
            return Ok(SubmitOutcome::NothingToSubmit);
        }

        // 2. Refresh remote state so the gate below never runs stale.
        sync::refresh_pr_info(self.ctx, self.host, &branches)?;

        // 3. Hard stop on merged or closed PRs anywhere in the batch.
        self.gate_on_remote_state(&branches)?;

        // 4. Empty branches: ask when interactive, otherwise send nothing.
        if let Some(outcome) = self.check_empty_branches(&branches)? {
            return Ok(outcome);
        }

        // 5. Assemble the per-branch request set.
        let entries = self.assemble_requests(&branches, opts)?;

        // 6. One batched call for the whole stack.
        let request = SubmitBatchRequest {
            repo_owner: self.ctx.settings.repo.owner.clone(),
            repo_name: self.ctx.settings.repo.name.clone(),
            trunk_branch_name: stack.trunk().to_string(),
            merge_when_ready: opts.merge_when_ready,
            prs: entries.clone(),
        };
        let response = self.host.submit_batch(&request)?;

        // 7. Apply successful responses, then surface the first error.
        self.apply_responses(&entries, &response.prs)?;

        Ok(SubmitOutcome::Submitted {
            results: response.prs,
        })
    }

    fn gate_on_remote_state(&self, branches: &[String]) -> Result<()> {
        for name in branches {
            let Some(info) = self.ctx.branch(name).pr_info()? else {
                continue;
            };
            if self.host.submittable_states().contains(&info.state) {
                continue;
            }
            return Err(match info.state {
                PrState::Merged => StrataError::PullRequestMerged {
                    branch: name.clone(),
                },
                PrState::Closed | PrState::Open => StrataError::PullRequestClosed {
                    branch: name.clone(),
                },
            });
        }
        Ok(())
    }

    fn check_empty_branches(&self, branches: &[String]) -> Result<Option<SubmitOutcome>> {
        for name in branches {
            let parent = self.ctx.branch(name).parent_required()?;
            if !self.ctx.git.is_branch_empty(name, parent.name())? {
                continue;
            }
            if !self.ctx.interactive {
                debug!("empty branch '{}' in non-interactive submit", name);
                return Ok(Some(SubmitOutcome::AbortedEmpty {
                    branch: name.clone(),
                }));
            }
            let proceed = Confirm::new()
                .with_prompt(format!(
                    "Branch '{}' has no changes relative to '{}'. Submit it anyway?",
                    name,
                    parent.name()
                ))
                .default(false)
                .interact()
                .map_err(|_| StrataError::Killed)?;
            if !proceed {
                return Err(StrataError::Killed);
            }
        }
        Ok(None)
    }

    fn assemble_requests(
        &self,
        branches: &[String],
        opts: &SubmitOptions,
    ) -> Result<Vec<PrSubmitEntry>> {
        let mut entries = Vec::with_capacity(branches.len());
        for name in branches {
            let branch = self.ctx.branch(name);
            let parent = branch.parent_required()?;

            let entry = if branch.pr_info()?.is_none() {
                let message = self.ctx.git.tip_message(name)?;
                let (title, body) = split_commit_message(&message);
                let reviewers = &self.ctx.settings.review.default_reviewers;
                PrSubmitEntry {
                    action: SubmitAction::Create,
                    head: name.clone(),
                    base: parent.name().to_string(),
                    title: Some(title),
                    body,
                    draft: Some(opts.draft),
                    reviewers: (!reviewers.is_empty()).then(|| reviewers.clone()),
                }
            } else {
                PrSubmitEntry {
                    action: SubmitAction::Update,
                    head: name.clone(),
                    base: parent.name().to_string(),
                    title: None,
                    body: None,
                    draft: None,
                    reviewers: None,
                }
            };
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Write every successful response into meta, then raise the first
    /// per-branch error, if any. Successful peers of a failed entry keep
    /// their updated meta.
    fn apply_responses(
        &self,
        entries: &[PrSubmitEntry],
        results: &[PrSubmitResult],
    ) -> Result<()> {
        let by_head: HashMap<&str, &PrSubmitEntry> =
            entries.iter().map(|e| (e.head.as_str(), e)).collect();

        let mut first_error: Option<StrataError> = None;
        for result in results {
            if result.status == SubmitStatus::Error {
                if first_error.is_none() {
                    first_error = Some(StrataError::Submit {
                        branch: result.head.clone(),
                        message: result
                            .error
                            .clone()
                            .unwrap_or_else(|| "unknown error".to_string()),
                    });
                }
                continue;
            }

            let Some(entry) = by_head.get(result.head.as_str()) else {
                debug!("response for unknown head '{}' ignored", result.head);
                continue;
            };
            let (Some(number), Some(url)) = (result.pr_number, result.pr_url.clone()) else {
                if first_error.is_none() {
                    first_error = Some(StrataError::Submit {
                        branch: result.head.clone(),
                        message: "response is missing the PR number or URL".to_string(),
                    });
                }
                continue;
            };

            self.ctx.meta.upsert_pr_info(
                &result.head,
                PrInfo {
                    number,
                    url,
                    base: entry.base.clone(),
                    state: PrState::Open,
                    title: entry.title.clone(),
                    body: entry.body.clone(),
                    draft: entry.draft,
                    review_decision: None,
                    synced_at: Utc::now(),
                },
            )?;
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Split a commit message into a PR title (subject line) and body.
fn split_commit_message(message: &str) -> (String, Option<String>) {
    let mut lines = message.lines();
    let title = lines.next().unwrap_or("").to_string();
    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    let body = (!body.is_empty()).then_some(body);
    (title, body)
}
