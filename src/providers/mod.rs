pub mod client;
pub mod github;
pub mod types;

use crate::config::{Settings, UserConfig};
use crate::errors::{Result, StrataError};
use client::HostClient;
pub use types::{
    HostKind, PrState, PrStatus, PrStatusQuery, PrSubmitEntry, PrSubmitResult, SubmitAction,
    SubmitBatchRequest, SubmitBatchResponse, SubmitStatus,
};

/// Capability set a review host exposes to the engine.
///
/// The engine never branches on the host kind; anything host-specific lives
/// behind these methods.
pub trait ReviewHost {
    /// Display name of the host.
    fn name(&self) -> &'static str;

    /// Which host this is.
    fn kind(&self) -> HostKind;

    /// Render a PR number the way the host displays it.
    fn format_pr_number(&self, number: u64) -> String;

    /// PR states a branch may be in and still be submitted.
    fn submittable_states(&self) -> &'static [PrState];

    /// Submit a whole stack in one batched call.
    fn submit_batch(&self, request: &SubmitBatchRequest) -> Result<SubmitBatchResponse>;

    /// Fetch current PR state for a set of head branch names.
    fn fetch_statuses(&self, query: &PrStatusQuery) -> Result<Vec<PrStatus>>;
}

pub type DynReviewHost = Box<dyn ReviewHost>;

/// Build the review host named by the repo config.
pub fn create_host(settings: &Settings, user: &UserConfig) -> Result<DynReviewHost> {
    let token = user.auth_token.as_deref().ok_or_else(|| {
        StrataError::config(
            "no auth token configured. Run 'strata config set auth.token <token>'",
        )
    })?;

    match settings.review.host {
        HostKind::GitHub => {
            let client = HostClient::new(&user.app_server_url, token)?;
            Ok(Box::new(github::GitHubHost::new(client)))
        }
        HostKind::GitLab => Err(StrataError::config(
            "GitLab review host is not yet implemented",
        )),
    }
}
