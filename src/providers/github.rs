use super::client::HostClient;
use super::types::{
    PrState, PrStatus, PrStatusQuery, PrStatusResponse, SubmitBatchRequest, SubmitBatchResponse,
};
use super::{HostKind, ReviewHost};
use crate::errors::Result;
use tracing::debug;

/// GitHub review host, reached through the strata app server.
pub struct GitHubHost {
    client: HostClient,
}

impl GitHubHost {
    pub fn new(client: HostClient) -> Self {
        Self { client }
    }
}

impl ReviewHost for GitHubHost {
    fn name(&self) -> &'static str {
        "GitHub"
    }

    fn kind(&self) -> HostKind {
        HostKind::GitHub
    }

    fn format_pr_number(&self, number: u64) -> String {
        format!("#{number}")
    }

    fn submittable_states(&self) -> &'static [PrState] {
        &[PrState::Open]
    }

    fn submit_batch(&self, request: &SubmitBatchRequest) -> Result<SubmitBatchResponse> {
        debug!(
            "submitting {} pull request(s) for {}/{}",
            request.prs.len(),
            request.repo_owner,
            request.repo_name
        );
        self.client.post("pull-requests/submit", request)
    }

    fn fetch_statuses(&self, query: &PrStatusQuery) -> Result<Vec<PrStatus>> {
        debug!(
            "fetching PR status for {} branch(es) in {}/{}",
            query.pr_head_branch_names.len(),
            query.repo_owner,
            query.repo_name
        );
        let response: PrStatusResponse = self.client.post("pull-requests/info", query)?;
        Ok(response.prs)
    }
}
