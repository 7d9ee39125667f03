use serde::{Deserialize, Serialize};

/// Review host kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    GitHub,
    GitLab,
}

impl std::fmt::Display for HostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostKind::GitHub => write!(f, "GitHub"),
            HostKind::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Remote pull request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrState {
    Open,
    Merged,
    Closed,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrState::Open => write!(f, "open"),
            PrState::Merged => write!(f, "merged"),
            PrState::Closed => write!(f, "closed"),
        }
    }
}

/// Whether a batch entry creates a new PR or updates an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitAction {
    Create,
    Update,
}

/// One branch's entry in a submit batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrSubmitEntry {
    pub action: SubmitAction,
    pub head: String,
    pub base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewers: Option<Vec<String>>,
}

/// Batched submit request: one call carries the whole stack
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBatchRequest {
    pub repo_owner: String,
    pub repo_name: String,
    pub trunk_branch_name: String,
    pub merge_when_ready: bool,
    pub prs: Vec<PrSubmitEntry>,
}

/// Per-branch outcome reported by the review host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitStatus {
    Created,
    Updated,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrSubmitResult {
    pub head: String,
    pub status: SubmitStatus,
    #[serde(default)]
    pub pr_number: Option<u64>,
    #[serde(default, rename = "prURL")]
    pub pr_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBatchResponse {
    pub prs: Vec<PrSubmitResult>,
}

/// Status query for a set of head branch names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrStatusQuery {
    pub repo_owner: String,
    pub repo_name: String,
    pub pr_head_branch_names: Vec<String>,
}

/// Current remote state of one pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrStatus {
    pub head_branch_name: String,
    pub pr_number: u64,
    pub url: String,
    pub base_branch_name: String,
    pub state: PrState,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_draft: Option<bool>,
    #[serde(default)]
    pub review_decision: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrStatusResponse {
    pub prs: Vec<PrStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pr_state_wire_format() {
        assert_eq!(serde_json::to_string(&PrState::Open).unwrap(), "\"OPEN\"");
        assert_eq!(
            serde_json::from_str::<PrState>("\"MERGED\"").unwrap(),
            PrState::Merged
        );
    }

    #[test]
    fn test_submit_entry_omits_update_only_fields() {
        let entry = PrSubmitEntry {
            action: SubmitAction::Update,
            head: "feature".to_string(),
            base: "main".to_string(),
            title: None,
            body: None,
            draft: None,
            reviewers: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"action":"update","head":"feature","base":"main"}"#);
    }

    #[test]
    fn test_submit_result_parses_error_envelope() {
        let json = r#"{"head":"feature","status":"error","error":"base branch missing"}"#;
        let result: PrSubmitResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.status, SubmitStatus::Error);
        assert_eq!(result.pr_number, None);
        assert_eq!(result.error, Some("base branch missing".to_string()));
    }

    #[test]
    fn test_submit_result_parses_created() {
        let json = r#"{"head":"feature","status":"created","prNumber":7,"prURL":"https://github.com/acme/widgets/pull/7"}"#;
        let result: PrSubmitResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.status, SubmitStatus::Created);
        assert_eq!(result.pr_number, Some(7));
        assert!(result.pr_url.unwrap().ends_with("/pull/7"));
    }
}
