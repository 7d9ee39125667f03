use crate::errors::{Result, StrataError};
use crate::providers::types::PrState;
use chrono::{DateTime, Utc};
use git2::{ErrorCode, Oid, Repository};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const REF_NAMESPACE: &str = "refs/strata";

/// Pull request metadata recorded against a branch.
///
/// Never authoritative locally; refreshed from the review host on every
/// submit or sync. `base` equals the branch's recorded parent as of the
/// last successful submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrInfo {
    pub number: u64,
    pub url: String,
    pub base: String,
    pub state: PrState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_decision: Option<String>,
    pub synced_at: DateTime<Utc>,
}

impl PrInfo {
    /// Merge a fresh record over an existing one, keeping previously known
    /// optional fields the new record does not carry.
    fn merged_over(mut self, old: PrInfo) -> PrInfo {
        if self.title.is_none() {
            self.title = old.title;
        }
        if self.body.is_none() {
            self.body = old.body;
        }
        if self.draft.is_none() {
            self.draft = old.draft;
        }
        if self.review_decision.is_none() {
            self.review_decision = old.review_decision;
        }
        self
    }
}

/// Durable per-branch metadata in a private ref namespace:
/// `refs/strata/<branch>/parent`, `.../prev-ref` and `.../pr-info`.
///
/// `parent` and `pr-info` point at blobs; `prev-ref` points directly at the
/// recorded commit, which also keeps that commit alive across rewrites.
/// Each write is a single ref update, so writes are atomic per key. The
/// store is the sole authority on parent and prev-ref; Git's own ref graph
/// is the sole authority on commit content.
pub struct MetaStore {
    repo: Repository,
}

impl MetaStore {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .map_err(|e| StrataError::config(format!("not a git repository: {e}")))?;
        Ok(Self { repo })
    }

    /// Recorded parent branch name, if any.
    pub fn parent(&self, branch: &str) -> Result<Option<String>> {
        self.read_blob(&self.key(branch, "parent"))
    }

    pub fn set_parent(&self, branch: &str, parent: &str) -> Result<()> {
        self.write_blob(&self.key(branch, "parent"), parent.as_bytes())?;
        debug!("meta: parent of '{}' set to '{}'", branch, parent);
        Ok(())
    }

    /// The tip this branch pointed at before the most recent engine rewrite.
    pub fn prev_ref(&self, branch: &str) -> Result<Option<String>> {
        match self.repo.find_reference(&self.key(branch, "prev-ref")) {
            Ok(r) => Ok(r.target().map(|oid| oid.to_string())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_prev_ref(&self, branch: &str, sha: &str) -> Result<()> {
        let oid = Oid::from_str(sha)?;
        self.repo
            .reference(&self.key(branch, "prev-ref"), oid, true, "strata: prev-ref")?;
        debug!("meta: prev-ref of '{}' set to {}", branch, sha);
        Ok(())
    }

    pub fn pr_info(&self, branch: &str) -> Result<Option<PrInfo>> {
        match self.read_blob(&self.key(branch, "pr-info"))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Merge a PR info record into the stored one (optional fields the new
    /// record omits survive from the previous record).
    pub fn upsert_pr_info(&self, branch: &str, info: PrInfo) -> Result<PrInfo> {
        let merged = match self.pr_info(branch)? {
            Some(old) => info.merged_over(old),
            None => info,
        };
        let json = serde_json::to_string(&merged)?;
        self.write_blob(&self.key(branch, "pr-info"), json.as_bytes())?;
        debug!("meta: pr-info of '{}' updated (#{})", branch, merged.number);
        Ok(merged)
    }

    /// Drop every meta key recorded for a branch.
    pub fn remove_branch(&self, branch: &str) -> Result<()> {
        for key in ["parent", "prev-ref", "pr-info"] {
            match self.repo.find_reference(&self.key(branch, key)) {
                Ok(mut r) => r.delete()?,
                Err(e) if e.code() == ErrorCode::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        debug!("meta: removed '{}'", branch);
        Ok(())
    }

    /// All branches with a recorded parent, sorted by name.
    ///
    /// Trunk branches never carry a parent key, so they never appear here.
    pub fn tracked_branches(&self) -> Result<Vec<String>> {
        let prefix = format!("{REF_NAMESPACE}/");
        let suffix = "/parent";

        let mut branches = Vec::new();
        for reference in self.repo.references()? {
            let reference = reference?;
            if let Some(name) = reference.name() {
                if let Some(rest) = name.strip_prefix(&prefix) {
                    if let Some(branch) = rest.strip_suffix(suffix) {
                        branches.push(branch.to_string());
                    }
                }
            }
        }
        branches.sort();
        Ok(branches)
    }

    fn key(&self, branch: &str, field: &str) -> String {
        format!("{REF_NAMESPACE}/{branch}/{field}")
    }

    fn read_blob(&self, refname: &str) -> Result<Option<String>> {
        let reference = match self.repo.find_reference(refname) {
            Ok(r) => r,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let oid = reference
            .target()
            .ok_or_else(|| StrataError::config(format!("meta ref '{refname}' is symbolic")))?;
        let blob = self.repo.find_blob(oid)?;
        let content = std::str::from_utf8(blob.content())
            .map_err(|_| StrataError::config(format!("meta ref '{refname}' is not UTF-8")))?
            .to_string();
        Ok(Some(content))
    }

    fn write_blob(&self, refname: &str, content: &[u8]) -> Result<()> {
        let oid = self.repo.blob(content)?;
        self.repo.reference(refname, oid, true, "strata: meta update")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let repo_path = temp_dir.path().to_path_buf();

        for args in [
            vec!["init"],
            vec!["config", "user.name", "Test"],
            vec!["config", "user.email", "test@test.com"],
        ] {
            Command::new("git")
                .args(&args)
                .current_dir(&repo_path)
                .output()
                .unwrap();
        }
        std::fs::write(repo_path.join("README.md"), "# Test").unwrap();
        Command::new("git")
            .args(["add", "."])
            .current_dir(&repo_path)
            .output()
            .unwrap();
        Command::new("git")
            .args(["commit", "-m", "Initial commit"])
            .current_dir(&repo_path)
            .output()
            .unwrap();

        (temp_dir, repo_path)
    }

    fn head_sha(repo_path: &std::path::Path) -> String {
        let out = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(repo_path)
            .output()
            .unwrap();
        String::from_utf8(out.stdout).unwrap().trim().to_string()
    }

    fn sample_pr_info(base: &str) -> PrInfo {
        PrInfo {
            number: 42,
            url: "https://github.com/acme/widgets/pull/42".to_string(),
            base: base.to_string(),
            state: PrState::Open,
            title: Some("Add widgets".to_string()),
            body: None,
            draft: Some(false),
            review_decision: None,
            synced_at: Utc::now(),
        }
    }

    #[test]
    fn test_parent_roundtrip() {
        let (_tmp, path) = create_test_repo();
        let store = MetaStore::open(&path).unwrap();

        assert_eq!(store.parent("feature").unwrap(), None);
        store.set_parent("feature", "main").unwrap();
        assert_eq!(store.parent("feature").unwrap(), Some("main".to_string()));

        store.set_parent("feature", "develop").unwrap();
        assert_eq!(
            store.parent("feature").unwrap(),
            Some("develop".to_string())
        );
    }

    #[test]
    fn test_prev_ref_roundtrip() {
        let (_tmp, path) = create_test_repo();
        let store = MetaStore::open(&path).unwrap();
        let sha = head_sha(&path);

        assert_eq!(store.prev_ref("feature").unwrap(), None);
        store.set_prev_ref("feature", &sha).unwrap();
        assert_eq!(store.prev_ref("feature").unwrap(), Some(sha));
    }

    #[test]
    fn test_pr_info_upsert_merges_optional_fields() {
        let (_tmp, path) = create_test_repo();
        let store = MetaStore::open(&path).unwrap();

        store.upsert_pr_info("feature", sample_pr_info("main")).unwrap();

        // A refresh without title/draft keeps the previously known values.
        let refresh = PrInfo {
            number: 42,
            url: "https://github.com/acme/widgets/pull/42".to_string(),
            base: "main".to_string(),
            state: PrState::Merged,
            title: None,
            body: None,
            draft: None,
            review_decision: Some("APPROVED".to_string()),
            synced_at: Utc::now(),
        };
        let merged = store.upsert_pr_info("feature", refresh).unwrap();
        assert_eq!(merged.state, PrState::Merged);
        assert_eq!(merged.title, Some("Add widgets".to_string()));
        assert_eq!(merged.draft, Some(false));
        assert_eq!(merged.review_decision, Some("APPROVED".to_string()));

        let stored = store.pr_info("feature").unwrap().unwrap();
        assert_eq!(stored, merged);
    }

    #[test]
    fn test_tracked_branches_sorted() {
        let (_tmp, path) = create_test_repo();
        let store = MetaStore::open(&path).unwrap();

        store.set_parent("zeta", "main").unwrap();
        store.set_parent("alpha", "main").unwrap();
        store.set_parent("feat/nested-name", "alpha").unwrap();

        assert_eq!(
            store.tracked_branches().unwrap(),
            vec!["alpha", "feat/nested-name", "zeta"]
        );
    }

    #[test]
    fn test_remove_branch() {
        let (_tmp, path) = create_test_repo();
        let store = MetaStore::open(&path).unwrap();
        let sha = head_sha(&path);

        store.set_parent("feature", "main").unwrap();
        store.set_prev_ref("feature", &sha).unwrap();
        store.upsert_pr_info("feature", sample_pr_info("main")).unwrap();

        store.remove_branch("feature").unwrap();
        assert_eq!(store.parent("feature").unwrap(), None);
        assert_eq!(store.prev_ref("feature").unwrap(), None);
        assert_eq!(store.pr_info("feature").unwrap(), None);
        assert!(store.tracked_branches().unwrap().is_empty());

        // Removing twice is fine.
        store.remove_branch("feature").unwrap();
    }
}
