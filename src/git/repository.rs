use crate::errors::{Result, StrataError};
use git2::{BranchType, Oid, Repository, RepositoryState};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Outcome of a `git rebase --onto` invocation. Anything other than a clean
/// exit leaves Git's rebase state in place for the user to resolve.
#[derive(Debug)]
pub enum RebaseOutcome {
    Clean,
    Conflict { stderr: String },
}

/// Git adapter for the stack engine.
///
/// Queries (tips, merge bases, statuses, repository state) go through
/// libgit2. Working-tree rewrites (`rebase --onto`, `checkout`, emptiness
/// probes) are shelled out to `git`, so that a conflicted rebase lands in
/// the standard resumable state the user already knows how to drive.
/// Every operation is synchronous; the adapter performs no retries.
pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .map_err(|e| StrataError::config(format!("not a git repository: {e}")))?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| StrataError::config("repository has no working directory"))?
            .to_path_buf();

        Ok(Self { repo, workdir })
    }

    /// Path to the working directory root.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Name of the currently checked-out branch, or `None` on a detached HEAD.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(|s| s.to_string()))
    }

    /// Whether a local branch with this name exists.
    pub fn branch_exists(&self, name: &str) -> bool {
        self.repo.find_branch(name, BranchType::Local).is_ok()
    }

    /// The SHA a local branch currently points at.
    pub fn branch_tip(&self, name: &str) -> Result<String> {
        let branch = self.repo.find_branch(name, BranchType::Local).map_err(|e| {
            StrataError::preconditions(format!("branch '{name}' does not exist: {e}"))
        })?;
        let commit = branch.get().peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// Resolve an arbitrary revision (branch name or SHA) to a commit SHA.
    pub fn resolve_sha(&self, rev: &str) -> Result<String> {
        let obj = self.repo.revparse_single(rev)?;
        let commit = obj.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// Merge base of two revisions.
    pub fn merge_base(&self, a: &str, b: &str) -> Result<String> {
        let a_oid = Oid::from_str(&self.resolve_sha(a)?)?;
        let b_oid = Oid::from_str(&self.resolve_sha(b)?)?;
        let base = self.repo.merge_base(a_oid, b_oid)?;
        Ok(base.to_string())
    }

    /// Whether a rebase (merge or interactive) is in flight.
    pub fn rebase_in_progress(&self) -> bool {
        matches!(
            self.repo.state(),
            RepositoryState::Rebase
                | RepositoryState::RebaseInteractive
                | RepositoryState::RebaseMerge
        )
    }

    /// Whether the working tree or index holds uncommitted changes.
    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        let statuses = self.repo.statuses(None)?;

        for status in statuses.iter() {
            let flags = status.status();
            if flags.intersects(
                git2::Status::INDEX_MODIFIED
                    | git2::Status::INDEX_NEW
                    | git2::Status::INDEX_DELETED
                    | git2::Status::WT_MODIFIED
                    | git2::Status::WT_NEW
                    | git2::Status::WT_DELETED,
            ) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// True iff the diff between `base` and `branch` is empty.
    pub fn is_branch_empty(&self, branch: &str, base: &str) -> Result<bool> {
        let output = self.run_git(&["diff", "--quiet", base, branch])?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => Err(StrataError::GitCommand {
                command: "diff".to_string(),
                code: code.unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
        }
    }

    /// Check out a branch in the working tree.
    pub fn checkout(&self, branch: &str) -> Result<()> {
        debug!("checking out '{}'", branch);
        let output = self.run_git(&["checkout", branch])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(StrataError::GitCommand {
                command: format!("checkout {branch}"),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    /// Transplant `(old_base, branch]` onto `new_base`.
    ///
    /// A non-zero exit is reported as a conflict; Git's own rebase state is
    /// left untouched so the user can resolve and continue or abort.
    pub fn rebase_onto(&self, new_base: &str, old_base: &str, branch: &str) -> Result<RebaseOutcome> {
        debug!("rebase --onto {} {} {}", new_base, old_base, branch);
        let output = self.run_git(&["rebase", "--onto", new_base, old_base, branch])?;
        if output.status.success() {
            Ok(RebaseOutcome::Clean)
        } else {
            Ok(RebaseOutcome::Conflict {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    /// Full commit message at the tip of a branch.
    pub fn tip_message(&self, branch: &str) -> Result<String> {
        let branch_ref = self.repo.find_branch(branch, BranchType::Local)?;
        let commit = branch_ref.get().peel_to_commit()?;
        Ok(commit.message().unwrap_or("").to_string())
    }

    /// First-parent ancestry of a branch tip, newest first, excluding the
    /// tip itself, capped at `limit` entries.
    pub fn first_parent_ancestry(&self, branch: &str, limit: usize) -> Result<Vec<String>> {
        let tip = Oid::from_str(&self.branch_tip(branch)?)?;
        let mut walk = self.repo.revwalk()?;
        walk.simplify_first_parent()?;
        walk.push(tip)?;

        let mut shas = Vec::new();
        for oid in walk {
            let oid = oid?;
            if oid == tip {
                continue;
            }
            shas.push(oid.to_string());
            if shas.len() >= limit {
                break;
            }
        }
        Ok(shas)
    }

    /// Delete a local branch ref.
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self.repo.find_branch(name, BranchType::Local)?;
        branch.delete()?;
        debug!("deleted branch '{}'", name);
        Ok(())
    }

    /// URL of the named remote, if configured.
    pub fn remote_url(&self, name: &str) -> Option<String> {
        self.repo
            .find_remote(name)
            .ok()
            .and_then(|r| r.url().map(|u| u.to_string()))
    }

    /// Best guess at the trunk branch: `main` if it exists, else `master`,
    /// else whatever HEAD currently names.
    pub fn detect_trunk(&self) -> Result<String> {
        for candidate in ["main", "master"] {
            if self.branch_exists(candidate) {
                return Ok(candidate.to_string());
            }
        }
        self.current_branch()?
            .ok_or_else(|| StrataError::preconditions("no current branch to use as trunk"))
    }

    fn run_git(&self, args: &[&str]) -> Result<std::process::Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| {
                StrataError::config(format!("failed to invoke git {}: {e}", args.join(" ")))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, PathBuf) {
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
        Command::new("git")
            .args(["branch", "-M", "main"])
            .current_dir(&repo_path)
            .output()
            .unwrap();

        (temp_dir, repo_path)
    }

    fn commit_file(repo_path: &Path, name: &str, message: &str) {
        std::fs::write(repo_path.join(name), format!("content of {name}\n")).unwrap();
        Command::new("git")
            .args(["add", "."])
            .current_dir(repo_path)
            .output()
            .unwrap();
        Command::new("git")
            .args(["commit", "-m", message])
            .current_dir(repo_path)
            .output()
            .unwrap();
    }

    #[test]
    fn test_current_branch_and_tip() {
        let (_tmp, path) = create_test_repo();
        let repo = GitRepository::open(&path).unwrap();

        assert_eq!(repo.current_branch().unwrap(), Some("main".to_string()));
        let tip = repo.branch_tip("main").unwrap();
        assert_eq!(tip.len(), 40);
        assert_eq!(repo.resolve_sha("main").unwrap(), tip);
    }

    #[test]
    fn test_uncommitted_changes() {
        let (_tmp, path) = create_test_repo();
        let repo = GitRepository::open(&path).unwrap();

        assert!(!repo.has_uncommitted_changes().unwrap());
        std::fs::write(path.join("dirty.txt"), "dirty").unwrap();
        assert!(repo.has_uncommitted_changes().unwrap());
    }

    #[test]
    fn test_merge_base_and_empty_probe() {
        let (_tmp, path) = create_test_repo();
        let repo = GitRepository::open(&path).unwrap();
        let main_tip = repo.branch_tip("main").unwrap();

        Command::new("git")
            .args(["checkout", "-b", "feature"])
            .current_dir(&path)
            .output()
            .unwrap();

        // Empty branch: same tip, no diff against main.
        assert!(repo.is_branch_empty("feature", "main").unwrap());

        commit_file(&path, "feature.txt", "add feature");
        assert!(!repo.is_branch_empty("feature", "main").unwrap());
        assert_eq!(repo.merge_base("feature", "main").unwrap(), main_tip);
    }

    #[test]
    fn test_rebase_onto_clean() {
        let (_tmp, path) = create_test_repo();
        let repo = GitRepository::open(&path).unwrap();

        Command::new("git")
            .args(["checkout", "-b", "child"])
            .current_dir(&path)
            .output()
            .unwrap();
        commit_file(&path, "child.txt", "child work");

        Command::new("git")
            .args(["checkout", "main"])
            .current_dir(&path)
            .output()
            .unwrap();
        commit_file(&path, "trunk.txt", "trunk moved");
        let main_tip = repo.branch_tip("main").unwrap();
        let old_base = repo.merge_base("child", "main").unwrap();

        match repo.rebase_onto("main", &old_base, "child").unwrap() {
            RebaseOutcome::Clean => {}
            RebaseOutcome::Conflict { stderr } => panic!("unexpected conflict: {stderr}"),
        }
        assert_eq!(repo.merge_base("child", "main").unwrap(), main_tip);
        assert!(!repo.rebase_in_progress());
    }

    #[test]
    fn test_first_parent_ancestry() {
        let (_tmp, path) = create_test_repo();
        let repo = GitRepository::open(&path).unwrap();
        let root = repo.branch_tip("main").unwrap();
        commit_file(&path, "second.txt", "second");

        let ancestry = repo.first_parent_ancestry("main", 10).unwrap();
        assert_eq!(ancestry, vec![root]);
    }

    #[test]
    fn test_detect_trunk() {
        let (_tmp, path) = create_test_repo();
        let repo = GitRepository::open(&path).unwrap();
        assert_eq!(repo.detect_trunk().unwrap(), "main");
    }
}
