#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use strata_cli::config::{self, Settings};
use strata_cli::context::EngineContext;
use tempfile::TempDir;

/// Run a git command in `repo`, panicking on failure.
pub fn git(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("failed to invoke git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Fresh repository with one commit on `main`.
pub fn create_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init"]);
    git(&repo_path, &["config", "user.name", "Test User"]);
    git(&repo_path, &["config", "user.email", "test@example.com"]);

    std::fs::write(repo_path.join("README.md"), "# Test Repository\n").unwrap();
    git(&repo_path, &["add", "."]);
    git(&repo_path, &["commit", "-m", "Initial commit"]);
    git(&repo_path, &["branch", "-M", "main"]);

    (temp_dir, repo_path)
}

pub fn commit_file(repo: &Path, name: &str, content: &str, message: &str) {
    std::fs::write(repo.join(name), content).unwrap();
    git(repo, &["add", "."]);
    git(repo, &["commit", "-m", message]);
}

/// Create `name` off `parent` and check it out.
pub fn create_branch(repo: &Path, name: &str, parent: &str) {
    git(repo, &["checkout", parent]);
    git(repo, &["checkout", "-b", name]);
}

pub fn sha(repo: &Path, rev: &str) -> String {
    git(repo, &["rev-parse", rev])
}

pub fn merge_base(repo: &Path, a: &str, b: &str) -> String {
    git(repo, &["merge-base", a, b])
}

/// Write a `.strata/config.json` for a `main`-trunk repo owned by acme.
pub fn init_strata(repo: &Path) {
    let mut settings = Settings::default();
    settings.set_value("repo.owner", "acme").unwrap();
    settings.set_value("repo.name", "widgets").unwrap();
    config::write_repo_config(repo, &settings).unwrap();
}

pub fn load_ctx(repo: &Path) -> EngineContext {
    EngineContext::load(repo).unwrap()
}
