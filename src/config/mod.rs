pub mod auth;
pub mod settings;

pub use auth::UserConfig;
pub use settings::{RepoSettings, ReviewSettings, Settings};

use crate::errors::{Result, StrataError};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = ".strata";
const CONFIG_FILE_NAME: &str = "config.json";

/// The `.strata/` directory for a repository.
pub fn repo_config_dir(repo_path: &Path) -> Result<PathBuf> {
    let canonical = repo_path
        .canonicalize()
        .map_err(|e| StrataError::config(format!("invalid repository path {repo_path:?}: {e}")))?;
    Ok(canonical.join(CONFIG_DIR_NAME))
}

/// Path to a repository's `.strata/config.json`.
pub fn repo_config_file(repo_path: &Path) -> Result<PathBuf> {
    Ok(repo_config_dir(repo_path)?.join(CONFIG_FILE_NAME))
}

/// Whether `strata init` has been run in this repository.
pub fn is_repo_initialized(repo_path: &Path) -> bool {
    repo_config_file(repo_path).map(|p| p.exists()).unwrap_or(false)
}

/// Write the repo config, creating `.strata/` as needed. The directory is
/// added to the repository's local exclude file so it never dirties the
/// working tree.
pub fn write_repo_config(repo_path: &Path, settings: &Settings) -> Result<()> {
    let dir = repo_config_dir(repo_path)?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .map_err(|e| StrataError::config(format!("failed to create config directory: {e}")))?;
    }
    exclude_config_dir(repo_path)?;
    settings.save_to_file(&dir.join(CONFIG_FILE_NAME))
}

fn exclude_config_dir(repo_path: &Path) -> Result<()> {
    let repo = git2::Repository::discover(repo_path)
        .map_err(|e| StrataError::config(format!("not a git repository: {e}")))?;
    let exclude_path = repo.path().join("info").join("exclude");

    let entry = format!("/{CONFIG_DIR_NAME}/");
    let existing = fs::read_to_string(&exclude_path).unwrap_or_default();
    if existing.lines().any(|line| line.trim() == entry) {
        return Ok(());
    }

    if let Some(parent) = exclude_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| StrataError::config(format!("failed to create exclude file: {e}")))?;
    }
    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&entry);
    content.push('\n');
    fs::write(&exclude_path, content)
        .map_err(|e| StrataError::config(format!("failed to update exclude file: {e}")))?;

    Ok(())
}

/// Load the repo config, failing with a remediation hint when missing.
pub fn load_repo_config(repo_path: &Path) -> Result<Settings> {
    let path = repo_config_file(repo_path)?;
    if !path.exists() {
        return Err(StrataError::config(
            "repository is not initialized for strata. Run 'strata init' first",
        ));
    }
    Settings::load_from_file(&path)
}
