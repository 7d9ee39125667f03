use crate::errors::{Result, StrataError};
use crate::providers::HostKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Repo-level configuration, stored in `.strata/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub repo: RepoSettings,
    pub review: ReviewSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSettings {
    /// Owner (user or organization) on the review host.
    pub owner: String,
    /// Repository name on the review host.
    pub name: String,
    /// Long-lived branches the engine never rewrites. Upward walks stop here.
    pub trunks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSettings {
    pub host: HostKind,
    pub hostname: String,
    pub default_reviewers: Vec<String>,
}

impl Default for RepoSettings {
    fn default() -> Self {
        Self {
            owner: String::new(),
            name: String::new(),
            trunks: vec!["main".to_string()],
        }
    }
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            host: HostKind::GitHub,
            hostname: "github.com".to_string(),
            default_reviewers: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a file, falling back to defaults when absent.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| StrataError::config(format!("failed to read config file: {e}")))?;

        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| StrataError::config(format!("failed to parse config file: {e}")))?;

        Ok(settings)
    }

    /// Save settings to a file atomically.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        crate::utils::atomic_file::write_json(path, self)
    }

    pub fn is_trunk(&self, branch: &str) -> bool {
        self.repo.trunks.iter().any(|t| t == branch)
    }

    /// Update a configuration value by dotted key.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "repo.owner" => self.repo.owner = value.to_string(),
            "repo.name" => self.repo.name = value.to_string(),
            "repo.trunks" => {
                let trunks: Vec<String> = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if trunks.is_empty() {
                    return Err(StrataError::config("trunk list cannot be empty"));
                }
                self.repo.trunks = trunks;
            }
            "review.host" => {
                self.review.host = match value.to_lowercase().as_str() {
                    "github" => HostKind::GitHub,
                    "gitlab" => HostKind::GitLab,
                    other => {
                        return Err(StrataError::config(format!(
                            "unknown review host: {other}"
                        )))
                    }
                };
            }
            "review.hostname" => self.review.hostname = value.to_string(),
            "review.default_reviewers" => {
                self.review.default_reviewers = if value.is_empty() {
                    Vec::new()
                } else {
                    value.split(',').map(|s| s.trim().to_string()).collect()
                };
            }
            _ => return Err(StrataError::config(format!("unknown config key: {key}"))),
        }

        Ok(())
    }

    /// Get a configuration value by dotted key.
    pub fn get_value(&self, key: &str) -> Result<String> {
        let value = match key {
            "repo.owner" => self.repo.owner.clone(),
            "repo.name" => self.repo.name.clone(),
            "repo.trunks" => self.repo.trunks.join(","),
            "review.host" => self.review.host.to_string(),
            "review.hostname" => self.review.hostname.clone(),
            "review.default_reviewers" => self.review.default_reviewers.join(","),
            _ => return Err(StrataError::config(format!("unknown config key: {key}"))),
        };

        Ok(value)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.repo.trunks.is_empty() {
            return Err(StrataError::config("at least one trunk branch is required"));
        }
        if self.repo.owner.is_empty() || self.repo.name.is_empty() {
            return Err(StrataError::config(
                "repo owner and name must be set. Run 'strata init' or 'strata config set repo.owner <owner>'",
            ));
        }
        Ok(())
    }
}
