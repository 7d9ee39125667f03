use crate::errors::{Result, StrataError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-level configuration, stored in `~/.strata/auth.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Bearer token for the app server.
    pub auth_token: Option<String>,
    /// Base URL of the app server that proxies the review host.
    pub app_server_url: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            app_server_url: "https://app.strata.dev/api/v1".to_string(),
        }
    }
}

impl UserConfig {
    /// Load the user config from its default location, falling back to
    /// defaults when no home directory is available.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Ok(path) => Self::load_from_file(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Save the user config to its default location.
    pub fn save(&self) -> Result<()> {
        self.save_to_file(&Self::default_path()?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| StrataError::config(format!("failed to read auth config: {e}")))?;

        let config: UserConfig = serde_json::from_str(&content)
            .map_err(|e| StrataError::config(format!("failed to parse auth config: {e}")))?;

        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StrataError::config(format!("failed to create config directory: {e}"))
            })?;
        }
        crate::utils::atomic_file::write_json(path, self)
    }

    /// Where the user refreshes an expired token.
    pub fn activation_url(&self) -> String {
        format!("{}/activate", self.app_server_url.trim_end_matches('/'))
    }

    fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| StrataError::config("could not find home directory"))?;
        Ok(home.join(".strata").join("auth.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_and_activation_url() {
        let config = UserConfig::default();
        assert!(config.auth_token.is_none());
        assert_eq!(
            config.activation_url(),
            "https://app.strata.dev/api/v1/activate"
        );
    }

    #[test]
    fn test_file_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("auth.json");

        let config = UserConfig {
            auth_token: Some("tok_123".to_string()),
            app_server_url: "https://app.example.com/api".to_string(),
        };
        config.save_to_file(&path).unwrap();

        let loaded = UserConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.auth_token, Some("tok_123".to_string()));
        assert_eq!(loaded.activation_url(), "https://app.example.com/api/activate");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let loaded = UserConfig::load_from_file(&tmp.path().join("absent.json")).unwrap();
        assert!(loaded.auth_token.is_none());
    }
}
