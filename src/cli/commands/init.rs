use crate::cli::output::Output;
use crate::config::{self, Settings};
use crate::errors::{Result, StrataError};
use crate::git::GitRepository;
use tracing::debug;

pub fn run(
    trunk: Option<String>,
    owner: Option<String>,
    repo: Option<String>,
    force: bool,
) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let git = GitRepository::open(&cwd)?;

    if config::is_repo_initialized(git.workdir()) && !force {
        return Err(StrataError::config(
            "repository is already initialized. Use --force to overwrite",
        ));
    }

    let trunk = match trunk {
        Some(t) => {
            if !git.branch_exists(&t) {
                return Err(StrataError::config(format!(
                    "trunk branch '{t}' does not exist"
                )));
            }
            t
        }
        None => git.detect_trunk()?,
    };

    let detected = git.remote_url("origin").and_then(|url| parse_remote(&url));
    debug!("detected remote identity: {:?}", detected);

    let mut settings = Settings::default();
    settings.repo.trunks = vec![trunk.clone()];
    settings.repo.owner = owner
        .or_else(|| detected.as_ref().map(|(o, _)| o.clone()))
        .unwrap_or_default();
    settings.repo.name = repo
        .or_else(|| detected.as_ref().map(|(_, n)| n.clone()))
        .unwrap_or_default();

    config::write_repo_config(git.workdir(), &settings)?;

    Output::success("initialized repository for strata");
    Output::sub_item(format!("trunk: {trunk}"));
    if settings.repo.owner.is_empty() || settings.repo.name.is_empty() {
        Output::tip(
            "could not detect the repository identity from 'origin'. \
             Set it with 'strata config set repo.owner <owner>' and 'strata config set repo.name <name>'",
        );
    } else {
        Output::sub_item(format!(
            "repository: {}/{}",
            settings.repo.owner, settings.repo.name
        ));
    }

    Ok(())
}

/// Extract `(owner, name)` from an SSH or HTTPS remote URL.
fn parse_remote(url: &str) -> Option<(String, String)> {
    let path = if let Some(rest) = url.strip_prefix("git@") {
        rest.split_once(':')?.1
    } else if let Some(idx) = url.find("://") {
        url[idx + 3..].split_once('/')?.1
    } else {
        return None;
    };

    let path = path.trim_end_matches('/').trim_end_matches(".git");
    let (owner, name) = path.rsplit_once('/')?;
    let owner = owner.rsplit('/').next()?;
    if owner.is_empty() || name.is_empty() {
        return None;
    }
    Some((owner.to_string(), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote() {
        assert_eq!(
            parse_remote("git@github.com:acme/widgets.git"),
            Some(("acme".to_string(), "widgets".to_string()))
        );
        assert_eq!(
            parse_remote("https://github.com/acme/widgets"),
            Some(("acme".to_string(), "widgets".to_string()))
        );
        assert_eq!(
            parse_remote("ssh://git@github.com/acme/widgets.git"),
            Some(("acme".to_string(), "widgets".to_string()))
        );
        assert_eq!(parse_remote("not-a-remote"), None);
    }
}
