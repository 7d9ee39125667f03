use crate::cli::output::Output;
use crate::cli::ConfigAction;
use crate::config::{self, UserConfig};
use crate::errors::{Result, StrataError};
use crate::git::GitRepository;

pub fn run(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => set(&key, &value),
        ConfigAction::Get { key } => get(&key),
        ConfigAction::List => list(),
    }
}

fn set(key: &str, value: &str) -> Result<()> {
    if let Some(auth_key) = key.strip_prefix("auth.") {
        let mut user = UserConfig::load()?;
        match auth_key {
            "token" => user.auth_token = Some(value.to_string()),
            "app_server_url" => user.app_server_url = value.to_string(),
            _ => return Err(StrataError::config(format!("unknown config key: {key}"))),
        }
        user.save()?;
    } else {
        let workdir = repo_workdir()?;
        let mut settings = config::load_repo_config(&workdir)?;
        settings.set_value(key, value)?;
        config::write_repo_config(&workdir, &settings)?;
    }

    Output::success(format!("set {key}"));
    Ok(())
}

fn get(key: &str) -> Result<()> {
    let value = if let Some(auth_key) = key.strip_prefix("auth.") {
        let user = UserConfig::load()?;
        match auth_key {
            "token" => user.auth_token.unwrap_or_default(),
            "app_server_url" => user.app_server_url,
            _ => return Err(StrataError::config(format!("unknown config key: {key}"))),
        }
    } else {
        config::load_repo_config(&repo_workdir()?)?.get_value(key)?
    };

    println!("{value}");
    Ok(())
}

fn list() -> Result<()> {
    let settings = config::load_repo_config(&repo_workdir()?)?;
    for key in [
        "repo.owner",
        "repo.name",
        "repo.trunks",
        "review.host",
        "review.hostname",
        "review.default_reviewers",
    ] {
        println!("{key} = {}", settings.get_value(key)?);
    }

    let user = UserConfig::load()?;
    println!("auth.app_server_url = {}", user.app_server_url);
    println!(
        "auth.token = {}",
        if user.auth_token.is_some() {
            "(set)"
        } else {
            "(unset)"
        }
    );
    Ok(())
}

fn repo_workdir() -> Result<std::path::PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(GitRepository::open(&cwd)?.workdir().to_path_buf())
}
