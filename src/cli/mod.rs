pub mod commands;
pub mod output;

use crate::errors::Result;
use crate::stack::Scope;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Strata - stacked branches and stacked pull requests")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize this repository for strata
    Init {
        /// Trunk branch (detected when omitted)
        #[arg(long)]
        trunk: Option<String>,

        /// Repository owner on the review host (detected from 'origin')
        #[arg(long)]
        owner: Option<String>,

        /// Repository name on the review host (detected from 'origin')
        #[arg(long)]
        repo: Option<String>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Start tracking the current branch on top of a parent
    Track {
        /// Parent branch (prompted or defaulted to trunk when omitted)
        #[arg(long)]
        parent: Option<String>,
    },

    /// Stop tracking a branch (defaults to the current branch)
    Untrack {
        branch: Option<String>,
    },

    /// Show the tracked branch forest
    Log,

    /// Check that the recorded stack matches Git's actual history
    Validate {
        #[arg(long, value_enum, default_value = "fullstack")]
        scope: Scope,

        /// Print nothing; communicate through the exit code only
        #[arg(long)]
        silent: bool,
    },

    /// Rebase descendants so each sits on its parent's current tip
    Restack {
        /// Move the current branch onto this branch first
        #[arg(long)]
        onto: Option<String>,
    },

    /// Submit the stack as pull requests
    Submit {
        #[arg(long, value_enum, default_value = "fullstack")]
        scope: Scope,

        /// Create new pull requests as drafts
        #[arg(long)]
        draft: bool,

        /// Ask the review host to merge once requirements are met
        #[arg(long)]
        merge_when_ready: bool,
    },

    /// Refresh pull request info and prune merged or closed branches
    Sync {
        /// Only refresh; never prune branches
        #[arg(long)]
        no_prune: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set a configuration value (e.g. repo.owner, auth.token)
    Set { key: String, value: String },

    /// Get a configuration value
    Get { key: String },

    /// List all configuration values
    List,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        self.setup_logging();

        match self.command {
            Commands::Init {
                trunk,
                owner,
                repo,
                force,
            } => commands::init::run(trunk, owner, repo, force),
            Commands::Track { parent } => commands::track::run(parent),
            Commands::Untrack { branch } => commands::track::untrack(branch),
            Commands::Log => commands::log::run(),
            Commands::Validate { scope, silent } => commands::validate::run(scope, silent),
            Commands::Restack { onto } => commands::restack::run(onto),
            Commands::Submit {
                scope,
                draft,
                merge_when_ready,
            } => commands::submit::run(scope, draft, merge_when_ready),
            Commands::Sync { no_prune } => commands::sync::run(no_prune),
            Commands::Config { action } => commands::config::run(action),
            Commands::Completions { shell } => commands::completions::run(shell),
        }
    }

    fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .without_time();

        if self.no_color {
            subscriber.with_ansi(false).init();
        } else {
            subscriber.init();
        }
    }
}
