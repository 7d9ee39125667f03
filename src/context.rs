use crate::config::{self, Settings, UserConfig};
use crate::errors::{Result, StrataError};
use crate::git::GitRepository;
use crate::meta::MetaStore;
use crate::providers::{self, DynReviewHost};
use crate::stack::Branch;
use std::path::Path;

/// Everything an engine entry point needs, carried explicitly by the
/// command layer. The engine itself holds no module-level state.
pub struct EngineContext {
    pub git: GitRepository,
    pub meta: MetaStore,
    pub settings: Settings,
    pub user: UserConfig,
    /// Whether prompts may be shown. Non-interactive runs take the
    /// documented silent path instead.
    pub interactive: bool,
}

impl EngineContext {
    /// Load the context for the repository containing `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let git = GitRepository::open(path)?;
        let meta = MetaStore::open(path)?;
        let settings = config::load_repo_config(git.workdir())?;
        let user = UserConfig::load()?;

        Ok(Self {
            git,
            meta,
            settings,
            user,
            interactive: false,
        })
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn branch(&self, name: &str) -> Branch<'_> {
        Branch::new(self, name)
    }

    pub fn is_trunk(&self, name: &str) -> bool {
        self.settings.is_trunk(name)
    }

    /// The checked-out branch, or a preconditions failure on detached HEAD.
    pub fn current_branch(&self) -> Result<String> {
        self.git.current_branch()?.ok_or_else(|| {
            StrataError::preconditions("no current branch (detached HEAD). Check out a branch first")
        })
    }

    /// Build the configured review host.
    pub fn review_host(&self) -> Result<DynReviewHost> {
        providers::create_host(&self.settings, &self.user)
    }
}
