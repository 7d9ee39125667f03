pub mod completions;
pub mod config;
pub mod init;
pub mod log;
pub mod restack;
pub mod submit;
pub mod sync;
pub mod track;
pub mod validate;

use crate::context::EngineContext;
use crate::errors::Result;

/// Load the engine context for the working directory, interactive when
/// attached to a terminal.
pub(crate) fn load_context() -> Result<EngineContext> {
    let cwd = std::env::current_dir()?;
    Ok(EngineContext::load(&cwd)?.with_interactive(console::user_attended()))
}
