use super::load_context;
use crate::cli::output::Output;
use crate::errors::Result;
use crate::stack::{validator, Scope, Stack};

pub fn run(scope: Scope, silent: bool) -> Result<()> {
    let ctx = load_context()?;
    let current = ctx.current_branch()?;

    let stack = Stack::build(&ctx, &current, scope)?;
    match validator::validate(&ctx, &stack) {
        Ok(()) => {
            if !silent {
                Output::success(format!(
                    "stack of '{}' matches Git history ({} branch(es))",
                    current,
                    stack.branches().len()
                ));
            }
            Ok(())
        }
        Err(err) => {
            if silent {
                // Communicate through the exit code only.
                std::process::exit(err.exit_code());
            }
            Err(err)
        }
    }
}
