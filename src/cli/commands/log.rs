use super::load_context;
use crate::context::EngineContext;
use crate::errors::Result;
use crate::providers::PrState;
use console::style;

/// Render the tracked forest, one tree per trunk.
pub fn run() -> Result<()> {
    let ctx = load_context()?;
    let current = ctx.git.current_branch()?;

    for trunk in &ctx.settings.repo.trunks {
        if !ctx.git.branch_exists(trunk) {
            continue;
        }
        println!("{}", style(trunk).bold());
        print_subtree(&ctx, trunk, "", current.as_deref())?;
    }

    Ok(())
}

fn print_subtree(
    ctx: &EngineContext,
    name: &str,
    prefix: &str,
    current: Option<&str>,
) -> Result<()> {
    let children = ctx.branch(name).children()?;
    let count = children.len();

    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == count;
        let connector = if last { "└─" } else { "├─" };

        let mut line = format!("{prefix}{connector} {}", child.name());
        if current == Some(child.name()) {
            line = format!("{line} {}", style("(current)").cyan());
        }
        if let Some(info) = child.pr_info()? {
            let badge = format!("#{} ({})", info.number, info.state);
            let styled = match info.state {
                PrState::Open => style(badge).green(),
                PrState::Merged => style(badge).magenta(),
                PrState::Closed => style(badge).red(),
            };
            line = format!("{line} {styled}");
        }
        println!("{line}");

        let child_prefix = format!("{prefix}{}", if last { "   " } else { "│  " });
        print_subtree(ctx, child.name(), &child_prefix, current)?;
    }

    Ok(())
}
