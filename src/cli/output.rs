use console::{style, Color, Style};
use std::fmt::Display;

/// Theme configuration for the strata CLI
struct Theme;

impl Theme {
    const SUCCESS: Color = Color::Green;
    const ERROR: Color = Color::Red;
    const WARNING: Color = Color::Yellow;

    /// Muted teal-green for informational text
    fn info_style() -> Style {
        Style::new().color256(35)
    }

    fn tip_style() -> Style {
        Style::new().color256(35)
    }

    /// Dim gray for secondary text
    fn dim_style() -> Style {
        Style::new().dim()
    }
}

/// Centralized output formatting utilities for consistent CLI presentation
pub struct Output;

impl Output {
    /// Print a success message with checkmark
    pub fn success<T: Display>(message: T) {
        println!("{} {}", style("✓").fg(Theme::SUCCESS), message);
    }

    /// Print an error message with X mark
    pub fn error<T: Display>(message: T) {
        eprintln!("{} {}", style("✗").fg(Theme::ERROR), message);
    }

    /// Print a warning message
    pub fn warning<T: Display>(message: T) {
        println!("{} {}", style("⚠").fg(Theme::WARNING), message);
    }

    /// Print an info message (muted green)
    pub fn info<T: Display>(message: T) {
        println!("{} {}", Theme::info_style().apply_to("ℹ"), message);
    }

    /// Print a sub-item with arrow prefix
    pub fn sub_item<T: Display>(message: T) {
        println!("  {} {}", Theme::dim_style().apply_to("→"), message);
    }

    /// Print a section header
    pub fn section<T: Display>(title: T) {
        println!("\n{}", style(title).bold().underlined());
    }

    /// Print a tip/suggestion (muted green)
    pub fn tip<T: Display>(message: T) {
        println!(
            "{} {}",
            Theme::tip_style().apply_to("TIP:"),
            Theme::dim_style().apply_to(message)
        );
    }

    /// Print a progress line (muted green)
    pub fn progress<T: Display>(message: T) {
        println!("{} {}", Theme::info_style().apply_to("→"), message);
    }
}
