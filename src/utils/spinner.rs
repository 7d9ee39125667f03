use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Lightweight wrapper around `indicatif`'s spinner progress bar, shown
/// around blocking review-host calls.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    const TICK_RATE: Duration = Duration::from_millis(80);
    const TEMPLATE: &'static str = "{spinner:.green} {msg}";

    /// Start a spinner with the provided message.
    pub fn new(message: String) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template(Self::TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Self::TICK_RATE);
        Spinner { pb }
    }

    /// Stop the spinner and clear it from the terminal.
    pub fn stop(&self) {
        self.pb.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_spinner_creation_and_stop() {
        let spinner = Spinner::new("Testing".to_string());
        thread::sleep(Duration::from_millis(100));
        spinner.stop();
    }
}
