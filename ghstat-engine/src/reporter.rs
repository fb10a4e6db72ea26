//! Progress reporting
//!
//! Tasks push their message and progress to a reporter after every change.
//! The terminal implementation draws a spinner on stderr.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Receives task lifecycle and progress updates
pub trait ProgressReporter: Send + Sync {
    /// A task started with the given message
    fn start(&self, message: &str);

    /// The running task changed its message or progress
    fn update(&self, message: &str);

    /// The running task succeeded
    fn succeed(&self, message: &str);

    /// The running task failed
    fn fail(&self, message: &str);
}

/// Spinner on stderr, one line per task
#[derive(Default)]
pub struct SpinnerReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn finish(&self, marker: String, message: &str, abandon: bool) {
        let bar = self.bar.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(bar) = bar {
            bar.set_style(
                ProgressStyle::with_template("{msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            let line = format!("{} {}", marker, message);
            if abandon {
                bar.abandon_with_message(line);
            } else {
                bar.finish_with_message(line);
            }
        }
    }
}

impl ProgressReporter for SpinnerReporter {
    fn start(&self, message: &str) {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let previous = self
            .bar
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(bar);
        if let Some(previous) = previous {
            previous.finish_and_clear();
        }
    }

    fn update(&self, message: &str) {
        if let Some(bar) = self.bar.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            bar.set_message(message.to_string());
        }
    }

    fn succeed(&self, message: &str) {
        self.finish("✔".green().to_string(), message, false);
    }

    fn fail(&self, message: &str) {
        self.finish("✘".red().to_string(), message, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_lifecycle_without_terminal() {
        let reporter = SpinnerReporter::new();
        reporter.update("ignored before start");
        reporter.start("Logging in");
        reporter.update("Logging in (50%)");
        reporter.succeed("Logging in");
        assert!(reporter.bar.lock().unwrap().is_none());

        reporter.start("Processing");
        reporter.fail("Processing");
        assert!(reporter.bar.lock().unwrap().is_none());
    }
}
