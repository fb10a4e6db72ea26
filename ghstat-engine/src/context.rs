//! Engine context
//!
//! Carries presentation settings explicitly instead of through process-wide
//! state: whether output is verbose, and where task progress is reported.

use std::sync::Arc;

use crate::reporter::{ProgressReporter, SpinnerReporter};

/// Settings shared by every task of a pipeline
#[derive(Clone, Default)]
pub struct EngineContext {
    verbose: bool,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl EngineContext {
    /// Context for interactive use
    ///
    /// Verbose runs log task transitions through `tracing` and draw no
    /// spinner, so the two do not fight over the terminal.
    pub fn new(verbose: bool) -> Self {
        let reporter: Option<Arc<dyn ProgressReporter>> = if verbose {
            None
        } else {
            Some(Arc::new(SpinnerReporter::new()))
        };
        Self { verbose, reporter }
    }

    /// Context with no progress display
    pub fn headless() -> Self {
        Self::default()
    }

    /// Replaces the progress reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn reporter(&self) -> Option<Arc<dyn ProgressReporter>> {
        self.reporter.clone()
    }
}
