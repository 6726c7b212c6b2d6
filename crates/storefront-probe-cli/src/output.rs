//! Terminal output: a spinner while journeys run, one line per result after

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use storefront_probe::reporter::{Reporter, TestResultEntry, TestStatus};

/// Progress and result printer
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    pub use_color: bool,
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Start a spinner that ticks until [`ProgressReporter::finish`]
    pub fn start(&mut self, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(spinner);
    }

    pub fn finish(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Failures print even in quiet mode
    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    pub fn skipped(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("-").yellow().to_string()
        } else {
            "SKIP".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let _ = self.term.write_line(message);
    }

    /// One line per journey, then the suite summary
    pub fn print_results(&self, reporter: &Reporter) {
        for entry in reporter.results() {
            let line = result_line(entry);
            match entry.status {
                TestStatus::Passed => self.success(&line),
                TestStatus::Failed => self.failure(&line),
                TestStatus::Skipped => self.skipped(&line),
            }
        }
        let summary = reporter.summary();
        if reporter.all_passed() {
            self.info(&summary);
        } else {
            self.failure(&summary);
        }
    }
}

fn result_line(entry: &TestResultEntry) -> String {
    let label = if entry.id.is_empty() {
        entry.name.clone()
    } else {
        format!("{} - {}", entry.id, entry.name)
    };
    match (&entry.status, &entry.error) {
        (TestStatus::Failed, Some(error)) => format!(
            "{label} ({:.1}s): {}",
            entry.duration.as_secs_f64(),
            error.lines().next().unwrap_or_default()
        ),
        (TestStatus::Skipped, _) => label,
        _ => format!("{label} ({:.1}s)", entry.duration.as_secs_f64()),
    }
}
