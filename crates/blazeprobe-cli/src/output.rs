//! Progress and summary output

use blazeprobe::reporter::{ReportFiles, TestStatus};
use blazeprobe::{SuiteSummary, TestLog};
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for a suite run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` journeys
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Report one finished journey and advance the bar
    pub fn journey_finished(&self, log: &TestLog) {
        let line = match log.status {
            TestStatus::Passed => self.line("✓", "PASS", Style::new().green().bold(), &log.name),
            TestStatus::Skipped => self.line("-", "SKIP", Style::new().yellow(), &log.name),
            TestStatus::Failed | TestStatus::Pending => {
                let detail = log.error.as_deref().unwrap_or("no error recorded");
                self.line("✗", "FAIL", Style::new().red().bold(), &format!("{}: {detail}", log.name))
            }
        };
        // failures are printed even when quiet
        if self.quiet && !log.status.is_failed() {
            return;
        }
        match &self.progress_bar {
            Some(pb) => {
                pb.println(line);
                pb.inc(1);
            }
            None => {
                let _ = self.term.write_line(&line);
            }
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print the report locations
    pub fn report_files(&self, files: &ReportFiles) {
        self.info(&format!(
            "reports: {}, {}, {}",
            files.html.display(),
            files.json.display(),
            files.junit.display()
        ));
    }

    /// Print the suite summary
    pub fn summary(&self, summary: &SuiteSummary) {
        if self.quiet && summary.is_success() {
            return;
        }

        let _ = self.term.write_line("");
        let secs = summary.duration.as_secs_f64();
        let SuiteSummary {
            total,
            passed,
            failed,
            skipped,
            ..
        } = *summary;

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();
            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };
            let _ = self.term.write_line(&format!(
                "{} {} journeys in {:.2}s ({} passed, {} failed, {} skipped)",
                status,
                total,
                secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} journeys in {secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)"
            ));
        }
    }

    fn line(&self, symbol: &str, word: &str, styling: Style, message: &str) -> String {
        let prefix = if self.use_color {
            styling.apply_to(symbol).to_string()
        } else {
            word.to_string()
        };
        format!("{prefix} {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blazeprobe::Reporter;
    use std::time::Duration;

    #[test]
    fn test_plain_prefixes() {
        let reporter = ProgressReporter::new(false, false);
        assert_eq!(
            reporter.line("✓", "PASS", Style::new(), "login_valid"),
            "PASS login_valid"
        );
    }

    #[test]
    fn test_journey_finished_without_bar() {
        let mut suite = Reporter::new();
        let log = suite.create_test("login_valid", "valid login");
        log.log_fail("boom");
        let reporter = ProgressReporter::new(false, true);
        reporter.journey_finished(log);
    }

    #[test]
    fn test_summary_quiet_success_prints_nothing() {
        let reporter = ProgressReporter::new(false, true);
        reporter.summary(&SuiteSummary {
            total: 1,
            passed: 1,
            failed: 0,
            skipped: 0,
            duration: Duration::from_millis(5),
        });
    }
}
