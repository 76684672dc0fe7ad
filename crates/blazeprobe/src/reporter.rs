//! Reporter - journey logs and report rendering
//!
//! The reporter is an explicit value owned by whoever runs journeys; each
//! journey gets a [`TestLog`] from [`Reporter::create_test`] and writes its
//! steps, verdicts and screenshots there.
//!
//! ```text
//! ┌──────────────┐  create_test   ┌───────────┐  log_step / log_pass / ...
//! │   Reporter   │ ─────────────► │  TestLog  │ ◄──────────────────────────
//! │              │                │           │  attach_screenshot
//! │  flush(dir)  │                └───────────┘
//! └──────┬───────┘
//!        ├── report.html   (screenshots embedded as base64)
//!        ├── report.json
//!        └── junit.xml
//! ```
//!
//! With [`FailureMode::AndonCord`] the runner stops after the first failing
//! journey; [`FailureMode::CollectAll`] runs everything.

use crate::driver::Screenshot;
use crate::result::ProbeResult;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What to do after a failing journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureMode {
    /// Stop the run on the first failure
    AndonCord,
    /// Run every journey and report all failures
    #[default]
    CollectAll,
}

/// Journey status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Still running
    Pending,
    /// Finished without failure
    Passed,
    /// At least one failure logged
    Failed,
    /// Not run
    Skipped,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    const fn css_class(self) -> &'static str {
        match self {
            Self::Passed => "pass",
            Self::Failed => "fail",
            Self::Skipped | Self::Pending => "skip",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::Skipped => "SKIP",
        };
        f.write_str(label)
    }
}

/// Severity of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// An action the journey performs
    Step,
    /// A verified expectation
    Pass,
    /// A failed expectation or error
    Fail,
    /// Extra context
    Info,
    /// Something odd that did not fail the journey
    Warning,
}

/// One line of a journey log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Severity
    pub level: LogLevel,
    /// Message
    pub message: String,
    /// Milliseconds since the journey started
    pub elapsed_ms: u64,
}

/// Screenshot attached to a journey, stored base64-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Caption
    pub label: String,
    /// PNG bytes, base64
    pub png_base64: String,
}

/// Log of a single journey
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestLog {
    /// Journey name
    pub name: String,
    /// What the journey checks
    pub description: String,
    /// Current status
    pub status: TestStatus,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Set by [`TestLog::finish`]
    pub duration: Duration,
    /// First failure message
    pub error: Option<String>,
    /// Log lines, in order
    pub entries: Vec<LogEntry>,
    /// Screenshots, in order
    pub attachments: Vec<Attachment>,
    #[serde(skip, default = "Instant::now")]
    clock: Instant,
}

impl TestLog {
    fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: TestStatus::Pending,
            started_at: Utc::now(),
            duration: Duration::ZERO,
            error: None,
            entries: Vec::new(),
            attachments: Vec::new(),
            clock: Instant::now(),
        }
    }

    fn push(&mut self, level: LogLevel, message: String) {
        self.entries.push(LogEntry {
            level,
            message,
            elapsed_ms: self.clock.elapsed().as_millis() as u64,
        });
    }

    /// Record an action
    pub fn log_step(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(journey = %self.name, "{message}");
        self.push(LogLevel::Step, message);
    }

    /// Record a verified expectation
    pub fn log_pass(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(journey = %self.name, "PASS {message}");
        self.push(LogLevel::Pass, message);
    }

    /// Record a failure; the journey is failed from here on
    pub fn log_fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(journey = %self.name, "FAIL {message}");
        self.status = TestStatus::Failed;
        if self.error.is_none() {
            self.error = Some(message.clone());
        }
        self.push(LogLevel::Fail, message);
    }

    /// Record context
    pub fn log_info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(journey = %self.name, "{message}");
        self.push(LogLevel::Info, message);
    }

    /// Record a warning
    pub fn log_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(journey = %self.name, "{message}");
        self.push(LogLevel::Warning, message);
    }

    /// Attach a screenshot
    pub fn attach_screenshot(&mut self, label: impl Into<String>, screenshot: &Screenshot) {
        let label = label.into();
        tracing::debug!(journey = %self.name, bytes = screenshot.size_bytes(), "screenshot {label}");
        self.attachments.push(Attachment {
            label,
            png_base64: base64::engine::general_purpose::STANDARD.encode(&screenshot.data),
        });
    }

    /// Mark as skipped
    pub fn skip(&mut self, reason: impl Into<String>) {
        self.status = TestStatus::Skipped;
        self.push(LogLevel::Info, reason.into());
    }

    /// Stop the clock; a journey with no failure becomes `Passed`
    pub fn finish(&mut self) {
        self.duration = self.clock.elapsed();
        if self.status == TestStatus::Pending {
            self.status = TestStatus::Passed;
        }
    }

    /// Number of lines at `level`
    #[must_use]
    pub fn count(&self, level: LogLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }
}

/// Files written by [`Reporter::flush`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    /// HTML report
    pub html: PathBuf,
    /// JSON report
    pub json: PathBuf,
    /// JUnit XML
    pub junit: PathBuf,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    suite: &'a str,
    generated_at: DateTime<Utc>,
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    tests: &'a [TestLog],
}

/// Collects journey logs and renders reports
///
/// ```ignore
/// let mut reporter = Reporter::new().with_name("DemoBlaze");
/// let log = reporter.create_test("login_valid", "Log in with a registered user");
/// log.log_step("open login modal");
/// log.finish();
/// reporter.flush(Path::new("target/report"))?;
/// ```
#[derive(Debug)]
pub struct Reporter {
    suite_name: String,
    failure_mode: FailureMode,
    tests: Vec<TestLog>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    /// Create new reporter (collect-all)
    #[must_use]
    pub fn new() -> Self {
        Self {
            suite_name: "blazeprobe".to_string(),
            failure_mode: FailureMode::CollectAll,
            tests: Vec::new(),
        }
    }

    /// Create reporter that stops on the first failure
    #[must_use]
    pub fn andon() -> Self {
        Self::new().with_failure_mode(FailureMode::AndonCord)
    }

    /// Set suite name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Set failure mode
    #[must_use]
    pub const fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Suite name
    #[must_use]
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Failure mode
    #[must_use]
    pub const fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    /// Start a new journey log
    pub fn create_test(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> &mut TestLog {
        let log = TestLog::new(name, description);
        tracing::info!(journey = %log.name, "start");
        self.tests.push(log);
        let last = self.tests.len() - 1;
        &mut self.tests[last]
    }

    /// Whether the run should stop before the next journey
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.failure_mode == FailureMode::AndonCord && self.failed_count() > 0
    }

    /// All logs, in creation order
    #[must_use]
    pub fn tests(&self) -> &[TestLog] {
        &self.tests
    }

    /// Log by journey name
    #[must_use]
    pub fn test(&self, name: &str) -> Option<&TestLog> {
        self.tests.iter().find(|t| t.name == name)
    }

    /// Get number of passed journeys
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.tests.iter().filter(|t| t.status.is_passed()).count()
    }

    /// Get number of failed journeys
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.tests.iter().filter(|t| t.status.is_failed()).count()
    }

    /// Get number of skipped journeys
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.tests
            .iter()
            .filter(|t| t.status == TestStatus::Skipped)
            .count()
    }

    /// Get total journey count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.tests.len()
    }

    /// Get pass rate (0.0 to 1.0)
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.tests.is_empty() {
            return 1.0;
        }
        self.passed_count() as f64 / self.tests.len() as f64
    }

    /// Check if all journeys passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get total duration
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.tests.iter().map(|t| t.duration).sum()
    }

    /// Failing journeys
    #[must_use]
    pub fn failures(&self) -> Vec<&TestLog> {
        self.tests.iter().filter(|t| t.status.is_failed()).collect()
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} passed ({:.1}%)",
            self.suite_name,
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0
        )
    }

    /// Write `report.html`, `report.json` and `junit.xml` into `dir`
    ///
    /// # Errors
    ///
    /// Returns error if the directory or a file cannot be written
    pub fn flush(&self, dir: &Path) -> ProbeResult<ReportFiles> {
        std::fs::create_dir_all(dir)?;
        let files = ReportFiles {
            html: dir.join("report.html"),
            json: dir.join("report.json"),
            junit: dir.join("junit.xml"),
        };
        std::fs::write(&files.html, self.render_html())?;
        std::fs::write(&files.json, self.render_json()?)?;
        std::fs::write(&files.junit, self.render_junit())?;
        tracing::info!(dir = %dir.display(), tests = self.total_count(), "report written");
        Ok(files)
    }

    /// Render JSON report content
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn render_json(&self) -> ProbeResult<String> {
        let report = JsonReport {
            suite: &self.suite_name,
            generated_at: Utc::now(),
            total: self.total_count(),
            passed: self.passed_count(),
            failed: self.failed_count(),
            skipped: self.skipped_count(),
            tests: &self.tests,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Render HTML report content
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>blazeprobe report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .passed { background: #4caf50; height: 100%; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .test.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .log { font-family: monospace; font-size: 0.9em; margin: 4px 0 0 0; padding-left: 18px; }
        .log .fail { color: #d32f2f; }
        .log .warning { color: #ef6c00; }
        .log .pass { color: #2e7d32; }
        .shot img { max-width: 480px; border: 1px solid #ddd; margin-top: 6px; }
    </style>
</head>
<body>
"#,
        );

        html.push_str(&format!(
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>Results: {}/{} passed ({:.1}%)</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {:.1}%"></div>
    </div>
    <p>Duration: {:.2}s</p>
</div>
"#,
            escape_xml(&self.suite_name),
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0,
            self.pass_rate() * 100.0,
            self.total_duration().as_secs_f64()
        ));

        html.push_str("<h2>Journeys</h2>\n");
        for test in &self.tests {
            html.push_str(&format!(
                r#"<div class="test {}">
    <strong>{}</strong> - {} ({:.2}ms)
    <p>{}</p>
"#,
                test.status.css_class(),
                escape_xml(&test.name),
                test.status,
                test.duration.as_secs_f64() * 1000.0,
                escape_xml(&test.description)
            ));

            if let Some(error) = &test.error {
                html.push_str(&format!(
                    "    <div class=\"error\">{}</div>\n",
                    escape_xml(error)
                ));
            }

            if !test.entries.is_empty() {
                html.push_str("    <ol class=\"log\">\n");
                for entry in &test.entries {
                    let class = match entry.level {
                        LogLevel::Fail => "fail",
                        LogLevel::Warning => "warning",
                        LogLevel::Pass => "pass",
                        LogLevel::Step | LogLevel::Info => "info",
                    };
                    html.push_str(&format!(
                        "        <li class=\"{class}\">[{:>6}ms] {}</li>\n",
                        entry.elapsed_ms,
                        escape_xml(&entry.message)
                    ));
                }
                html.push_str("    </ol>\n");
            }

            for shot in &test.attachments {
                html.push_str(&format!(
                    "    <div class=\"shot\"><em>{label}</em><br><img alt=\"{label}\" src=\"data:image/png;base64,{}\"></div>\n",
                    shot.png_base64,
                    label = escape_xml(&shot.label)
                ));
            }

            html.push_str("</div>\n");
        }

        html.push_str(
            r#"
<footer>
    <p>Generated by blazeprobe</p>
</footer>
</body>
</html>
"#,
        );

        html
    }

    /// Render JUnit XML content
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        ));
        xml.push('\n');

        for test in &self.tests {
            xml.push_str(&format!(
                r#"  <testcase name="{}" time="{:.3}">"#,
                escape_xml(&test.name),
                test.duration.as_secs_f64()
            ));
            xml.push('\n');

            match test.status {
                TestStatus::Failed => {
                    let error = test.error.as_deref().unwrap_or("failed");
                    xml.push_str(&format!(
                        r#"    <failure message="{}">{}</failure>"#,
                        escape_xml(error),
                        escape_xml(error)
                    ));
                    xml.push('\n');
                }
                TestStatus::Skipped => xml.push_str("    <skipped/>\n"),
                TestStatus::Passed | TestStatus::Pending => {}
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
