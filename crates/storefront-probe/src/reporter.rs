//! Result collection and report artifacts.
//!
//! The [`Reporter`] accumulates one [`TestResultEntry`] per journey and writes
//! every artifact the CI tooling reads:
//!
//! ```text
//! test-results/results.json          machine-readable run
//! test-results/junit.xml             CI test tab
//! playwright-report/index.html       human-readable report
//! allure-results/<uuid>-result.json  one Allure result per journey
//! ```
//!
//! In [`FailureMode::FailFast`] recording a failure returns an error so the
//! runner can stop the line; [`FailureMode::CollectAll`] keeps going.

use crate::fixture::OutputDirs;
use crate::result::{ProbeError, ProbeResult};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Allure epic every journey belongs to
pub const ALLURE_EPIC: &str = "Automation Exercise E2E Testing";

/// What to do after a failed journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Record the failure and run the remaining journeys
    #[default]
    CollectAll,
    /// Stop after the first failure
    FailFast,
}

/// Test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Allure severity of a journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocker,
    Critical,
    #[default]
    Normal,
    Minor,
    Trivial,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Blocker => "blocker",
            Self::Critical => "critical",
            Self::Normal => "normal",
            Self::Minor => "minor",
            Self::Trivial => "trivial",
        })
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// One named step of a journey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub status: TestStatus,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
    pub error: Option<String>,
}

/// File attached to a result, usually a failure screenshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub path: PathBuf,
    pub content_type: String,
}

impl Attachment {
    #[must_use]
    pub fn png(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content_type: "image/png".to_string(),
        }
    }
}

/// Individual journey result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultEntry {
    pub id: String,
    pub name: String,
    pub status: TestStatus,
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
    pub error: Option<String>,
    pub severity: Severity,
    pub feature: Option<String>,
    pub story: Option<String>,
    pub tags: Vec<String>,
    pub steps: Vec<StepRecord>,
    pub attachments: Vec<Attachment>,
    pub started_at: DateTime<Utc>,
}

impl TestResultEntry {
    fn new(name: impl Into<String>, status: TestStatus, duration: Duration) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            status,
            duration,
            error: None,
            severity: Severity::default(),
            feature: None,
            story: None,
            tags: Vec::new(),
            steps: Vec::new(),
            attachments: Vec::new(),
            started_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self::new(name, TestStatus::Passed, duration)
    }

    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        let mut entry = Self::new(name, TestStatus::Failed, duration);
        entry.error = Some(error.into());
        entry
    }

    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self::new(name, TestStatus::Skipped, Duration::ZERO)
    }

    /// Stable identifier, used as the Allure history id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_labels(
        mut self,
        severity: Severity,
        feature: impl Into<String>,
        story: impl Into<String>,
        tags: &[&str],
    ) -> Self {
        self.severity = severity;
        self.feature = Some(feature.into());
        self.story = Some(story.into());
        self.tags = tags.iter().map(|t| (*t).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_steps(mut self, steps: Vec<StepRecord>) -> Self {
        self.steps = steps;
        self
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    #[must_use]
    pub const fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = at;
        self
    }

    fn stopped_at(&self) -> DateTime<Utc> {
        self.started_at
            + chrono::Duration::from_std(self.duration).unwrap_or_else(|_| chrono::Duration::zero())
    }
}

/// Where [`Reporter::write_all`] put each artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub junit: PathBuf,
    pub html: PathBuf,
    pub allure: Vec<PathBuf>,
}

#[derive(Serialize)]
struct Stats {
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    suite: &'a str,
    started_at: DateTime<Utc>,
    duration_ms: u64,
    stats: Stats,
    environment: &'a [(String, String)],
    results: &'a [TestResultEntry],
}

/// Collects results and renders reports
#[derive(Debug)]
pub struct Reporter {
    results: Vec<TestResultEntry>,
    failure_mode: FailureMode,
    suite_name: String,
    environment: Vec<(String, String)>,
    started_at: DateTime<Utc>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            failure_mode: FailureMode::default(),
            suite_name: "Automation Exercise Test Cases".to_string(),
            environment: Vec::new(),
            started_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn fail_fast() -> Self {
        Self::new().with_failure_mode(FailureMode::FailFast)
    }

    #[must_use]
    pub const fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Key/value shown as the run environment (base URL, profile, browser)
    #[must_use]
    pub fn with_environment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.push((key.into(), value.into()));
        self
    }

    /// Reset the run clock
    pub fn start(&mut self) {
        self.started_at = Utc::now();
    }

    /// Record a result
    ///
    /// # Errors
    ///
    /// In [`FailureMode::FailFast`], returns an error when the result failed.
    pub fn record(&mut self, result: TestResultEntry) -> ProbeResult<()> {
        let failure = result
            .status
            .is_failed()
            .then(|| format!("{} failed: {}", result.id, result.error.as_deref().unwrap_or("")));
        self.results.push(result);
        match failure {
            Some(message) if self.failure_mode == FailureMode::FailFast => {
                Err(ProbeError::assertion(format!("stopping run, {message}")))
            }
            _ => Ok(()),
        }
    }

    #[must_use]
    pub const fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_passed()).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_failed()).count()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == TestStatus::Skipped)
            .count()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Passed share of the executed (non-skipped) journeys, 1.0 when none ran
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let executed = self.total_count() - self.skipped_count();
        if executed == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / executed as f64
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }

    #[must_use]
    pub fn results(&self) -> &[TestResultEntry] {
        &self.results
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&TestResultEntry> {
        self.results
            .iter()
            .filter(|r| r.status.is_failed())
            .collect()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} passed ({:.1}%), {} failed, {} skipped",
            self.suite_name,
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0,
            self.failed_count(),
            self.skipped_count()
        )
    }

    /// Write every artifact under `dirs`
    pub fn write_all(&self, dirs: &OutputDirs) -> ProbeResult<ReportPaths> {
        let json = dirs.test_results().join("results.json");
        let junit = dirs.test_results().join("junit.xml");
        let html = dirs.html_report().join("index.html");
        self.generate_json(&json)?;
        self.generate_junit(&junit)?;
        self.generate_html(&html)?;
        let allure = self.generate_allure(&dirs.allure_results())?;
        info!(
            json = %json.display(),
            junit = %junit.display(),
            html = %html.display(),
            allure = allure.len(),
            "reports written"
        );
        Ok(ReportPaths {
            json,
            junit,
            html,
            allure,
        })
    }

    // =========================================================================
    // JSON
    // =========================================================================

    pub fn render_json(&self) -> ProbeResult<String> {
        let report = JsonReport {
            suite: &self.suite_name,
            started_at: self.started_at,
            duration_ms: self.total_duration().as_millis() as u64,
            stats: Stats {
                total: self.total_count(),
                passed: self.passed_count(),
                failed: self.failed_count(),
                skipped: self.skipped_count(),
            },
            environment: &self.environment,
            results: &self.results,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    pub fn generate_json(&self, output_path: &Path) -> ProbeResult<()> {
        write_file(output_path, self.render_json()?.as_bytes())
    }

    // =========================================================================
    // JUNIT
    // =========================================================================

    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}" timestamp="{}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64(),
            self.started_at.format("%Y-%m-%dT%H:%M:%S")
        );

        for result in &self.results {
            let _ = writeln!(
                xml,
                r#"  <testcase classname="{}" name="{}" time="{:.3}">"#,
                escape_xml(result.feature.as_deref().unwrap_or(&self.suite_name)),
                escape_xml(&format!("{} - {}", result.id, result.name)),
                result.duration.as_secs_f64()
            );
            match result.status {
                TestStatus::Failed => {
                    let error = result.error.as_deref().unwrap_or("");
                    let _ = writeln!(
                        xml,
                        r#"    <failure message="{}">{}</failure>"#,
                        escape_xml(first_line(error)),
                        escape_xml(error)
                    );
                }
                TestStatus::Skipped => xml.push_str("    <skipped/>\n"),
                TestStatus::Passed => {}
            }
            for attachment in &result.attachments {
                let _ = writeln!(
                    xml,
                    "    <system-out>[[ATTACHMENT|{}]]</system-out>",
                    escape_xml(&attachment.path.display().to_string())
                );
            }
            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    pub fn generate_junit(&self, output_path: &Path) -> ProbeResult<()> {
        write_file(output_path, self.render_junit().as_bytes())
    }

    // =========================================================================
    // HTML
    // =========================================================================

    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Storefront Probe Report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .passed { background: #4caf50; height: 100%; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .test.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .labels { color: #666; font-size: 0.9em; }
        .steps { margin: 6px 0 0 18px; font-size: 0.9em; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .screenshot img { max-width: 480px; border: 1px solid #ddd; margin-top: 8px; }
    </style>
</head>
<body>
"#,
        );

        let _ = write!(
            html,
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>Results: {}/{} passed ({:.1}%)</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {:.1}%"></div>
    </div>
    <p>Started: {} &middot; Duration: {:.2}s</p>
"#,
            escape_xml(&self.suite_name),
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0,
            self.pass_rate() * 100.0,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.total_duration().as_secs_f64()
        );
        for (key, value) in &self.environment {
            let _ = writeln!(html, "    <p>{}: {}</p>", escape_xml(key), escape_xml(value));
        }
        html.push_str("</div>\n");

        html.push_str("<h2>Journeys</h2>\n");
        for result in &self.results {
            let class = match result.status {
                TestStatus::Passed => "pass",
                TestStatus::Failed => "fail",
                TestStatus::Skipped => "skip",
            };
            let _ = write!(
                html,
                r#"<div class="test {class}">
    <strong>{} - {}</strong> {} ({:.2}s)
    <div class="labels">{} &middot; {} &middot; {}</div>
"#,
                escape_xml(&result.id),
                escape_xml(&result.name),
                result.status.as_str(),
                result.duration.as_secs_f64(),
                result.severity,
                escape_xml(result.feature.as_deref().unwrap_or("-")),
                escape_xml(&result.tags.join(" "))
            );

            if !result.steps.is_empty() {
                html.push_str("    <ol class=\"steps\">\n");
                for step in &result.steps {
                    let _ = writeln!(
                        html,
                        "        <li>{} ({} ms) {}</li>",
                        escape_xml(&step.name),
                        step.duration.as_millis(),
                        step.status.as_str()
                    );
                }
                html.push_str("    </ol>\n");
            }

            if let Some(error) = &result.error {
                let _ = writeln!(html, r#"    <div class="error">{}</div>"#, escape_xml(error));
            }

            for attachment in &result.attachments {
                match std::fs::read(&attachment.path) {
                    Ok(bytes) => {
                        let _ = writeln!(
                            html,
                            r#"    <div class="screenshot"><img alt="{}" src="data:{};base64,{}"></div>"#,
                            escape_xml(&attachment.name),
                            attachment.content_type,
                            base64::engine::general_purpose::STANDARD.encode(bytes)
                        );
                    }
                    Err(e) => warn!(path = %attachment.path.display(), error = %e, "attachment unreadable"),
                }
            }

            html.push_str("</div>\n");
        }

        html.push_str(
            r#"
<footer>
    <p>Generated by storefront-probe</p>
</footer>
</body>
</html>
"#,
        );

        html
    }

    pub fn generate_html(&self, output_path: &Path) -> ProbeResult<()> {
        write_file(output_path, self.render_html().as_bytes())
    }

    // =========================================================================
    // ALLURE
    // =========================================================================

    /// Allure result document for one entry; attachment sources are the
    /// file names [`Reporter::generate_allure`] copies them to
    #[must_use]
    pub fn render_allure(
        &self,
        entry: &TestResultEntry,
        uuid: Uuid,
        attachment_sources: &[(String, String, String)],
    ) -> serde_json::Value {
        let mut labels = vec![
            serde_json::json!({"name": "epic", "value": ALLURE_EPIC}),
            serde_json::json!({"name": "severity", "value": entry.severity.to_string()}),
            serde_json::json!({"name": "suite", "value": self.suite_name}),
            serde_json::json!({"name": "testId", "value": entry.id}),
            serde_json::json!({"name": "framework", "value": "storefront-probe"}),
        ];
        if let Some(feature) = &entry.feature {
            labels.push(serde_json::json!({"name": "feature", "value": feature}));
        }
        if let Some(story) = &entry.story {
            labels.push(serde_json::json!({"name": "story", "value": story}));
        }
        for tag in &entry.tags {
            labels.push(serde_json::json!({"name": "tag", "value": tag.trim_start_matches('@')}));
        }

        let steps: Vec<serde_json::Value> = entry
            .steps
            .iter()
            .map(|step| {
                let start = step.started_at.timestamp_millis();
                serde_json::json!({
                    "name": step.name,
                    "status": step.status.as_str(),
                    "stage": "finished",
                    "start": start,
                    "stop": start + step.duration.as_millis() as i64,
                    "statusDetails": step.error.as_ref().map(|e| serde_json::json!({"message": e})),
                })
            })
            .collect();

        let attachments: Vec<serde_json::Value> = attachment_sources
            .iter()
            .map(|(name, source, kind)| serde_json::json!({"name": name, "source": source, "type": kind}))
            .collect();

        serde_json::json!({
            "uuid": uuid.to_string(),
            "historyId": entry.id,
            "testCaseId": entry.id,
            "fullName": format!("{}: {} - {}", self.suite_name, entry.id, entry.name),
            "name": format!("{} - {}", entry.id, entry.name),
            "status": entry.status.as_str(),
            "stage": "finished",
            "statusDetails": entry.error.as_ref().map(|e| serde_json::json!({"message": e})),
            "start": entry.started_at.timestamp_millis(),
            "stop": entry.stopped_at().timestamp_millis(),
            "labels": labels,
            "steps": steps,
            "attachments": attachments,
        })
    }

    /// Write `<uuid>-result.json` per entry plus copied attachments and
    /// `environment.properties`. Returns the result files.
    pub fn generate_allure(&self, dir: &Path) -> ProbeResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.results.len());
        for entry in &self.results {
            let uuid = Uuid::new_v4();
            let mut sources = Vec::new();
            for attachment in &entry.attachments {
                let extension = attachment
                    .path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("bin");
                let source = format!("{}-attachment.{extension}", Uuid::new_v4());
                match std::fs::copy(&attachment.path, dir.join(&source)) {
                    Ok(_) => sources.push((
                        attachment.name.clone(),
                        source,
                        attachment.content_type.clone(),
                    )),
                    Err(e) => warn!(path = %attachment.path.display(), error = %e, "attachment not copied"),
                }
            }
            let document = self.render_allure(entry, uuid, &sources);
            let path = dir.join(format!("{uuid}-result.json"));
            write_file(&path, serde_json::to_string_pretty(&document)?.as_bytes())?;
            written.push(path);
        }

        if !self.environment.is_empty() {
            let properties: String = self
                .environment
                .iter()
                .map(|(k, v)| format!("{k}={v}\n"))
                .collect();
            write_file(&dir.join("environment.properties"), properties.as_bytes())?;
        }
        Ok(written)
    }
}

fn write_file(path: &Path, contents: &[u8]) -> ProbeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
