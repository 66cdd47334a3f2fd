//! Findings, severity buckets and report sinks.
//!
//! Problems in a spreadsheet are reported as [`Finding`]s rather than errors.
//! Non-fatal findings accumulate in a [`FindingLog`] for the whole run. A fatal
//! problem is a [`Fatal`] value returned by the stage that found it; the run
//! stops there and the outcome holds that one finding.
//!
//! # Examples
//!
//! ```
//! use rpsv::finding::{FindingLog, Locator, Severity, ValidationOutcome};
//!
//! let mut log = FindingLog::new();
//! log.info(Locator::label("B3"), "Blank source ID");
//! log.error(Locator::record("aa111aa1111"), "Blank ti1:title");
//!
//! let outcome = ValidationOutcome::Completed(log.into_sorted());
//! assert_eq!(outcome.findings()[0].severity, Severity::Error);
//!
//! let mut report = Vec::new();
//! outcome.write_csv(&mut report)?;
//! assert!(String::from_utf8_lossy(&report).starts_with("Type,Description,Locator"));
//! # Ok::<(), rpsv::RpsError>(())
//! ```

use std::fmt;
use std::io::Write;

use serde::{Serialize, Serializer};

use crate::error::{Result, RpsError};

/// How serious a finding is.
///
/// Ordered so that `Info < Warning < Error < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Not necessarily a problem; for the user to review
    Info,
    /// Suspicious data, extra data, or data not meeting recommendations
    Warning,
    /// Invalid MODS or data not meeting baseline requirements
    Error,
    /// The file cannot be validated at all
    Fatal,
}

impl Severity {
    /// The label used in reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a finding applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// A spreadsheet cell reference such as `B4`
    Cell(String),
    /// A record identifier: the druid, or `row N` when the druid is blank
    Record(String),
    /// A free-form label: `file`, `headers`, a column code, a joined list
    Label(String),
}

impl Locator {
    /// Cell reference locator.
    pub fn cell(reference: impl Into<String>) -> Self {
        Locator::Cell(reference.into())
    }

    /// Record identifier locator.
    pub fn record(id: impl Into<String>) -> Self {
        Locator::Record(id.into())
    }

    /// Free-form label locator.
    pub fn label(label: impl Into<String>) -> Self {
        Locator::Label(label.into())
    }

    /// The locator text as reported.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Locator::Cell(s) | Locator::Record(s) | Locator::Label(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One reported outcome of validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Finding {
    /// Severity bucket
    #[serde(rename = "type")]
    pub severity: Severity,
    /// Human-readable description
    #[serde(rename = "description")]
    pub message: String,
    /// Where the problem is
    pub locator: Locator,
}

impl Finding {
    /// Create a finding.
    pub fn new(severity: Severity, message: impl Into<String>, locator: Locator) -> Self {
        Finding {
            severity,
            message: message.into(),
            locator,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.locator)
    }
}

/// A problem that prevents validating the file at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fatal {
    message: String,
    locator: Locator,
}

impl Fatal {
    /// The file extension is not `.csv`, `.xls` or `.xlsx`.
    #[must_use]
    pub fn unsupported_extension(extension: &str) -> Self {
        Fatal {
            message: format!("Invalid input file extension {extension}: use .csv, .xls, or .xlsx"),
            locator: Locator::label("filename"),
        }
    }

    /// The CSV file is in a charset other than UTF-8 or ASCII.
    #[must_use]
    pub fn bad_encoding(charset_label: &str) -> Self {
        Fatal {
            message: format!(
                "Invalid encoding: File charset={charset_label} instead of UTF-8 or ASCII"
            ),
            locator: Locator::label("file"),
        }
    }

    /// The file could not be opened or parsed.
    #[must_use]
    pub fn unreadable_file() -> Self {
        Fatal {
            message: "Could not open file, check for bad character encoding".to_string(),
            locator: Locator::label("file"),
        }
    }

    /// No header row was found in the scanned rows.
    #[must_use]
    pub fn header_not_found() -> Self {
        Fatal {
            message: "Invalid header row, must begin with druid & sourceId (case-sensitive) and appear in first ten lines of file".to_string(),
            locator: Locator::label("headers"),
        }
    }

    /// The description of the fatal problem.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Convert into a reportable finding.
    #[must_use]
    pub fn into_finding(self) -> Finding {
        Finding::new(Severity::Fatal, self.message, self.locator)
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.locator)
    }
}

/// Append-only buffer of non-fatal findings for one run.
#[derive(Debug, Clone, Default)]
pub struct FindingLog {
    findings: Vec<Finding>,
}

impl FindingLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an ERROR.
    pub fn error(&mut self, locator: Locator, message: impl Into<String>) {
        self.push(Finding::new(Severity::Error, message, locator));
    }

    /// Record a WARNING.
    pub fn warning(&mut self, locator: Locator, message: impl Into<String>) {
        self.push(Finding::new(Severity::Warning, message, locator));
    }

    /// Record an INFO.
    pub fn info(&mut self, locator: Locator, message: impl Into<String>) {
        self.push(Finding::new(Severity::Info, message, locator));
    }

    fn push(&mut self, finding: Finding) {
        debug_assert!(finding.severity != Severity::Fatal);
        self.findings.push(finding);
    }

    /// Number of findings recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    /// Number of findings with the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Drain the log, ordered ERROR → WARNING → INFO and by insertion order
    /// within each severity.
    #[must_use]
    pub fn into_sorted(self) -> Vec<Finding> {
        let mut findings = self.findings;
        findings.sort_by(|a, b| b.severity.cmp(&a.severity));
        findings
    }
}

/// Output format of a findings report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// `Type,Description,Locator` table
    #[default]
    Csv,
    /// JSON array of `{type, description, locator}` objects
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// The terminal result of one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// A fatal problem stopped validation; no other findings are reported
    Aborted(Finding),
    /// Validation ran to the end; findings ordered by descending severity
    Completed(Vec<Finding>),
}

impl ValidationOutcome {
    /// All reported findings.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        match self {
            ValidationOutcome::Aborted(finding) => std::slice::from_ref(finding),
            ValidationOutcome::Completed(findings) => findings,
        }
    }

    /// Whether validation was stopped by a fatal problem.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, ValidationOutcome::Aborted(_))
    }

    /// Whether no findings at all were reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings().is_empty()
    }

    /// Whether any FATAL or ERROR finding was reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.findings()
            .iter()
            .any(|f| f.severity >= Severity::Error)
    }

    /// Number of findings with the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.findings()
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Write the findings in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or serialization fails.
    pub fn write_report<W: Write>(&self, format: ReportFormat, writer: W) -> Result<()> {
        match format {
            ReportFormat::Csv => self.write_csv(writer),
            ReportFormat::Json => self.write_json(writer),
        }
    }

    /// Write the findings as a `Type,Description,Locator` CSV table.
    ///
    /// Nothing at all is written when there are no findings.
    ///
    /// # Errors
    ///
    /// Returns `RpsError::Csv` or `RpsError::IoError` if writing fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        if self.is_clean() {
            return Ok(());
        }
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["Type", "Description", "Locator"])?;
        for finding in self.findings() {
            csv_writer.write_record([
                finding.severity.label(),
                finding.message.as_str(),
                finding.locator.as_str(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the findings as a JSON array of `{type, description, locator}`.
    ///
    /// Nothing at all is written when there are no findings.
    ///
    /// # Errors
    ///
    /// Returns `RpsError::Report` if serialization fails.
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        if self.is_clean() {
            return Ok(());
        }
        serde_json::to_writer_pretty(&mut writer, self.findings())?;
        writeln!(writer).map_err(|e| RpsError::Report(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Fatal > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(Severity::Warning.to_string(), "WARNING");
    }

    #[test]
    fn test_sorted_keeps_insertion_order_within_severity() {
        let mut log = FindingLog::new();
        log.info(Locator::label("B2"), "Blank source ID");
        log.error(Locator::record("row 3"), "Missing druid");
        log.warning(Locator::record("aa111aa1111"), "No key date declared");
        log.error(Locator::record("row 4"), "Blank row");

        assert_eq!(log.count(Severity::Error), 2);
        let sorted = log.into_sorted();
        let messages: Vec<&str> = sorted.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Missing druid", "Blank row", "No key date declared", "Blank source ID"]
        );
    }

    #[test]
    fn test_fatal_messages() {
        let fatal = Fatal::unsupported_extension(".xxx");
        assert_eq!(
            fatal.message(),
            "Invalid input file extension .xxx: use .csv, .xls, or .xlsx"
        );
        let finding = fatal.into_finding();
        assert_eq!(finding.severity, Severity::Fatal);
        assert_eq!(finding.locator.as_str(), "filename");

        let finding = Fatal::bad_encoding("iso-8859-1").into_finding();
        assert_eq!(
            finding.message,
            "Invalid encoding: File charset=iso-8859-1 instead of UTF-8 or ASCII"
        );
        assert_eq!(finding.locator.as_str(), "file");
    }

    #[test]
    fn test_aborted_outcome_has_one_finding() {
        let outcome = ValidationOutcome::Aborted(Fatal::header_not_found().into_finding());
        assert!(outcome.is_aborted());
        assert!(outcome.has_errors());
        assert_eq!(outcome.findings().len(), 1);
        assert_eq!(outcome.count(Severity::Fatal), 1);
    }

    #[test]
    fn test_write_csv() {
        let mut log = FindingLog::new();
        log.error(Locator::label("aa111aa1111, bb222bb2222"), "Duplicate druids");
        let outcome = ValidationOutcome::Completed(log.into_sorted());

        let mut out = Vec::new();
        outcome.write_csv(&mut out).expect("csv written");
        let text = String::from_utf8(out).expect("utf-8");
        assert_eq!(
            text,
            "Type,Description,Locator\nERROR,Duplicate druids,\"aa111aa1111, bb222bb2222\"\n"
        );
    }

    #[test]
    fn test_clean_outcome_writes_nothing() {
        let outcome = ValidationOutcome::Completed(Vec::new());
        let mut csv_out = Vec::new();
        outcome.write_csv(&mut csv_out).expect("csv written");
        let mut json_out = Vec::new();
        outcome.write_json(&mut json_out).expect("json written");
        assert!(csv_out.is_empty());
        assert!(json_out.is_empty());
        assert!(!outcome.has_errors());
    }

    #[test]
    fn test_write_json_field_names() {
        let mut log = FindingLog::new();
        log.warning(Locator::cell("C4"), "Cell value is 0");
        let outcome = ValidationOutcome::Completed(log.into_sorted());

        let mut out = Vec::new();
        outcome.write_json(&mut out).expect("json written");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
        assert_eq!(value[0]["type"], "WARNING");
        assert_eq!(value[0]["description"], "Cell value is 0");
        assert_eq!(value[0]["locator"], "C4");
    }
}
