//! Common test helpers and utilities shared across test suite.

use std::fs;
use std::path::{Path, PathBuf};

use rpsv::{Finding, Severity, ValidationOutcome, Validator, ValidatorConfig};
use tempfile::TempDir;

/// Path to a fixture under `tests/data`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// A validator using the bundled template.
#[allow(dead_code)]
pub fn validator() -> Validator {
    Validator::new(ValidatorConfig::default()).expect("bundled template parses")
}

/// Write `bytes` to `name` inside a fresh temporary directory.
///
/// The directory is returned so it lives as long as the caller needs the file.
#[allow(dead_code)]
pub fn write_temp(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, bytes).expect("write temp file");
    (dir, path)
}

/// Validate CSV text written to a temporary `.csv` file.
#[allow(dead_code)]
pub fn validate_csv(content: &str) -> ValidationOutcome {
    let (_dir, path) = write_temp("records.csv", content.as_bytes());
    validator().validate_file(&path)
}

/// `(severity, message, locator)` triples, in report order.
#[allow(dead_code)]
pub fn triples(findings: &[Finding]) -> Vec<(Severity, String, String)> {
    findings
        .iter()
        .map(|f| (f.severity, f.message.clone(), f.locator.to_string()))
        .collect()
}

/// Whether the outcome holds a finding with this severity and message.
#[allow(dead_code)]
pub fn has_finding(outcome: &ValidationOutcome, severity: Severity, message: &str) -> bool {
    outcome
        .findings()
        .iter()
        .any(|f| f.severity == severity && f.message == message)
}
