#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # RPSV: Replayable Spreadsheet Validator
//!
//! Checks a spreadsheet of MODS metadata (one record per row, one metadata
//! element per column) before it is converted to XML records, and reports
//! every problem found as a severity-tagged [`Finding`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use rpsv::{ReportFormat, Validator, ValidatorConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = Validator::new(ValidatorConfig::default())?;
//! let outcome = validator.validate_file(Path::new("records.xlsx"));
//!
//! if outcome.is_clean() {
//!     println!("No errors logged.");
//! } else {
//!     outcome.write_report(ReportFormat::Csv, std::io::stdout())?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`grid`]: Loading `.csv`, `.xls` and `.xlsx` sources into a uniform grid
//! - [`cell`]: Tagged cell values and A1-style cell references
//! - [`encoding`]: Character-set detection for CSV sources
//! - [`header`]: Header code tokenizing and date field names
//! - [`template`]: Reference MODS template and its placeholder codes
//! - [`schema`]: Header row discovery, field groups and header checks
//! - [`rows`]: Per-row and per-cell checks
//! - [`dates`]: originInfo date checks
//! - [`tally`]: Whole-file checks accumulated during the row pass
//! - [`vocabulary`]: Controlled term lists, formula sentinels and value syntax
//! - [`finding`]: Findings, severities and report rendering
//! - [`validator`]: Running a complete validation
//! - [`logging`]: `tracing` subscriber setup for applications
//! - [`error`]: Error types and result type

pub mod cell;
pub mod dates;
pub mod encoding;
pub mod error;
pub mod finding;
pub mod grid;
pub mod header;
pub mod logging;
pub mod rows;
pub mod schema;
pub mod tally;
pub mod template;
pub mod validator;
pub mod vocabulary;

pub use cell::CellValue;
pub use error::{Result, RpsError};
pub use finding::{
    Fatal, Finding, FindingLog, Locator, ReportFormat, Severity, ValidationOutcome,
};
pub use grid::{Grid, SourceFormat};
pub use header::HeaderCode;
pub use schema::Schema;
pub use template::Template;
pub use validator::{Validator, ValidatorConfig};
