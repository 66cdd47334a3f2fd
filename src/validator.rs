//! Running a complete validation.
//!
//! [`Validator`] wires the stages together: the grid is loaded with
//! [`Grid::open`] (which checks the extension and charset), the schema is
//! discovered from the header row,
//! every data row is validated, and the run tally is drained. A fatal problem
//! in any of the early stages ends the run with
//! [`ValidationOutcome::Aborted`].
//!
//! # Examples
//!
//! ```
//! use rpsv::grid::Grid;
//! use rpsv::{Severity, ValidationOutcome, Validator, ValidatorConfig};
//!
//! let validator = Validator::new(ValidatorConfig::default())?;
//! let grid = Grid::from_text_rows(&[
//!     vec!["druid", "sourceId", "ti1:title", "ty1:typeOfResource"],
//!     vec!["aa111aa1111", "src-1", "", "text"],
//! ]);
//!
//! let outcome = validator.validate_grid(&grid);
//! assert!(!outcome.is_aborted());
//! assert!(outcome
//!     .findings()
//!     .iter()
//!     .any(|f| f.severity == Severity::Error && f.message == "Blank ti1:title"));
//! # Ok::<(), rpsv::RpsError>(())
//! ```

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{Result, RpsError};
use crate::finding::{Fatal, FindingLog, Severity, ValidationOutcome};
use crate::grid::Grid;
use crate::rows::RowValidator;
use crate::schema::{Schema, DEFAULT_HEADER_SCAN_LIMIT};
use crate::tally::RunTally;
use crate::template::Template;

/// Configuration for a [`Validator`].
///
/// # Examples
///
/// ```
/// use rpsv::template::Template;
/// use rpsv::ValidatorConfig;
///
/// let template = Template::parse("<mods><title>[[ti1:title]]</title></mods>")?;
/// let config = ValidatorConfig::new()
///     .with_template(template)
///     .with_header_scan_limit(20);
/// assert_eq!(config.header_scan_limit, 20);
/// # Ok::<(), rpsv::RpsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Reference template; the bundled template when `None`
    pub template: Option<Template>,
    /// Number of leading rows searched for the header row
    pub header_scan_limit: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            template: None,
            header_scan_limit: DEFAULT_HEADER_SCAN_LIMIT,
        }
    }
}

impl ValidatorConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom reference template.
    #[must_use]
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    /// Set the number of leading rows searched for the header row.
    #[must_use]
    pub const fn with_header_scan_limit(mut self, limit: usize) -> Self {
        self.header_scan_limit = limit;
        self
    }
}

/// Validates replayable spreadsheets.
///
/// A validator is immutable; every run owns its own grid, findings and tally,
/// so one validator can be shared across threads.
#[derive(Debug, Clone)]
pub struct Validator {
    template: Template,
    header_scan_limit: usize,
}

impl Validator {
    /// Create a validator from a configuration.
    ///
    /// # Errors
    ///
    /// Returns `RpsError::Template` if no template was configured and the
    /// bundled template does not parse.
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        let template = match config.template {
            Some(template) => template,
            None => Template::bundled()?,
        };
        debug!(codes = template.len(), "loaded reference template");
        Ok(Validator {
            template,
            header_scan_limit: config.header_scan_limit,
        })
    }

    /// The reference template in use.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Validate a `.csv`, `.xls` or `.xlsx` file.
    #[must_use]
    pub fn validate_file(&self, path: &Path) -> ValidationOutcome {
        debug!(path = %path.display(), "validating file");
        match self.load(path) {
            Ok(grid) => self.validate_grid(&grid),
            Err(fatal) => abort(fatal),
        }
    }

    /// Validate an in-memory grid.
    #[must_use]
    pub fn validate_grid(&self, grid: &Grid) -> ValidationOutcome {
        let mut log = FindingLog::new();
        let schema = match self.discover(grid, &mut log) {
            Ok(schema) => schema,
            Err(fatal) => return abort(fatal),
        };

        let mut tally = RunTally::new();
        RowValidator::new(&schema).validate_rows(grid, &mut tally, &mut log);
        let records = tally.druid_count();
        tally.report(&mut log);

        info!(
            rows = grid.len().saturating_sub(schema.header.index() + 1),
            records,
            errors = log.count(Severity::Error),
            warnings = log.count(Severity::Warning),
            info = log.count(Severity::Info),
            "validation complete"
        );
        ValidationOutcome::Completed(log.into_sorted())
    }

    /// Locate the header row, run the header checks and derive the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`Fatal`] if the header row cannot be found.
    pub fn discover(&self, grid: &Grid, log: &mut FindingLog) -> std::result::Result<Schema, Fatal> {
        Schema::discover(grid, &self.template, self.header_scan_limit, log)
    }

    fn load(&self, path: &Path) -> std::result::Result<Grid, Fatal> {
        Grid::open(path).map_err(|err| {
            debug!(error = %err, "could not load source");
            match err {
                RpsError::UnsupportedFormat(extension) => Fatal::unsupported_extension(&extension),
                RpsError::EncodingError(label) => Fatal::bad_encoding(&label),
                _ => Fatal::unreadable_file(),
            }
        })
    }
}

fn abort(fatal: Fatal) -> ValidationOutcome {
    warn!(reason = %fatal, "validation aborted");
    ValidationOutcome::Aborted(fatal.into_finding())
}
