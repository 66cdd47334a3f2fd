//! Controlled vocabularies and value patterns.
//!
//! The term lists follow the MODS user guidelines as applied to replayable
//! spreadsheets. Matching is exact and case-sensitive: `Text` is not `text`.

use lazy_static::lazy_static;
use regex::Regex;

use crate::cell::CellValue;

lazy_static! {
    static ref DRUID: Regex = Regex::new(r"^[a-z]{2}[0-9]{3}[a-z]{2}[0-9]{4}$").expect("valid regex");
    static ref W3CDTF: Regex =
        Regex::new(r"^\d{4}$|^\d{4}-\d{2}$|^\d{4}-\d{2}-\d{2}$").expect("valid regex");
}

/// A fixed list of allowed values for one kind of column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
    terms: &'static [&'static str],
}

impl Vocabulary {
    /// `titleInfo/@type`
    pub const TITLE_TYPE: Vocabulary = Vocabulary {
        terms: &["alternative", "abbreviated", "translated", "uniform"],
    };

    /// `name/@type`, also the type of a name subject's first part
    pub const NAME_TYPE: Vocabulary = Vocabulary {
        terms: &["conference", "corporate", "family", "personal"],
    };

    /// `name/@usage`
    pub const NAME_USAGE: Vocabulary = Vocabulary {
        terms: &["primary"],
    };

    /// `typeOfResource`
    pub const RESOURCE_TYPE: Vocabulary = Vocabulary {
        terms: &[
            "text",
            "cartographic",
            "notated music",
            "sound recording",
            "sound recording-musical",
            "sound recording-nonmusical",
            "still image",
            "moving image",
            "three dimensional object",
            "software, multimedia",
            "mixed material",
        ],
    };

    /// Attributes whose only valid value is `yes` (`keyDate`, `manuscript`)
    pub const YES: Vocabulary = Vocabulary {
        terms: &["yes"],
    };

    /// `originInfo/date*/@qualifier`
    pub const DATE_QUALIFIER: Vocabulary = Vocabulary {
        terms: &["approximate", "inferred", "questionable"],
    };

    /// `originInfo/date*/@point`
    pub const DATE_POINT: Vocabulary = Vocabulary {
        terms: &["start", "end"],
    };

    /// `originInfo/date*/@encoding`
    pub const DATE_ENCODING: Vocabulary = Vocabulary {
        terms: &["w3cdtf", "iso8601", "marc", "edtf", "temper"],
    };

    /// `originInfo/issuance`
    pub const ISSUANCE: Vocabulary = Vocabulary {
        terms: &[
            "continuing",
            "monographic",
            "single unit",
            "multipart monograph",
            "serial",
            "integrating resource",
        ],
    };

    /// Subject sub-element names
    pub const SUBJECT_ELEMENT: Vocabulary = Vocabulary {
        terms: &["topic", "geographic", "temporal", "genre"],
    };

    /// The allowed terms, in guideline order.
    #[must_use]
    pub fn terms(&self) -> &'static [&'static str] {
        self.terms
    }

    /// Whether `value` is exactly one of the allowed terms.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.terms.contains(&value)
    }
}

/// Spreadsheet formula-error tokens (and the literal `0`) tallied per cell.
///
/// A `0` is almost always the residue of a lookup formula pointing at an
/// empty cell, but it is indistinguishable from a genuine zero, so it is only
/// ever reported as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormulaSentinel {
    /// `#N/A`
    NotAvailable,
    /// `#REF!`
    Ref,
    /// `0`
    Zero,
    /// `#NAME?`
    Name,
    /// `#VALUE!` (also written `#VALUE?`)
    Value,
}

impl FormulaSentinel {
    /// All sentinels in reporting order.
    pub const ALL: [FormulaSentinel; 5] = [
        FormulaSentinel::NotAvailable,
        FormulaSentinel::Ref,
        FormulaSentinel::Zero,
        FormulaSentinel::Name,
        FormulaSentinel::Value,
    ];

    /// Match a rendered cell value exactly.
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "#N/A" => Some(FormulaSentinel::NotAvailable),
            "#REF!" => Some(FormulaSentinel::Ref),
            "0" => Some(FormulaSentinel::Zero),
            "#NAME?" => Some(FormulaSentinel::Name),
            "#VALUE!" | "#VALUE?" => Some(FormulaSentinel::Value),
            _ => None,
        }
    }

    /// The token as it appears in a spreadsheet.
    #[must_use]
    pub fn token(&self) -> &'static str {
        match self {
            FormulaSentinel::NotAvailable => "#N/A",
            FormulaSentinel::Ref => "#REF!",
            FormulaSentinel::Zero => "0",
            FormulaSentinel::Name => "#NAME?",
            FormulaSentinel::Value => "#VALUE!",
        }
    }

    /// Whether hits are reported as errors rather than warnings.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !matches!(self, FormulaSentinel::Zero)
    }

    /// Description used for the end-of-run finding.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            FormulaSentinel::Zero => "Cell value is 0".to_string(),
            other => format!("{} error in cell", other.token()),
        }
    }
}

/// Whether a cell holds a formula-error sentinel and should be exempt from
/// term-list checks (it is reported separately).
#[must_use]
pub fn is_sentinel(cell: &CellValue) -> bool {
    FormulaSentinel::from_value(&cell.render()).is_some()
}

/// Whether a druid has the expected shape (surrounding whitespace ignored).
///
/// # Examples
///
/// ```
/// use rpsv::vocabulary::is_valid_druid;
///
/// assert!(is_valid_druid("aa111aa1111"));
/// assert!(is_valid_druid(" aa111aa1111 "));
/// assert!(!is_valid_druid("druid:aa111aa1111"));
/// ```
#[must_use]
pub fn is_valid_druid(druid: &str) -> bool {
    DRUID.is_match(druid.trim())
}

/// Whether a date value matches the `YYYY`, `YYYY-MM` or `YYYY-MM-DD` forms of
/// the W3C date-time format.
#[must_use]
pub fn is_w3cdtf(value: &str) -> bool {
    W3CDTF.is_match(value)
}
