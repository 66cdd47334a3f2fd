//! Tokenizing replayable-spreadsheet header codes.
//!
//! Every column of a replayable spreadsheet is named by a short code that
//! encodes where the value goes in the MODS record:
//!
//! ```text
//! [orN:]family[instance][:pN]:field
//!
//! ti1:title              title, first titleInfo
//! na2:type               name type, second name
//! dt:dateCreated2Point   point of the second dateCreated, first originInfo
//! or2:dt:dateCaptured    dateCaptured in the second originInfo
//! su1:p2:type            type of part 2 of the first subject
//! ```
//!
//! [`HeaderCode::parse`] turns such a code into a structured record once, so
//! that the schema discoverer can build typed lookup tables instead of
//! re-matching patterns for every row.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FAMILY_SEGMENT: Regex = Regex::new(r"^([A-Za-z]+)(\d*)$").expect("valid regex");
    static ref PART_SEGMENT: Regex = Regex::new(r"^p(\d+)$").expect("valid regex");
    static ref SCOPE_SEGMENT: Regex = Regex::new(r"^or(\d*)$").expect("valid regex");
}

/// A header code split into its structural parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderCode {
    raw: String,
    /// originInfo instance scope (`or2:` → `Some(2)`); `Some(1)` for a bare `or:`
    pub scope: Option<u32>,
    /// Element family (`ti`, `na`, `dt`, `su`, ...)
    pub family: String,
    /// Instance number following the family (`ti2` → `Some(2)`)
    pub instance: Option<u32>,
    /// Part number for subject-like families (`p3` → `Some(3)`)
    pub part: Option<u32>,
    /// Field name (`title`, `type`, `dateCreated2Point`, ...)
    pub field: String,
}

impl HeaderCode {
    /// Parse a header code. Returns `None` for codes without a family prefix
    /// (such as the `druid` and `sourceId` anchors) or with unrecognized
    /// segments.
    ///
    /// # Examples
    ///
    /// ```
    /// use rpsv::header::HeaderCode;
    ///
    /// let code = HeaderCode::parse("su1:p2:type").unwrap();
    /// assert_eq!(code.family, "su");
    /// assert_eq!(code.instance, Some(1));
    /// assert_eq!(code.part, Some(2));
    /// assert_eq!(code.field, "type");
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let segments: Vec<&str> = raw.split(':').collect();
        let (field, prefix) = segments.split_last()?;
        if field.is_empty() || prefix.is_empty() {
            return None;
        }

        let mut rest = prefix;
        let mut scope = None;
        if rest.len() > 1 {
            if let Some(caps) = SCOPE_SEGMENT.captures(rest[0]) {
                scope = Some(caps[1].parse().unwrap_or(1));
                rest = &rest[1..];
            }
        }

        let (family_segment, rest) = rest.split_first()?;
        let caps = FAMILY_SEGMENT.captures(family_segment)?;
        let family = caps[1].to_string();
        let instance = caps[2].parse().ok();

        let part = match rest {
            [] => None,
            [part_segment] => Some(PART_SEGMENT.captures(part_segment)?[1].parse().ok()?),
            _ => return None,
        };

        Some(HeaderCode {
            raw: raw.to_string(),
            scope,
            family,
            instance,
            part,
            field: (*field).to_string(),
        })
    }

    /// The code exactly as it appears in the header row.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Everything before the field name, including the trailing colon
    /// (`or2:dt:dateCaptured` → `or2:dt:`).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.raw[..self.raw.len() - self.field.len()]
    }

    /// Whether this code belongs to `family` with any instance number.
    #[must_use]
    pub fn is_instance_of(&self, family: &str) -> bool {
        self.scope.is_none() && self.family == family && self.instance.is_some()
    }

    /// For date codes (`dt` family), the date kind and role of the field.
    #[must_use]
    pub fn date_field(&self) -> Option<(DateKind, DateRole)> {
        if self.family != "dt" || self.part.is_some() {
            return None;
        }
        DateKind::split_field(&self.field)
    }
}

impl fmt::Display for HeaderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The originInfo date elements a replayable spreadsheet may carry.
///
/// `dateValid` and `dateModified` are not part of the spreadsheet template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DateKind {
    /// `dateCreated`
    Created,
    /// `dateIssued`
    Issued,
    /// `dateCaptured`
    Captured,
    /// `copyrightDate`
    Copyright,
    /// `dateOther`
    Other,
}

impl DateKind {
    /// All date kinds in template order.
    pub const ALL: [DateKind; 5] = [
        DateKind::Created,
        DateKind::Issued,
        DateKind::Captured,
        DateKind::Copyright,
        DateKind::Other,
    ];

    /// The MODS element name.
    #[must_use]
    pub fn element(&self) -> &'static str {
        match self {
            DateKind::Created => "dateCreated",
            DateKind::Issued => "dateIssued",
            DateKind::Captured => "dateCaptured",
            DateKind::Copyright => "copyrightDate",
            DateKind::Other => "dateOther",
        }
    }

    /// Split a date field name into its kind and role
    /// (`dateCreated2Point` → `(Created, Date2Point)`).
    #[must_use]
    pub fn split_field(field: &str) -> Option<(DateKind, DateRole)> {
        Self::ALL.iter().find_map(|kind| {
            let suffix = field.strip_prefix(kind.element())?;
            DateRole::from_suffix(suffix).map(|role| (*kind, role))
        })
    }
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element())
    }
}

/// The role a column plays within one date kind's cluster of columns.
///
/// Up to three logical dates are carried per kind. The first date and the
/// third date each have their own key-date flag and encoding; the second date
/// (the end of a range) shares the first date's encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DateRole {
    /// The first (or only) date value
    Date1,
    /// Key-date flag of the first date
    KeyDate,
    /// Encoding shared by the first and second dates
    Encoding,
    /// Qualifier of the first date
    Date1Qualifier,
    /// Point (start/end) of the first date
    Date1Point,
    /// The second date value
    Date2,
    /// Qualifier of the second date
    Date2Qualifier,
    /// Point of the second date
    Date2Point,
    /// The third date value
    Date3,
    /// Key-date flag of the third date
    Date3KeyDate,
    /// Encoding of the third date
    Date3Encoding,
    /// Qualifier of the third date
    Date3Qualifier,
}

impl DateRole {
    /// All roles in template column order.
    pub const ALL: [DateRole; 12] = [
        DateRole::Date1,
        DateRole::KeyDate,
        DateRole::Encoding,
        DateRole::Date1Qualifier,
        DateRole::Date1Point,
        DateRole::Date2,
        DateRole::Date2Qualifier,
        DateRole::Date2Point,
        DateRole::Date3,
        DateRole::Date3KeyDate,
        DateRole::Date3Encoding,
        DateRole::Date3Qualifier,
    ];

    /// The suffix appended to the date kind in the column code.
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        match self {
            DateRole::Date1 => "",
            DateRole::KeyDate => "KeyDate",
            DateRole::Encoding => "Encoding",
            DateRole::Date1Qualifier => "Qualifier",
            DateRole::Date1Point => "Point",
            DateRole::Date2 => "2",
            DateRole::Date2Qualifier => "2Qualifier",
            DateRole::Date2Point => "2Point",
            DateRole::Date3 => "3",
            DateRole::Date3KeyDate => "3KeyDate",
            DateRole::Date3Encoding => "3Encoding",
            DateRole::Date3Qualifier => "3Qualifier",
        }
    }

    /// Look up a role by column-code suffix.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|role| role.suffix() == suffix)
    }
}
