//! Schema discovery from the header row.
//!
//! A replayable spreadsheet carries no schema besides its header codes. This
//! module finds the header row, runs the header-level checks, and derives the
//! typed lookup tables the row validator works from:
//!
//! - [`FieldGroups`]: columns sharing a structural role (title types, name
//!   types, resource types, issuance) plus the [`DateBucket`]s keyed by
//!   originInfo prefix and date kind
//! - [`SubjectPair`]s: matched subject value/type columns

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::cell::CellValue;
use crate::finding::{Fatal, FindingLog, Locator};
use crate::grid::Grid;
use crate::header::{DateKind, DateRole, HeaderCode};
use crate::template::Template;
use crate::vocabulary::Vocabulary;

/// Code of the first column.
pub const DRUID_CODE: &str = "druid";
/// Code of the second column.
pub const SOURCE_ID_CODE: &str = "sourceId";
/// The required title column.
pub const TITLE_CODE: &str = "ti1:title";
/// The recommended resource-type column.
pub const RESOURCE_TYPE_CODE: &str = "ty1:typeOfResource";
/// The name-usage column.
pub const NAME_USAGE_CODE: &str = "na1:usage";
/// The PURL column.
pub const PURL_CODE: &str = "lo:purl";
/// Default number of leading rows searched for the header row.
pub const DEFAULT_HEADER_SCAN_LIMIT: usize = 10;

/// The header row of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    index: usize,
    cells: Vec<String>,
    terms: Vec<String>,
}

impl HeaderRow {
    /// Build a header row from its rendered cells and 0-based row index.
    #[must_use]
    pub fn new(index: usize, cells: Vec<String>) -> Self {
        let terms = cells
            .iter()
            .filter(|cell| !cell.trim().is_empty())
            .cloned()
            .collect();
        HeaderRow {
            index,
            cells,
            terms,
        }
    }

    /// 0-based row index of the header row in the grid.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The raw header cells, blank cells included.
    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Non-blank header codes in column order, repeats included.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of cells in the header row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    /// Column index of the first occurrence of `code`.
    #[must_use]
    pub fn position(&self, code: &str) -> Option<usize> {
        self.cells.iter().position(|cell| cell == code)
    }

    /// Whether the header row contains `code`.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.position(code).is_some()
    }

    /// Whether the header cell above `column` is blank (or absent).
    #[must_use]
    pub fn is_blank_at(&self, column: usize) -> bool {
        self.cells
            .get(column)
            .map_or(true, |cell| cell.trim().is_empty())
    }

    /// Distinct non-blank codes, each with the column of its first occurrence.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        let mut seen = IndexSet::new();
        self.cells
            .iter()
            .enumerate()
            .filter(move |&(_, cell)| !cell.trim().is_empty() && seen.insert(cell.as_str()))
            .map(|(index, code)| Column {
                code: code.clone(),
                index,
            })
    }
}

/// Find the header row: the first of the leading `scan_limit` rows whose first
/// two cells are exactly `druid` and `sourceId`.
///
/// # Errors
///
/// Returns a [`Fatal`] (locator `headers`) if no such row exists.
pub fn locate_header(grid: &Grid, scan_limit: usize) -> Result<HeaderRow, Fatal> {
    for (index, row) in grid.rows().take(scan_limit).enumerate() {
        let first = row.first().map(CellValue::render);
        let second = row.get(1).map(CellValue::render);
        if first.as_deref() == Some(DRUID_CODE) && second.as_deref() == Some(SOURCE_ID_CODE) {
            debug!(row = index + 1, columns = row.len(), "found header row");
            let cells = row.iter().map(CellValue::render).collect();
            return Ok(HeaderRow::new(index, cells));
        }
    }
    Err(Fatal::header_not_found())
}

/// A header code and the column it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// The header code
    pub code: String,
    /// 0-based column index
    pub index: usize,
}

/// The columns for one date kind within one originInfo prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBucket {
    prefix: String,
    kind: DateKind,
    columns: BTreeMap<DateRole, usize>,
}

impl DateBucket {
    fn new(prefix: &str, kind: DateKind) -> Self {
        DateBucket {
            prefix: prefix.to_string(),
            kind,
            columns: BTreeMap::new(),
        }
    }

    /// The originInfo prefix (`dt:`, `or2:dt:` ...).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The date kind.
    #[must_use]
    pub fn kind(&self) -> DateKind {
        self.kind
    }

    /// Column index for a role, if that column is present.
    #[must_use]
    pub fn column(&self, role: DateRole) -> Option<usize> {
        self.columns.get(&role).copied()
    }

    /// Header code for a role, whether or not the column is present.
    #[must_use]
    pub fn code(&self, role: DateRole) -> String {
        format!("{}{}{}", self.prefix, self.kind.element(), role.suffix())
    }

    /// Roles with a column, in template order.
    pub fn roles(&self) -> impl Iterator<Item = DateRole> + '_ {
        self.columns.keys().copied()
    }
}

/// Date buckets keyed by originInfo prefix, then by date kind.
pub type DateGroups = IndexMap<String, IndexMap<DateKind, DateBucket>>;

/// Columns grouped by structural role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldGroups {
    /// `tiN:type`
    pub title_types: Vec<Column>,
    /// `naN:type`
    pub name_types: Vec<Column>,
    /// `tyN:*` other than the manuscript flag
    pub resource_types: Vec<Column>,
    /// `tyN:manuscript`
    pub manuscript_flags: Vec<Column>,
    /// Columns whose field is `issuance`
    pub issuance: Vec<Column>,
    /// Date columns
    pub dates: DateGroups,
}

impl FieldGroups {
    /// Derive the groups from a header row.
    #[must_use]
    pub fn derive(header: &HeaderRow) -> Self {
        let mut groups = FieldGroups::default();

        for column in header.columns() {
            let Some(code) = HeaderCode::parse(&column.code) else {
                continue;
            };

            if let Some((kind, role)) = code.date_field() {
                groups
                    .dates
                    .entry(code.prefix().to_string())
                    .or_default()
                    .entry(kind)
                    .or_insert_with(|| DateBucket::new(code.prefix(), kind))
                    .columns
                    .entry(role)
                    .or_insert(column.index);
                continue;
            }

            if code.part.is_some() {
                continue;
            }
            if code.is_instance_of("ti") && code.field == "type" {
                groups.title_types.push(column);
            } else if code.is_instance_of("na") && code.field == "type" {
                groups.name_types.push(column);
            } else if code.is_instance_of("ty") && code.field == "manuscript" {
                groups.manuscript_flags.push(column);
            } else if code.is_instance_of("ty") {
                groups.resource_types.push(column);
            } else if code.field == "issuance" {
                groups.issuance.push(column);
            }
        }

        for kinds in groups.dates.values_mut() {
            kinds.sort_keys();
        }

        debug!(
            title_types = groups.title_types.len(),
            name_types = groups.name_types.len(),
            resource_types = groups.resource_types.len(),
            issuance = groups.issuance.len(),
            date_prefixes = groups.dates.len(),
            "derived field groups"
        );
        groups
    }

    /// All date buckets in prefix order, then date-kind order.
    pub fn date_buckets(&self) -> impl Iterator<Item = &DateBucket> {
        self.dates.values().flat_map(IndexMap::values)
    }
}

/// Which vocabulary governs a subject pair's type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectTerm {
    /// Topical, geographic, temporal or genre sub-element
    SubElement,
    /// The name type of a name subject's first part
    NameType,
}

impl SubjectTerm {
    /// The controlled vocabulary for the type column.
    #[must_use]
    pub fn vocabulary(&self) -> Vocabulary {
        match self {
            SubjectTerm::SubElement => Vocabulary::SUBJECT_ELEMENT,
            SubjectTerm::NameType => Vocabulary::NAME_TYPE,
        }
    }

    /// Wording used in findings.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            SubjectTerm::SubElement => "subject type",
            SubjectTerm::NameType => "subject name type",
        }
    }
}

/// A subject value column and the column carrying its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPair {
    /// Column holding the subject value (or name)
    pub value: Column,
    /// Column holding the subject type (or name type)
    pub kind: Column,
    /// The vocabulary governing the type column
    pub term: SubjectTerm,
}

/// Everything the row validator needs to know about the columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// The located header row
    pub header: HeaderRow,
    /// Column groups
    pub groups: FieldGroups,
    /// Matched subject columns
    pub subjects: Vec<SubjectPair>,
}

impl Schema {
    /// Locate the header row, run the header checks and derive the groups.
    ///
    /// # Errors
    ///
    /// Returns a [`Fatal`] if the header row cannot be found.
    pub fn discover(
        grid: &Grid,
        template: &Template,
        scan_limit: usize,
        log: &mut FindingLog,
    ) -> Result<Self, Fatal> {
        let header = locate_header(grid, scan_limit)?;
        let subjects = check_headers(&header, template, log);
        let groups = FieldGroups::derive(&header);
        Ok(Schema {
            header,
            groups,
            subjects,
        })
    }

    /// Column index of the first occurrence of `code`.
    #[must_use]
    pub fn position(&self, code: &str) -> Option<usize> {
        self.header.position(code)
    }
}

/// Run the header-level checks and return the matched subject pairs.
pub fn check_headers(header: &HeaderRow, template: &Template, log: &mut FindingLog) -> Vec<SubjectPair> {
    let duplicates = duplicate_values(header.terms().iter().map(String::as_str));
    if !duplicates.is_empty() {
        let mut duplicates = duplicates;
        duplicates.sort_unstable();
        log.error(Locator::label(duplicates.join(", ")), "Contains duplicate headers");
    }

    let missing: IndexSet<&str> = header
        .terms()
        .iter()
        .map(String::as_str)
        .filter(|code| *code != DRUID_CODE && *code != SOURCE_ID_CODE)
        .filter(|code| !template.contains(code))
        .collect();
    if !missing.is_empty() {
        let missing: Vec<&str> = missing.into_iter().collect();
        log.info(Locator::label(missing.join(", ")), "Header not in XML template");
    }

    if !header.contains(TITLE_CODE) {
        log.error(Locator::label(TITLE_CODE), "Missing required column");
    }

    if !header.contains(RESOURCE_TYPE_CODE) {
        log.warning(Locator::label(RESOURCE_TYPE_CODE), "Recommended column missing");
    }

    subject_pairs(header, log)
}

#[derive(Default)]
struct SubjectSlot {
    value: Option<Column>,
    kind: Option<Column>,
    term: Option<SubjectTerm>,
}

fn subject_pairs(header: &HeaderRow, log: &mut FindingLog) -> Vec<SubjectPair> {
    let mut slots: IndexMap<String, SubjectSlot> = IndexMap::new();

    for column in header.columns() {
        let Some(code) = HeaderCode::parse(&column.code) else {
            continue;
        };
        let term = match (code.family.as_str(), code.part) {
            ("su", Some(1..=5)) | ("sn", Some(2..=5)) => SubjectTerm::SubElement,
            ("sn", Some(1)) => SubjectTerm::NameType,
            _ => continue,
        };
        if code.scope.is_some() || code.instance.is_none() {
            continue;
        }

        let slot = slots.entry(code.prefix().to_string()).or_default();
        slot.term = Some(term);
        match code.field.as_str() {
            "value" | "name" if slot.value.is_none() => slot.value = Some(column),
            "type" | "nameType" if slot.kind.is_none() => slot.kind = Some(column),
            _ => {},
        }
    }

    let mut pairs = Vec::new();
    for slot in slots.into_values() {
        match (slot.value, slot.kind, slot.term) {
            (Some(value), Some(kind), Some(term)) => pairs.push(SubjectPair { value, kind, term }),
            (None, Some(kind), _) => log.error(
                Locator::label(kind.code.clone()),
                format!("Missing subject value column header for {}", kind.code),
            ),
            (Some(value), None, _) => log.error(
                Locator::label(value.code.clone()),
                format!("Missing subject type column header for {}", value.code),
            ),
            _ => {},
        }
    }
    pairs
}

/// Values occurring more than once, in order of first repeat.
pub(crate) fn duplicate_values<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(value, _)| value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    fn header(codes: &[&str]) -> HeaderRow {
        HeaderRow::new(0, codes.iter().map(|s| (*s).to_string()).collect())
    }

    fn messages(log: &FindingLog) -> Vec<(Severity, String, String)> {
        log.iter()
            .map(|f| (f.severity, f.message.clone(), f.locator.to_string()))
            .collect()
    }

    #[test]
    fn test_locate_header_skips_preamble() {
        let grid = Grid::from_text_rows(&[
            vec!["Replayable spreadsheet"],
            vec![""],
            vec!["druid", "sourceId", "ti1:title"],
            vec!["aa111aa1111", "s1", "Title"],
        ]);
        let header = locate_header(&grid, DEFAULT_HEADER_SCAN_LIMIT).expect("header found");
        assert_eq!(header.index(), 2);
        assert_eq!(header.terms(), &["druid", "sourceId", "ti1:title"]);
        assert_eq!(header.position("ti1:title"), Some(2));
    }

    #[test]
    fn test_locate_header_is_case_sensitive_and_bounded() {
        let grid = Grid::from_text_rows(&[vec!["Druid", "sourceId"]]);
        let fatal = locate_header(&grid, DEFAULT_HEADER_SCAN_LIMIT).unwrap_err();
        assert_eq!(fatal, Fatal::header_not_found());

        let mut rows: Vec<Vec<&str>> = vec![vec!["x"]; 10];
        rows.push(vec!["druid", "sourceId"]);
        let grid = Grid::from_text_rows(&rows);
        assert!(locate_header(&grid, DEFAULT_HEADER_SCAN_LIMIT).is_err());
        assert!(locate_header(&grid, 11).is_ok());
    }

    #[test]
    fn test_header_checks_in_order() {
        let template = Template::parse("<mods><title>[[ti1:title]]</title><x>[[su1:p1:value]]</x></mods>")
            .expect("valid template");
        let header = header(&[
            "druid",
            "sourceId",
            "zz:bogus",
            "ti2:title",
            "zz:bogus",
            "ab:other",
            "su1:p1:value",
        ]);
        let mut log = FindingLog::new();
        let pairs = check_headers(&header, &template, &mut log);
        assert!(pairs.is_empty());
        assert_eq!(
            messages(&log),
            vec![
                (Severity::Error, "Contains duplicate headers".to_string(), "zz:bogus".to_string()),
                (
                    Severity::Info,
                    "Header not in XML template".to_string(),
                    "zz:bogus, ti2:title, ab:other".to_string()
                ),
                (Severity::Error, "Missing required column".to_string(), "ti1:title".to_string()),
                (
                    Severity::Warning,
                    "Recommended column missing".to_string(),
                    "ty1:typeOfResource".to_string()
                ),
                (
                    Severity::Error,
                    "Missing subject type column header for su1:p1:value".to_string(),
                    "su1:p1:value".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_duplicate_headers_sorted() {
        let template = Template::bundled().expect("bundled template");
        let header = header(&[
            "druid",
            "sourceId",
            "ti1:title",
            "ty1:typeOfResource",
            "ti1:title",
            "lo:purl",
            "lo:purl",
        ]);
        let mut log = FindingLog::new();
        check_headers(&header, &template, &mut log);
        assert_eq!(
            messages(&log),
            vec![(
                Severity::Error,
                "Contains duplicate headers".to_string(),
                "lo:purl, ti1:title".to_string()
            )]
        );
    }

    #[test]
    fn test_subject_pairs() {
        let header = header(&[
            "druid",
            "sourceId",
            "su1:p1:value",
            "su1:p1:type",
            "sn1:p1:name",
            "sn1:p1:nameType",
            "sn1:p2:value",
            "sn1:p2:type",
            "su2:p1:type",
            "su1:p6:value",
        ]);
        let mut log = FindingLog::new();
        let pairs = subject_pairs(&header, &mut log);

        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].value.index, 2);
        assert_eq!(pairs[0].kind.index, 3);
        assert_eq!(pairs[0].term, SubjectTerm::SubElement);
        assert_eq!(pairs[1].value.code, "sn1:p1:name");
        assert_eq!(pairs[1].term, SubjectTerm::NameType);
        assert_eq!(pairs[2].term, SubjectTerm::SubElement);

        assert_eq!(
            messages(&log),
            vec![(
                Severity::Error,
                "Missing subject value column header for su2:p1:type".to_string(),
                "su2:p1:type".to_string()
            )]
        );
    }

    #[test]
    fn test_field_groups() {
        let header = header(&[
            "druid",
            "sourceId",
            "ti1:title",
            "ti1:type",
            "ti2:type",
            "na1:type",
            "ty1:typeOfResource",
            "ty1:manuscript",
            "ty2:typeOfResource",
            "or:issuance",
            "or2:issuance",
            "su1:p1:type",
        ]);
        let groups = FieldGroups::derive(&header);
        let codes = |columns: &[Column]| columns.iter().map(|c| c.code.clone()).collect::<Vec<_>>();
        assert_eq!(codes(&groups.title_types), vec!["ti1:type", "ti2:type"]);
        assert_eq!(codes(&groups.name_types), vec!["na1:type"]);
        assert_eq!(
            codes(&groups.resource_types),
            vec!["ty1:typeOfResource", "ty2:typeOfResource"]
        );
        assert_eq!(codes(&groups.manuscript_flags), vec!["ty1:manuscript"]);
        assert_eq!(codes(&groups.issuance), vec!["or:issuance", "or2:issuance"]);
        assert!(groups.dates.is_empty());
    }

    #[test]
    fn test_date_buckets() {
        let header = header(&[
            "druid",
            "sourceId",
            "dt:dateIssued",
            "dt:dateCreated",
            "dt:dateCreatedKeyDate",
            "dt:dateCreated2",
            "or2:dt:dateCaptured",
            "or2:dt:dateCaptured3Encoding",
            "dt:dateCreatedBogus",
        ]);
        let groups = FieldGroups::derive(&header);

        let prefixes: Vec<&String> = groups.dates.keys().collect();
        assert_eq!(prefixes, vec!["dt:", "or2:dt:"]);

        let kinds: Vec<DateKind> = groups.dates["dt:"].keys().copied().collect();
        assert_eq!(kinds, vec![DateKind::Created, DateKind::Issued]);

        let created = &groups.dates["dt:"][&DateKind::Created];
        assert_eq!(created.kind(), DateKind::Created);
        assert_eq!(created.prefix(), "dt:");
        assert_eq!(created.column(DateRole::Date1), Some(3));
        assert_eq!(created.column(DateRole::KeyDate), Some(4));
        assert_eq!(created.column(DateRole::Date2), Some(5));
        assert_eq!(created.column(DateRole::Date1Point), None);
        assert_eq!(created.code(DateRole::Date1Point), "dt:dateCreatedPoint");

        let captured = &groups.dates["or2:dt:"][&DateKind::Captured];
        assert_eq!(captured.column(DateRole::Date3Encoding), Some(7));
        assert_eq!(captured.code(DateRole::Date3), "or2:dt:dateCaptured3");

        assert_eq!(groups.date_buckets().count(), 3);
    }

    #[test]
    fn test_header_blank_cells() {
        let header = header(&["druid", "sourceId", "", "ti1:title"]);
        assert_eq!(header.cells()[2], "");
        assert_eq!(header.terms().len(), 3);
        assert!(header.is_blank_at(2));
        assert!(header.is_blank_at(10));
        assert!(!header.is_blank_at(3));
        assert_eq!(header.width(), 4);
    }

    #[test]
    fn test_duplicate_values_order() {
        let values = ["b", "a", "b", "c", "a", "b"];
        assert_eq!(duplicate_values(values.iter().copied()), vec!["b", "a"]);
    }
}
