//! Cross-field validation of originInfo dates.
//!
//! Each [`DateBucket`] holds up to three logical dates of one kind plus their
//! attribute columns. For every data row the bucket is checked for invalid
//! attribute terms, incomplete ranges, attributes without a date, and dates
//! that contradict a stated `w3cdtf` encoding. Key-date flags are collected
//! across all buckets so that the row can be checked for exactly one key date.

use crate::cell::{is_blank, CellValue};
use crate::finding::{FindingLog, Locator};
use crate::header::DateRole;
use crate::rows::check_term;
use crate::schema::{DateBucket, FieldGroups};
use crate::vocabulary::{is_w3cdtf, Vocabulary};

/// The only key-date flag value that declares a key date.
const KEY_DATE_YES: &str = "yes";

/// The encoding whose syntax is checked.
const W3CDTF: &str = "w3cdtf";

/// Attribute columns checked against a vocabulary, in reporting order.
const ATTRIBUTE_TERMS: [(DateRole, Vocabulary); 9] = [
    (DateRole::KeyDate, Vocabulary::YES),
    (DateRole::Date3KeyDate, Vocabulary::YES),
    (DateRole::Date1Qualifier, Vocabulary::DATE_QUALIFIER),
    (DateRole::Date2Qualifier, Vocabulary::DATE_QUALIFIER),
    (DateRole::Date3Qualifier, Vocabulary::DATE_QUALIFIER),
    (DateRole::Date1Point, Vocabulary::DATE_POINT),
    (DateRole::Date2Point, Vocabulary::DATE_POINT),
    (DateRole::Encoding, Vocabulary::DATE_ENCODING),
    (DateRole::Date3Encoding, Vocabulary::DATE_ENCODING),
];

/// One bucket's cells in one row.
struct BucketRow<'a> {
    bucket: &'a DateBucket,
    row: &'a [CellValue],
}

impl<'a> BucketRow<'a> {
    fn cell(&self, role: DateRole) -> Option<&'a CellValue> {
        self.bucket
            .column(role)
            .and_then(|index| self.row.get(index))
    }

    fn is_blank(&self, role: DateRole) -> bool {
        is_blank(self.cell(role))
    }

    fn rendered(&self, role: DateRole) -> Option<String> {
        self.cell(role)
            .filter(|cell| !cell.is_blank())
            .map(CellValue::render)
    }

    fn code(&self, role: DateRole) -> String {
        self.bucket.code(role)
    }
}

/// Validate every date bucket for one row, then the row's key-date count.
pub fn check_dates(row: &[CellValue], groups: &FieldGroups, id: &str, log: &mut FindingLog) {
    let mut key_dates = Vec::new();

    for bucket in groups.date_buckets() {
        let dates = BucketRow { bucket, row };
        check_attribute_terms(&dates, id, log);
        check_range_points(&dates, id, log);
        check_unnecessary_attributes(&dates, id, log);
        check_w3cdtf(&dates, id, log);

        if !dates.is_blank(DateRole::Date1) || !dates.is_blank(DateRole::Date2) {
            key_dates.push(dates.rendered(DateRole::KeyDate));
        }
        if !dates.is_blank(DateRole::Date3) {
            key_dates.push(dates.rendered(DateRole::Date3KeyDate));
        }
    }

    let declared = key_dates
        .iter()
        .flatten()
        .filter(|flag| flag.as_str() == KEY_DATE_YES)
        .count();
    if declared > 1 {
        log.error(Locator::record(id), "Multiple key dates declared");
    } else if declared == 0 {
        log.warning(Locator::record(id), "No key date declared");
    }
}

fn check_attribute_terms(dates: &BucketRow<'_>, id: &str, log: &mut FindingLog) {
    for (role, vocabulary) in ATTRIBUTE_TERMS {
        check_term(dates.cell(role), vocabulary, &dates.code(role), id, log);
    }
}

fn check_range_points(dates: &BucketRow<'_>, id: &str, log: &mut FindingLog) {
    if dates.is_blank(DateRole::Date1) || dates.is_blank(DateRole::Date2) {
        return;
    }
    for point in [DateRole::Date1Point, DateRole::Date2Point] {
        if dates.is_blank(point) {
            log.warning(
                Locator::record(id),
                format!("Possible date range missing {}", dates.code(point)),
            );
        }
    }
}

fn check_unnecessary_attributes(dates: &BucketRow<'_>, id: &str, log: &mut FindingLog) {
    let mut unnecessary = Vec::new();

    if dates.is_blank(DateRole::Date1) {
        unnecessary.push((DateRole::KeyDate, DateRole::Date1));
        // The encoding also governs the second date
        if dates.is_blank(DateRole::Date2) {
            unnecessary.push((DateRole::Encoding, DateRole::Date1));
        }
        unnecessary.push((DateRole::Date1Qualifier, DateRole::Date1));
        unnecessary.push((DateRole::Date1Point, DateRole::Date1));
    }
    if dates.is_blank(DateRole::Date2) {
        unnecessary.push((DateRole::Date2Qualifier, DateRole::Date2));
        unnecessary.push((DateRole::Date2Point, DateRole::Date2));
    }
    if dates.is_blank(DateRole::Date3) {
        unnecessary.push((DateRole::Date3KeyDate, DateRole::Date3));
        unnecessary.push((DateRole::Date3Encoding, DateRole::Date3));
        unnecessary.push((DateRole::Date3Qualifier, DateRole::Date3));
    }

    for (attribute, date) in unnecessary {
        if !dates.is_blank(attribute) {
            log.warning(
                Locator::record(id),
                format!(
                    "Unnecessary {} value for blank {}",
                    dates.code(attribute),
                    dates.code(date)
                ),
            );
        }
    }
}

fn check_w3cdtf(dates: &BucketRow<'_>, id: &str, log: &mut FindingLog) {
    let checks = [
        (DateRole::Date1, DateRole::Encoding),
        (DateRole::Date2, DateRole::Encoding),
        (DateRole::Date3, DateRole::Date3Encoding),
    ];
    for (date, encoding) in checks {
        let Some(value) = dates.rendered(date) else {
            continue;
        };
        if dates.rendered(encoding).as_deref() == Some(W3CDTF) && !is_w3cdtf(&value) {
            log.error(
                Locator::record(id),
                format!(
                    "Date {value} in {} does not match stated {W3CDTF} encoding",
                    dates.code(date)
                ),
            );
        }
    }
}
