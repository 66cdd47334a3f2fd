//! Per-row and per-cell validation of data rows.
//!
//! Every row after the header row is checked once, in file order. Per-row
//! findings are located by the record identifier (the druid, or `row N` when
//! the druid is blank); per-cell findings by cell reference. Identifiers and
//! formula-error cells are tallied in a [`RunTally`] for the end-of-run checks.

use tracing::trace;

use crate::cell::{cell_ref, is_blank, CellValue};
use crate::dates::check_dates;
use crate::finding::{FindingLog, Locator};
use crate::grid::Grid;
use crate::schema::{Column, Schema, NAME_USAGE_CODE, PURL_CODE, RESOURCE_TYPE_CODE, TITLE_CODE};
use crate::tally::RunTally;
use crate::vocabulary::{is_sentinel, is_valid_druid, FormulaSentinel, Vocabulary};

/// Quotation marks that may open a quoted value.
const OPENING_QUOTES: [char; 3] = ['"', '\u{201C}', '\u{201D}'];
/// Quotation marks that may close a quoted value.
const CLOSING_QUOTES: [char; 2] = ['"', '\u{201D}'];

/// Report a non-blank value that is not in `vocabulary`.
///
/// Formula-error sentinels are exempt; they are reported at the end of the run.
pub fn check_term(
    cell: Option<&CellValue>,
    vocabulary: Vocabulary,
    code: &str,
    id: &str,
    log: &mut FindingLog,
) {
    let Some(cell) = cell.filter(|cell| !cell.is_blank()) else {
        return;
    };
    let value = cell.render();
    if !vocabulary.contains(&value) && !is_sentinel(cell) {
        log.error(
            Locator::record(id),
            format!("Invalid term \"{value}\" in {code}"),
        );
    }
}

/// Validates data rows against a discovered schema.
#[derive(Debug, Clone, Copy)]
pub struct RowValidator<'a> {
    schema: &'a Schema,
}

impl<'a> RowValidator<'a> {
    /// Create a row validator for a schema.
    #[must_use]
    pub fn new(schema: &'a Schema) -> Self {
        RowValidator { schema }
    }

    /// Validate every row after the header row.
    pub fn validate_rows(&self, grid: &Grid, tally: &mut RunTally, log: &mut FindingLog) {
        let first_data_row = self.schema.header.index() + 1;
        for (index, row) in grid.rows().enumerate().skip(first_data_row) {
            self.validate_row(index, row, tally, log);
        }
    }

    /// Validate one data row, given its 0-based index in the grid.
    pub fn validate_row(
        &self,
        index: usize,
        row: &[CellValue],
        tally: &mut RunTally,
        log: &mut FindingLog,
    ) {
        let row_label = format!("row {}", index + 1);
        if row.iter().all(CellValue::is_blank) {
            trace!(row = index + 1, "blank row");
            log.error(Locator::record(row_label), "Blank row");
            return;
        }

        let id = match row.first().filter(|cell| !cell.is_blank()) {
            Some(druid) => {
                let druid = druid.render();
                if !is_valid_druid(&druid) {
                    log.error(Locator::record(druid.clone()), "Invalid druid");
                }
                tally.record_druid(&druid);
                druid
            },
            None => {
                log.error(Locator::record(row_label.clone()), "Missing druid");
                row_label
            },
        };
        trace!(row = index + 1, id = %id, "validating row");

        self.check_cells(index, row, tally, log);
        self.check_title(row, &id, log);
        self.check_name(row, &id, log);
        self.check_resource_type(row, &id, log);
        check_dates(row, &self.schema.groups, &id, log);
        self.check_issuance(row, &id, log);
        self.check_subjects(row, &id, log);
        self.check_location(row, &id, log);
    }

    fn cell<'r>(&self, row: &'r [CellValue], code: &str) -> Option<&'r CellValue> {
        self.schema.position(code).and_then(|index| row.get(index))
    }

    fn check_cells(&self, index: usize, row: &[CellValue], tally: &mut RunTally, log: &mut FindingLog) {
        match row.get(1).filter(|cell| !cell.is_blank()) {
            Some(source_id) => tally.record_source_id(&source_id.render()),
            None => tally.record_blank_source_id(&cell_ref(1, index)),
        }

        let header = &self.schema.header;
        for (column, cell) in row.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            let reference = cell_ref(column, index);

            if column >= header.width() {
                log.warning(
                    Locator::cell(reference.clone()),
                    "Data present in column without header at end of row",
                );
            } else if header.is_blank_at(column) {
                log.warning(
                    Locator::cell(reference.clone()),
                    "Data present in column without header",
                );
            }

            match cell {
                CellValue::Text(text) => check_text(text, &reference, log),
                _ if cell.is_numeric() => log.info(
                    Locator::cell(reference.clone()),
                    format!("Non-text Excel formatting: {}", cell.type_name()),
                ),
                _ => log.warning(
                    Locator::cell(reference.clone()),
                    format!("Non-text Excel formatting: {}", cell.type_name()),
                ),
            }

            if let Some(sentinel) = FormulaSentinel::from_value(&cell.render()) {
                tally.record_sentinel(sentinel, &reference);
            }
        }
    }

    fn check_title(&self, row: &[CellValue], id: &str, log: &mut FindingLog) {
        if self.schema.header.contains(TITLE_CODE) && is_blank(self.cell(row, TITLE_CODE)) {
            log.error(Locator::record(id), format!("Blank {TITLE_CODE}"));
        }
        self.check_terms(row, &self.schema.groups.title_types, Vocabulary::TITLE_TYPE, id, log);
    }

    fn check_name(&self, row: &[CellValue], id: &str, log: &mut FindingLog) {
        self.check_terms(row, &self.schema.groups.name_types, Vocabulary::NAME_TYPE, id, log);
        check_term(
            self.cell(row, NAME_USAGE_CODE),
            Vocabulary::NAME_USAGE,
            NAME_USAGE_CODE,
            id,
            log,
        );
    }

    fn check_resource_type(&self, row: &[CellValue], id: &str, log: &mut FindingLog) {
        let groups = &self.schema.groups;
        if groups.resource_types.is_empty() {
            log.warning(Locator::record(id), "Recommended column missing");
        }
        for column in &groups.resource_types {
            let cell = row.get(column.index);
            if column.code == RESOURCE_TYPE_CODE && is_blank(cell) {
                log.warning(Locator::record(id), format!("Blank {RESOURCE_TYPE_CODE}"));
            }
            check_term(cell, Vocabulary::RESOURCE_TYPE, &column.code, id, log);
        }
        self.check_terms(row, &groups.manuscript_flags, Vocabulary::YES, id, log);
    }

    fn check_issuance(&self, row: &[CellValue], id: &str, log: &mut FindingLog) {
        self.check_terms(row, &self.schema.groups.issuance, Vocabulary::ISSUANCE, id, log);
    }

    fn check_subjects(&self, row: &[CellValue], id: &str, log: &mut FindingLog) {
        for pair in &self.schema.subjects {
            let value = row.get(pair.value.index);
            let kind = row.get(pair.kind.index);
            match (is_blank(value), is_blank(kind)) {
                (true, true) => {},
                (false, true) => log.error(
                    Locator::record(id),
                    format!("Missing subject type in {}", pair.kind.code),
                ),
                (true, false) => log.warning(
                    Locator::record(id),
                    format!("Subject type provided but subject is empty in {}", pair.value.code),
                ),
                (false, false) => {
                    let term = kind.map(CellValue::render).unwrap_or_default();
                    if !pair.term.vocabulary().contains(&term) {
                        log.error(
                            Locator::record(id),
                            format!(
                                "Invalid {} \"{term}\" in {}",
                                pair.term.label(),
                                pair.kind.code
                            ),
                        );
                    }
                },
            }
        }
    }

    fn check_location(&self, row: &[CellValue], id: &str, log: &mut FindingLog) {
        if self.schema.header.contains(PURL_CODE) && is_blank(self.cell(row, PURL_CODE)) {
            log.warning(Locator::record(id), format!("Blank {PURL_CODE}"));
        }
    }

    fn check_terms(
        &self,
        row: &[CellValue],
        columns: &[Column],
        vocabulary: Vocabulary,
        id: &str,
        log: &mut FindingLog,
    ) {
        for column in columns {
            check_term(row.get(column.index), vocabulary, &column.code, id, log);
        }
    }
}

fn check_text(text: &str, reference: &str, log: &mut FindingLog) {
    if text.contains(|c| c == '\r' || c == '\n') {
        log.error(Locator::cell(reference), "Line break in cell text");
    } else if text.chars().any(|c| c < ' ') {
        log.error(Locator::cell(reference), "Control character in cell text");
    }

    if begins_with_unclosed_quote(text) {
        log.warning(
            Locator::cell(reference),
            "Cell value begins with unclosed double quotation mark",
        );
    }
}

/// Whether a value opens with a double quotation mark that is never closed.
fn begins_with_unclosed_quote(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if OPENING_QUOTES.contains(&first) => {
            !chars.any(|c| CLOSING_QUOTES.contains(&c))
        },
        _ => false,
    }
}
