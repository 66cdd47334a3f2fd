//! End-to-end validation of spreadsheet files.

mod common;

use std::path::Path;

use common::{fixture, has_finding, triples, validate_csv, validator, write_temp};
use chrono::NaiveDate;
use rpsv::grid::Grid;
use rpsv::header::DateKind;
use rpsv::{CellValue, FindingLog, Severity, SourceFormat};

fn finding(severity: Severity, message: &str, locator: &str) -> (Severity, String, String) {
    (severity, message.to_string(), locator.to_string())
}

#[test]
fn test_clean_file_reports_only_blank_source_ids() {
    let outcome = validator().validate_file(&fixture("clean_records.csv"));
    assert!(!outcome.is_aborted());
    assert!(!outcome.has_errors());
    assert_eq!(
        triples(outcome.findings()),
        vec![finding(Severity::Info, "Blank source ID", "")]
    );
}

#[test]
fn test_scenarios_file() {
    let outcome = validator().validate_file(&fixture("scenarios.csv"));
    assert!(outcome.has_errors());
    assert_eq!(
        triples(outcome.findings()),
        vec![
            finding(Severity::Error, "Blank ti1:title", "aa111aa1111"),
            finding(
                Severity::Error,
                "Invalid term \"no\" in dt:dateCreatedKeyDate",
                "aa111aa1111"
            ),
            finding(Severity::Error, "Duplicate druids", "aa111aa1111"),
            finding(Severity::Error, "#REF! error in cell", "D3"),
            finding(
                Severity::Warning,
                "Unnecessary dt:dateCreatedKeyDate value for blank dt:dateCreated",
                "aa111aa1111"
            ),
            finding(Severity::Warning, "No key date declared", "aa111aa1111"),
            finding(Severity::Info, "Blank source ID", ""),
        ]
    );
}

#[test]
fn test_blank_title_is_reported_at_druid() {
    let outcome = validate_csv(
        "druid,sourceId,ti1:title,ty1:typeOfResource\n\
         bc123df4567,s1,,text\n",
    );
    let blank: Vec<_> = outcome
        .findings()
        .iter()
        .filter(|f| f.message == "Blank ti1:title")
        .collect();
    assert_eq!(blank.len(), 1);
    assert_eq!(blank[0].severity, Severity::Error);
    assert_eq!(blank[0].locator.as_str(), "bc123df4567");
}

#[test]
fn test_duplicate_druids_reported_once() {
    let outcome = validate_csv(
        "druid,sourceId,ti1:title,ty1:typeOfResource\n\
         aa111aa1111,s1,One,text\n\
         bc123df4567,s2,Two,text\n\
         aa111aa1111,s3,Three,text\n",
    );
    let duplicates: Vec<_> = outcome
        .findings()
        .iter()
        .filter(|f| f.message == "Duplicate druids")
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].locator.as_str().contains("aa111aa1111"));
    assert!(!duplicates[0].locator.as_str().contains("bc123df4567"));
}

#[test]
fn test_duplicate_source_ids_ignore_blanks() {
    let outcome = validate_csv(
        "druid,sourceId,ti1:title,ty1:typeOfResource\n\
         aa111aa1111,,One,text\n\
         bc123df4567,,Two,text\n\
         cd234fg5678,dup,Three,text\n\
         df345gh6789,dup,Four,text\n",
    );
    let found = triples(outcome.findings());
    assert!(found.contains(&finding(Severity::Info, "Duplicate source IDs", "dup")));
    assert!(found.contains(&finding(Severity::Info, "Blank source ID", "B2, B3")));
}

#[test]
fn test_formula_sentinels_grouped_by_kind() {
    let outcome = validate_csv(
        "druid,sourceId,ti1:title,ti1:subTitle,ab:abstract\n\
         aa111aa1111,s1,#N/A,0,#NAME?\n\
         bc123df4567,s2,Title,#N/A,#VALUE!\n",
    );
    let found = triples(outcome.findings());
    assert!(found.contains(&finding(Severity::Error, "#N/A error in cell", "C2, D3")));
    assert!(found.contains(&finding(Severity::Error, "#NAME? error in cell", "E2")));
    assert!(found.contains(&finding(Severity::Error, "#VALUE! error in cell", "E3")));
    assert!(found.contains(&finding(Severity::Warning, "Cell value is 0", "D2")));
}

#[test]
fn test_no_key_date_reported_once_per_record() {
    let outcome = validate_csv(
        "druid,sourceId,ti1:title,dt:dateIssued,dt:dateIssuedKeyDate,or2:dt:dateCaptured\n\
         aa111aa1111,s1,Title,1900,,2001\n",
    );
    let no_key: Vec<_> = outcome
        .findings()
        .iter()
        .filter(|f| f.message == "No key date declared")
        .collect();
    assert_eq!(no_key.len(), 1);
    assert_eq!(no_key[0].severity, Severity::Warning);
    assert_eq!(no_key[0].locator.as_str(), "aa111aa1111");
}

#[test]
fn test_blank_row_only_reports_blank_row() {
    let outcome = validator().validate_file(&fixture("preamble.csv"));
    assert!(!outcome.is_aborted());
    let at_blank_row: Vec<_> = outcome
        .findings()
        .iter()
        .filter(|f| f.locator.as_str() == "row 6")
        .collect();
    assert_eq!(at_blank_row.len(), 1);
    assert_eq!(at_blank_row[0].severity, Severity::Error);
    assert_eq!(at_blank_row[0].message, "Blank row");
    assert!(!has_finding(&outcome, Severity::Error, "Missing druid"));
}

#[test]
fn test_header_found_after_preamble() {
    let grid = Grid::open(&fixture("preamble.csv")).expect("readable fixture");
    let mut log = FindingLog::new();
    let schema = validator().discover(&grid, &mut log).expect("header found");
    assert_eq!(schema.header.index(), 3);
    assert_eq!(schema.position("ti1:title"), Some(2));
    assert!(log.is_empty());
}

#[test]
fn test_header_groups_from_file() {
    let (_dir, path) = write_temp(
        "groups.csv",
        b"druid,sourceId,ti1:title,ti2:type,na1:type,ty1:typeOfResource,ty1:manuscript,\
          dt:dateCreated,dt:dateCreatedKeyDate,or2:dt:dateIssued,or:issuance,su1:p1:value,su1:p1:type\n",
    );
    let grid = Grid::open(&path).expect("readable file");
    let mut log = FindingLog::new();
    let schema = validator().discover(&grid, &mut log).expect("header found");

    let groups = &schema.groups;
    assert_eq!(groups.title_types.len(), 1);
    assert_eq!(groups.name_types.len(), 1);
    assert_eq!(groups.resource_types.len(), 1);
    assert_eq!(groups.manuscript_flags.len(), 1);
    assert_eq!(groups.issuance.len(), 1);
    assert_eq!(groups.dates.len(), 2);
    assert!(groups.dates["dt:"].contains_key(&DateKind::Created));
    assert!(groups.dates["or2:dt:"].contains_key(&DateKind::Issued));
    assert_eq!(schema.subjects.len(), 1);
    assert!(log.is_empty());
}

#[test]
fn test_missing_header_is_single_fatal() {
    let outcome = validate_csv("id,title\naa111aa1111,Title\n");
    assert!(outcome.is_aborted());
    assert_eq!(outcome.findings().len(), 1);
    assert_eq!(outcome.findings()[0].severity, Severity::Fatal);
    assert_eq!(outcome.findings()[0].locator.as_str(), "headers");
}

#[test]
fn test_header_beyond_scan_limit_is_fatal() {
    let mut content = "preamble\n".repeat(10);
    content.push_str("druid,sourceId,ti1:title\naa111aa1111,s1,Title\n");
    let outcome = validate_csv(&content);
    assert!(outcome.is_aborted());
    assert_eq!(outcome.findings()[0].locator.as_str(), "headers");
}

#[test]
fn test_unsupported_extension_is_single_fatal() {
    let outcome = validator().validate_file(Path::new("records.xxx"));
    assert_eq!(
        triples(outcome.findings()),
        vec![finding(
            Severity::Fatal,
            "Invalid input file extension .xxx: use .csv, .xls, or .xlsx",
            "filename"
        )]
    );
}

#[test]
fn test_latin1_csv_is_fatal() {
    let (_dir, path) = write_temp(
        "latin1.csv",
        b"druid,sourceId,ti1:title\naa111aa1111,s1,Caf\xE9\n",
    );
    let outcome = validator().validate_file(&path);
    assert_eq!(
        triples(outcome.findings()),
        vec![finding(
            Severity::Fatal,
            "Invalid encoding: File charset=iso-8859-1 instead of UTF-8 or ASCII",
            "file"
        )]
    );
}

#[test]
fn test_utf8_bom_is_accepted() {
    let outcome = validate_csv(
        "\u{FEFF}druid,sourceId,ti1:title,ty1:typeOfResource\nbc123df4567,s1,Caf\u{E9},text\n",
    );
    assert!(!outcome.is_aborted());
    assert!(!outcome.has_errors());
}

#[test]
fn test_workbook_keeps_sheet_positions_and_cell_types() {
    let grid = Grid::open(&fixture("typed_cells.xlsx")).expect("readable workbook");
    assert_eq!(grid.format(), SourceFormat::Xlsx);
    assert_eq!(grid.len(), 3);
    assert_eq!(grid.row(1).map(<[CellValue]>::len), Some(0));
    assert_eq!(grid.row(2).map(|row| row[0].render()), Some("druid".to_string()));

    let data = grid.row(3).expect("data row");
    assert_eq!(data[1], CellValue::Integer(12));
    assert_eq!(
        data[4],
        CellValue::Date(NaiveDate::from_ymd_opt(1902, 2, 2).expect("valid date"))
    );
    assert_eq!(data[6], CellValue::Integer(0));
    assert_eq!(data[7], CellValue::Float(2.5));
    assert_eq!(data[8], CellValue::Boolean(true));
}

#[test]
fn test_workbook_typed_cells_are_reported() {
    let outcome = validator().validate_file(&fixture("typed_cells.xlsx"));
    assert!(!outcome.is_aborted());
    assert!(!outcome.has_errors());
    assert_eq!(
        triples(outcome.findings()),
        vec![
            finding(Severity::Warning, "Non-text Excel formatting: Date", "E3"),
            finding(Severity::Warning, "Non-text Excel formatting: Boolean", "I3"),
            finding(Severity::Warning, "Cell value is 0", "G3"),
            finding(Severity::Info, "Non-text Excel formatting: Integer", "B3"),
            finding(Severity::Info, "Non-text Excel formatting: Integer", "G3"),
            finding(Severity::Info, "Non-text Excel formatting: Float", "H3"),
            finding(Severity::Info, "Blank source ID", ""),
        ]
    );
}

#[test]
fn test_corrupt_workbook_is_fatal() {
    let (_dir, path) = write_temp("records.xlsx", b"this is not a zip archive");
    let outcome = validator().validate_file(&path);
    assert_eq!(
        triples(outcome.findings()),
        vec![finding(
            Severity::Fatal,
            "Could not open file, check for bad character encoding",
            "file"
        )]
    );
}

#[test]
fn test_validation_is_idempotent() {
    let validator = validator();
    let path = fixture("scenarios.csv");
    let first = validator.validate_file(&path);
    let second = validator.validate_file(&path);
    assert_eq!(first, second);
}

#[test]
fn test_runs_share_no_state_across_threads() {
    let validator = validator();
    let expected = validator.validate_file(&fixture("scenarios.csv"));
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| validator.validate_file(&fixture("scenarios.csv"))))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("thread completes"), expected);
        }
    });
}
