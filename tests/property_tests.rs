//! Property tests for extension handling and controlled term lists.

mod common;

use std::path::PathBuf;

use common::validator;
use proptest::prelude::*;
use rpsv::grid::Grid;
use rpsv::vocabulary::Vocabulary;
use rpsv::Severity;

fn arb_title_term() -> impl Strategy<Value = &'static str> {
    prop::sample::select(Vocabulary::TITLE_TYPE.terms())
}

fn title_type_grid(value: &str) -> Grid {
    Grid::from_text_rows(&[
        vec!["druid", "sourceId", "ti1:title", "ti1:type", "ty1:typeOfResource"],
        vec!["bc123df4567", "s1", "A title", value, "text"],
    ])
}

fn invalid_term_count(grid: &Grid) -> usize {
    validator()
        .validate_grid(grid)
        .findings()
        .iter()
        .filter(|f| f.message.starts_with("Invalid term"))
        .count()
}

proptest! {
    #[test]
    fn unsupported_extension_yields_exactly_one_fatal(ext in "[a-z0-9]{1,6}") {
        prop_assume!(!matches!(ext.as_str(), "csv" | "xls" | "xlsx"));
        let path = PathBuf::from(format!("records.{ext}"));
        let outcome = validator().validate_file(&path);
        prop_assert!(outcome.is_aborted());
        prop_assert_eq!(outcome.findings().len(), 1);
        prop_assert_eq!(outcome.findings()[0].severity, Severity::Fatal);
        prop_assert_eq!(outcome.findings()[0].locator.as_str(), "filename");
    }

    #[test]
    fn canonical_title_types_are_accepted(term in arb_title_term()) {
        prop_assert_eq!(invalid_term_count(&title_type_grid(term)), 0);
    }

    #[test]
    fn other_title_types_are_rejected(value in "[A-Za-z][A-Za-z ]{0,15}") {
        prop_assume!(!Vocabulary::TITLE_TYPE.contains(&value));
        let grid = title_type_grid(&value);
        let findings = validator().validate_grid(&grid);
        let invalid: Vec<_> = findings
            .findings()
            .iter()
            .filter(|f| f.message.starts_with("Invalid term"))
            .collect();
        prop_assert_eq!(invalid.len(), 1);
        prop_assert_eq!(invalid[0].severity, Severity::Error);
        let expected = format!("Invalid term \"{value}\" in ti1:type");
        prop_assert_eq!(&invalid[0].message, &expected);
    }
}
