//! Coverage logs survive export and import.

use std::path::PathBuf;

use haggle_debug::coverage::export;
use haggle_debug::{CoverageConfig, CoverageLog};
use haggle_runtime::{RuntimeConfig, Session};

fn played_session() -> Session {
    let mut session = Session::new(&RuntimeConfig::default()).unwrap();
    for line in [
        "buy 2 health potions from the Tipsy Pixie",
        "sell potion",
        "the mana one",
        "what's the weather like",
        "what's the weather like",
        "buy a dragon egg",
    ] {
        session.submit(line);
    }
    session
}

fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("haggle-{}-{name}", std::process::id()))
}

#[test]
fn session_report_counts_each_outcome() {
    let session = played_session();
    let report = session.coverage().report();

    assert_eq!(report.accepted, 2);
    assert_eq!(report.accepted_after_clarification, 1);
    assert_eq!(report.clarifications, 1);
    assert_eq!(report.rejected, 3);
    assert_eq!(report.unmatched, vec![("what's the weather like".to_string(), 2)]);
    assert_eq!(report.rejection_reasons.get("unresolved-slot"), Some(&1));
    assert_eq!(report.by_rule.get("sell-item/bare").map(|r| r.accepted), Some(1));
}

#[test]
fn exported_log_reports_the_same() {
    let session = played_session();
    let bytes = session.coverage().export().unwrap();

    let imported = CoverageLog::new(CoverageConfig::default());
    assert_eq!(imported.import(&bytes).unwrap(), session.coverage().len());
    assert_eq!(imported.report(), session.coverage().report());
}

#[test]
fn exports_round_trip_through_a_file() {
    let session = played_session();
    let path = scratch_file("coverage.msgpack");

    session.coverage().export_to_file(&path).unwrap();
    let records = export::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(records.len(), session.coverage().len());
    assert_eq!(records, session.coverage().records());
}

#[test]
fn foreign_bytes_are_refused() {
    let log = CoverageLog::new(CoverageConfig::default());
    let err = log.import(b"not a coverage export").unwrap_err();
    assert!(!err.is_configuration());
    assert!(log.is_empty());
}
