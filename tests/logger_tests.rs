//! Integration tests for logger behavior.

use nu_planner::logger::{level, set_level, set_level_from_str, Level};
use nu_planner::{debug, error, info, warn};

#[test]
fn level_parse_accepts_valid() {
    assert!(set_level_from_str("error"));
    assert!(set_level_from_str("WARN"));
    assert!(set_level_from_str("info"));
    assert!(set_level_from_str("debug"));
    assert_eq!(level(), Level::Debug);
}

#[test]
fn level_parse_rejects_invalid() {
    assert!(!set_level_from_str("invalid"));
    assert!(!set_level_from_str(""));
}

#[test]
fn logs_do_not_panic() {
    set_level(Level::Debug);
    info!("info integration");
    warn!("warn integration");
    error!("error integration");
    debug!("debug integration");
}

#[cfg(feature = "file-logging")]
#[test]
fn file_logging_creates_parent_dirs_and_writes() {
    use std::fs;
    use tempfile::TempDir;

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("logs").join("nuplanner.log");

    assert!(nu_planner::logger::init_file_logging(&path));
    error!("written to file");

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[ERROR] written to file"));
}
