//! Integration tests for exit codes, root validation, and error continuation.

use clap::Parser;
use crossdupe::cli::Cli;
use crossdupe::duplicates::{check_root, DuplicateFinder, FinderError};
use crossdupe::error::{ExitCode, StructuredError};
use crossdupe::scanner::{EntryError, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn create(dir: &Path, name: &str, content: &[u8]) {
    File::create(dir.join(name))
        .unwrap()
        .write_all(content)
        .unwrap();
}

fn cli_for(master: &Path, slave: &Path) -> Cli {
    Cli::try_parse_from([
        "crossdupe",
        "--output",
        "json",
        master.to_str().unwrap(),
        slave.to_str().unwrap(),
    ])
    .unwrap()
}

#[test]
fn test_exit_code_no_duplicates() {
    let master = tempdir().unwrap();
    let slave = tempdir().unwrap();
    create(master.path(), "unique.txt", b"unique");
    create(slave.path(), "other.txt", b"differs");

    let result = crossdupe::run_app(cli_for(master.path(), slave.path())).unwrap();
    assert_eq!(result, ExitCode::NoDuplicates);
}

#[test]
fn test_exit_code_success_with_duplicates() {
    let master = tempdir().unwrap();
    let slave = tempdir().unwrap();
    create(master.path(), "a.txt", b"dup");
    create(slave.path(), "b.txt", b"dup");

    let result = crossdupe::run_app(cli_for(master.path(), slave.path())).unwrap();
    assert_eq!(result, ExitCode::Success);
}

#[test]
fn test_exit_code_text_output() {
    let master = tempdir().unwrap();
    let slave = tempdir().unwrap();
    create(master.path(), "a.txt", b"dup");
    create(slave.path(), "b.txt", b"dup");

    let cli = Cli::try_parse_from([
        "crossdupe",
        "--no-progress",
        master.path().to_str().unwrap(),
        slave.path().to_str().unwrap(),
    ])
    .unwrap();
    assert_eq!(crossdupe::run_app(cli).unwrap(), ExitCode::Success);
}

#[cfg(unix)]
#[test]
fn test_exit_code_partial_success_on_permission_denied() {
    use std::os::unix::fs::PermissionsExt;
    let master = tempdir().unwrap();
    let slave = tempdir().unwrap();

    create(master.path(), "a.txt", b"dup");
    create(slave.path(), "b.txt", b"dup");

    let sub = slave.path().join("no_access");
    fs::create_dir(&sub).unwrap();
    create(&sub, "hidden.txt", b"hidden content");
    let mut perms = fs::metadata(&sub).unwrap().permissions();
    perms.set_mode(0o000);
    fs::set_permissions(&sub, perms).unwrap();
    // Running as root can read the directory anyway.
    let readable_anyway = fs::read_dir(&sub).is_ok();

    let result = crossdupe::run_app(cli_for(master.path(), slave.path())).unwrap();

    let mut perms = fs::metadata(&sub).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&sub, perms).unwrap();

    let expected = if readable_anyway {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    };
    assert_eq!(result, expected);
}

#[test]
fn test_exit_code_general_error_on_invalid_path() {
    let slave = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "crossdupe",
        "/non/existent/path/that/really/should/not/exist",
        slave.path().to_str().unwrap(),
    ])
    .unwrap();

    let err = crossdupe::run_app(cli).unwrap_err();
    assert!(err.to_string().contains("master"));
    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::PathNotFound(_))
    ));
}

#[test]
fn test_file_as_root_is_rejected() {
    let dir = tempdir().unwrap();
    create(dir.path(), "plain.txt", b"x");

    let result = check_root(&dir.path().join("plain.txt"));
    assert!(matches!(result, Err(FinderError::NotADirectory(_))));

    let cli = cli_for(dir.path(), &dir.path().join("plain.txt"));
    let err = crossdupe::run_app(cli).unwrap_err();
    assert!(format!("{err:#}").contains("Not a directory"));
}

#[test]
fn test_structured_error_for_invalid_root() {
    let slave = tempdir().unwrap();
    let cli = cli_for(&slave.path().join("missing"), slave.path());
    let err = crossdupe::run_app(cli).unwrap_err();

    let structured = StructuredError::new(&err, ExitCode::GeneralError);
    let json = serde_json::to_string(&structured).unwrap();
    assert!(json.contains("\"code\":\"CD001\""));
    assert!(json.contains("Path not found"));
}

#[test]
fn test_missing_roots_are_recoverable_in_library() {
    let dir = tempdir().unwrap();
    let (matches, summary) = DuplicateFinder::with_defaults().find_duplicates(
        WalkerConfig::new(dir.path().join("no_master")),
        WalkerConfig::new(dir.path().join("no_slave")),
    );

    assert!(matches.is_empty());
    assert_eq!(summary.scan_errors.len(), 2);
    assert_eq!(summary.total_files(), 0);
    assert_eq!(ExitCode::from_summary(&summary), ExitCode::PartialSuccess);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_unverifiable() {
    use std::os::unix::fs::PermissionsExt;
    let master = tempdir().unwrap();
    let slave = tempdir().unwrap();
    create(master.path(), "a.txt", b"same");
    create(slave.path(), "b.txt", b"same");

    let locked = slave.path().join("b.txt");
    let mut perms = fs::metadata(&locked).unwrap().permissions();
    perms.set_mode(0o000);
    fs::set_permissions(&locked, perms).unwrap();
    // Root ignores file modes; nothing to observe then.
    let readable_anyway = File::open(&locked).is_ok();

    let (matches, summary) = DuplicateFinder::with_defaults().find_duplicates(
        WalkerConfig::new(master.path()),
        WalkerConfig::new(slave.path()),
    );

    let mut perms = fs::metadata(&locked).unwrap().permissions();
    perms.set_mode(0o644);
    fs::set_permissions(&locked, perms).unwrap();

    assert_eq!(summary.candidate_matches, 1);
    if readable_anyway {
        assert_eq!(matches.len(), 1);
    } else {
        assert!(matches.is_empty());
        assert_eq!(summary.unverifiable.len(), 1);
        assert!(matches!(
            summary.unverifiable[0].error,
            EntryError::ContentUnreadable { .. }
        ));
        assert_eq!(summary.unverifiable[0].error.path(), locked.as_path());
    }
}
