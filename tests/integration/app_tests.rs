use super::ENV_MUTEX;
use clap::Parser;
use dupdirs::cli::Cli;
use dupdirs::error::ExitCode;
use dupdirs::run_app;
use dupdirs::session::StateStore;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn workspace(dirs: &[&str]) -> TempDir {
    let temp = tempdir().unwrap();
    for dir in dirs {
        fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    temp
}

/// Run with a private config and state file under `temp`.
fn run(temp: &TempDir, args: &[OsString]) -> anyhow::Result<ExitCode> {
    let mut argv: Vec<OsString> = vec![
        "dupdirs".into(),
        "-q".into(),
        "--config".into(),
        temp.path().join("config.toml").into(),
        "--state-file".into(),
        state_path(temp).into(),
    ];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn state_path(temp: &TempDir) -> std::path::PathBuf {
    temp.path().join("state.toml")
}

fn arg(path: impl AsRef<Path>) -> OsString {
    path.as_ref().as_os_str().to_owned()
}

#[test]
fn test_scan_reports_success_when_pairs_exist() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let temp = workspace(&["r1/x", "r2/x"]);

    let code = run(
        &temp,
        &[
            "scan".into(),
            arg(temp.path().join("r1")),
            arg(temp.path().join("r2")),
            "--format".into(),
            "csv".into(),
            "--no-sizes".into(),
        ],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    let saved = StateStore::new(state_path(&temp)).load().unwrap();
    assert_eq!(saved.last_dir_list.len(), 2);
}

#[test]
fn test_scan_without_pairs_exits_with_no_duplicates() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let temp = workspace(&["r1/x", "r2/y"]);

    let code = run(
        &temp,
        &[
            "scan".into(),
            "--only".into(),
            arg(temp.path().join("r1")),
            arg(temp.path().join("r2")),
            "--format".into(),
            "json".into(),
        ],
    )
    .unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
    assert!(!state_path(&temp).exists());
}

#[test]
fn test_scan_needs_two_roots() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let temp = workspace(&["r1"]);

    let err = run(&temp, &["scan".into(), arg(temp.path().join("r1"))]).unwrap_err();
    assert!(err.to_string().contains("At least two root directories"));
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_roots_subcommands_edit_state_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let temp = workspace(&["a", "b"]);
    let store = StateStore::new(state_path(&temp));

    run(
        &temp,
        &[
            "roots".into(),
            "add".into(),
            arg(temp.path().join("a")),
            arg(temp.path().join("b")),
        ],
    )
    .unwrap();
    assert_eq!(store.load().unwrap().last_dir_list.len(), 2);

    run(
        &temp,
        &["roots".into(), "remove".into(), arg(temp.path().join("a"))],
    )
    .unwrap();
    let remaining = store.load().unwrap().last_dir_list;
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].ends_with('b'));

    let code = run(&temp, &["roots".into(), "list".into()]).unwrap();
    assert_eq!(code, ExitCode::Success);

    run(&temp, &["roots".into(), "clear".into()]).unwrap();
    assert!(store.load().unwrap().last_dir_list.is_empty());
}

#[test]
fn test_init_dir_round_trip() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let temp = workspace(&["start"]);

    run(&temp, &["init-dir".into(), arg(temp.path().join("start"))]).unwrap();
    let saved = StateStore::new(state_path(&temp)).load().unwrap();
    assert_eq!(
        saved.initial_directory().as_deref(),
        Some(temp.path().join("start").as_path())
    );

    let err = run(&temp, &["init-dir".into(), arg(temp.path().join("missing"))]).unwrap_err();
    assert!(err.to_string().contains("not a directory"));
}

#[test]
fn test_bad_config_file_is_fatal() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let temp = workspace(&[]);
    fs::write(temp.path().join("config.toml"), "compute_sizes = 12").unwrap();

    let err = run(&temp, &["roots".into(), "list".into()]).unwrap_err();
    assert!(err.to_string().contains("Failed to load config"));
}
