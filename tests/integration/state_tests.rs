use dupdirs::session::{PersistedState, StateError, StateStore};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_file_is_default_state() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.toml"));
    assert_eq!(store.load().unwrap(), PersistedState::default());
}

#[test]
fn test_save_creates_parent_and_round_trips() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path().join("nested").join("deeper").join("state.toml"));
    let state = PersistedState::new(
        Some(dir.path()),
        vec!["/mnt/a".to_string(), "/mnt/b".to_string()],
    );

    store.save(&state).unwrap();
    assert!(store.path().exists());
    assert_eq!(store.load().unwrap(), state);

    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("last_dir_list"));
    assert!(raw.contains("default_dir"));
}

#[test]
fn test_malformed_file_is_reported_then_reset() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.toml"));
    fs::write(store.path(), "last_dir_list = [unterminated").unwrap();

    assert!(matches!(store.load(), Err(StateError::Malformed { .. })));
    assert_eq!(store.load_or_reset(), PersistedState::default());
    assert!(!store.path().exists());
}

#[test]
fn test_wrong_value_type_is_malformed() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.toml"));
    fs::write(store.path(), "last_dir_list = 3").unwrap();
    assert!(matches!(store.load(), Err(StateError::Malformed { .. })));
}

#[test]
fn test_reset_reports_whether_a_file_existed() {
    let dir = tempdir().unwrap();
    let store = StateStore::new(dir.path().join("state.toml"));
    assert!(!store.reset().unwrap());

    store.save(&PersistedState::default()).unwrap();
    assert!(store.reset().unwrap());
    assert!(!store.path().exists());
}

#[test]
fn test_initial_directory_must_still_exist() {
    let dir = tempdir().unwrap();
    let kept = PersistedState::new(Some(dir.path()), Vec::new());
    assert_eq!(kept.initial_directory().as_deref(), Some(dir.path()));

    let gone = PersistedState::new(Some(&dir.path().join("gone")), Vec::new());
    assert_eq!(gone.initial_directory(), None);
}
