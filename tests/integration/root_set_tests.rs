use dupdirs::roots::{ChangeKind, RootDirectorySet, RootSetChange};
use dupdirs::scanner::SizeFormat;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

fn dirs(names: &[&str]) -> TempDir {
    let temp = tempdir().unwrap();
    for name in names {
        fs::create_dir_all(temp.path().join(name)).unwrap();
    }
    temp
}

fn record(set: &RootDirectorySet) -> Arc<Mutex<Vec<RootSetChange>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    set.subscribe(move |change| sink.lock().unwrap().push(change.clone()));
    log
}

#[test]
fn test_equal_paths_are_added_once() {
    let temp = dirs(&["a"]);
    let a = temp.path().join("a");
    let mut set = RootDirectorySet::new();

    assert!(set.add(&a));
    assert!(!set.add(a.join(".")));
    assert!(!set.add(a.join("sub").join("..")));
    assert_eq!(set.len(), 1);
    assert!(set.contains(&a));
}

#[test]
fn test_missing_directories_are_rejected_silently() {
    let temp = dirs(&[]);
    let mut set = RootDirectorySet::new();
    let log = record(&set);

    assert!(!set.add(temp.path().join("missing")));
    assert!(set.is_empty());
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_changes_are_committed_before_notification() {
    let temp = dirs(&["a", "b"]);
    let mut set = RootDirectorySet::new();
    let log = record(&set);

    set.add(temp.path().join("a"));
    set.add(temp.path().join("b"));
    set.remove(temp.path().join("a"));
    set.clear();
    assert!(!set.clear());

    let log = log.lock().unwrap();
    let lens: Vec<usize> = log.iter().map(|c| c.len).collect();
    assert_eq!(lens, vec![1, 2, 1, 0]);
    assert!(matches!(log[0].kind, ChangeKind::Added(_)));
    assert!(matches!(log[2].kind, ChangeKind::Removed(ref d) if d.path() == temp.path().join("a")));
    assert!(matches!(log[3].kind, ChangeKind::Cleared));
}

#[test]
fn test_order_is_insertion_order() {
    let temp = dirs(&["c", "a", "b"]);
    let mut set = RootDirectorySet::new();
    let added = set.add_all(["c", "a", "b", "a"].map(|n| temp.path().join(n)));
    assert_eq!(added, 3);

    let names: Vec<String> = set.iter().map(|e| e.dir().name().into_owned()).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
    assert!(set.contains_all(["a", "b"].map(|n| temp.path().join(n))));
}

#[test]
fn test_dedupe_always_notifies() {
    let temp = dirs(&["a"]);
    let mut set = RootDirectorySet::new();
    set.add(temp.path().join("a"));
    let log = record(&set);

    assert!(!set.dedupe());
    assert!(!set.dedupe());

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert!(log
        .iter()
        .all(|c| matches!(c.kind, ChangeKind::Deduplicated { collapsed: 0 })));
}

#[test]
fn test_remove_exact_survives_readd() {
    let temp = dirs(&["a"]);
    let a = temp.path().join("a");
    let mut set = RootDirectorySet::new();
    set.add(&a);
    let stale = set.get(0).unwrap().clone();

    set.remove(&a);
    set.add(&a);
    assert_ne!(set.get(0).unwrap().id(), stale.id());

    assert!(set.remove_exact(&stale));
    assert!(set.is_empty());
}

#[test]
fn test_persisted_round_trip_drops_missing() {
    let temp = dirs(&["a", "b"]);
    let mut set = RootDirectorySet::new();
    set.add_all(["a", "b"].map(|n| temp.path().join(n)));

    let mut saved = set.to_persisted(None);
    assert_eq!(saved.len(), 2);
    assert_eq!(set.to_persisted(Some(1)), saved[..1].to_vec());

    saved.push(String::new());
    saved.push(temp.path().join("gone").to_string_lossy().into_owned());

    let mut restored = RootDirectorySet::new();
    assert_eq!(restored.extend_from_persisted(&saved), 2);
    assert_eq!(restored.to_persisted(None), set.to_persisted(None));
}

#[test]
fn test_size_tracking_measures_roots() {
    let temp = dirs(&["a"]);
    fs::write(temp.path().join("a").join("f"), vec![1u8; 42]).unwrap();

    let mut set = RootDirectorySet::with_size_tracking(SizeFormat::Bytes);
    set.add(temp.path().join("a"));

    let size = set.get(0).unwrap().size().unwrap();
    let state = size.wait_timeout(Duration::from_secs(10));
    assert_eq!(state.bytes(), Some(42));
    assert_eq!(state.display().trim(), "42 B");
}

#[test]
fn test_untracked_roots_have_no_size() {
    let temp = dirs(&["a"]);
    let mut set = RootDirectorySet::new();
    set.add(temp.path().join("a"));
    assert!(set.get(0).unwrap().size().is_none());
}

#[cfg(all(unix, not(target_os = "macos")))]
#[test]
fn test_normal_form_spellings_are_distinct_roots() {
    let composed = "caf\u{00E9}";
    let decomposed = "cafe\u{0301}";
    let temp = dirs(&[composed, decomposed]);
    // Normalizing filesystems fold both spellings into one entry
    if fs::read_dir(temp.path()).unwrap().count() != 2 {
        return;
    }

    let mut set = RootDirectorySet::new();
    assert!(set.add(temp.path().join(composed)));
    assert!(set.add(temp.path().join(decomposed)));
    assert_eq!(set.len(), 2);
    assert!(!set.dedupe());
}
