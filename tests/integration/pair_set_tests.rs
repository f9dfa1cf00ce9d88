use dupdirs::duplicates::{DuplicateDetector, DuplicatePair, DuplicatePairSet, PairSetChange};
use dupdirs::roots::RootDirectorySet;
use dupdirs::scanner::{DirectoryRef, SizeFormat};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

fn pair(first: impl AsRef<Path>, second: impl AsRef<Path>) -> DuplicatePair {
    DuplicatePair::new(DirectoryRef::new(first), DirectoryRef::new(second))
}

fn labels(set: &DuplicatePairSet) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    set.subscribe(move |change| {
        let label = match change {
            PairSetChange::Added(p) => format!("added {}", p.name()),
            PairSetChange::Removed(p) => format!("removed {}", p.name()),
            PairSetChange::Cleared => "cleared".to_string(),
            PairSetChange::Reset => "reset".to_string(),
        };
        sink.lock().unwrap().push(label);
    });
    log
}

#[test]
fn test_ordered_pairs_are_unique() {
    let mut set = DuplicatePairSet::without_sizes();
    assert!(set.add(pair("/r1/x", "/r2/x")));
    assert!(!set.add(pair("/r1/x/", "/r2/./x")));
    assert!(set.add(pair("/r2/x", "/r1/x")));
    assert_eq!(set.len(), 2);
    assert!(set.contains("/r1/x", "/r2/x"));
}

#[test]
fn test_membership_notifications() {
    let mut set = DuplicatePairSet::without_sizes();
    let log = labels(&set);

    set.add_all(vec![pair("/r1/a", "/r2/a"), pair("/r1/b", "/r2/b"), pair("/r1/a", "/r3/a")]);
    assert_eq!(set.remove_all("/r1/a"), 2);
    assert!(!set.remove("/r9/z"));
    set.clear();
    assert!(!set.clear());

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "added a",
            "added b",
            "added a",
            "removed a",
            "removed a",
            "cleared"
        ]
    );
}

#[test]
fn test_remove_matches_either_side() {
    let mut set = DuplicatePairSet::without_sizes();
    set.add(pair("/r1/a", "/r2/a"));
    set.add(pair("/r1/b", "/r2/b"));

    assert!(set.remove("/r2/b"));
    assert_eq!(set.len(), 1);
    assert_eq!(set.get(0).unwrap().pair().name(), "a");

    assert!(set.remove_exact(&pair("/r1/a", "/r2/a")));
    assert!(set.is_empty());
}

#[test]
fn test_sizes_complete_with_reset() {
    let temp = tempdir().unwrap();
    for root in ["r1", "r2"] {
        fs::create_dir_all(temp.path().join(root).join("x")).unwrap();
    }
    fs::write(temp.path().join("r1").join("x").join("f"), vec![0u8; 1500]).unwrap();

    let mut set = DuplicatePairSet::with_size_format(SizeFormat::Human);
    let log = labels(&set);
    set.add(pair(temp.path().join("r1/x"), temp.path().join("r2/x")));

    assert!(set.wait_for_sizes(Duration::from_secs(10)));
    let entry = set.get(0).unwrap();
    assert_eq!(entry.first_size().unwrap().bytes(), Some(1500));
    assert_eq!(entry.first_size().unwrap().display().trim(), "1.5 KB");
    assert_eq!(entry.second_size().unwrap().bytes(), Some(0));

    // Resets are delivered from the worker after the size is stored
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while log.lock().unwrap().iter().filter(|l| *l == "reset").count() < 2 {
        assert!(std::time::Instant::now() < deadline, "resets not delivered");
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(log.lock().unwrap()[0], "added x");
}

#[test]
fn test_removed_pair_stops_resetting() {
    let temp = tempdir().unwrap();
    for root in ["r1", "r2"] {
        fs::create_dir_all(temp.path().join(root).join("x")).unwrap();
    }

    let mut set = DuplicatePairSet::with_size_format(SizeFormat::Bytes);
    set.add(pair(temp.path().join("r1/x"), temp.path().join("r2/x")));
    let size = set.get(0).unwrap().first_size().unwrap().clone();
    set.clear();

    assert!(size.is_detached());
}

#[test]
fn test_detector_output_feeds_pair_set() {
    let temp = tempdir().unwrap();
    for dir in ["a/x", "b/x", "c/x", "c/y"] {
        fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    let mut roots = RootDirectorySet::new();
    roots.add_all(["a", "b", "c"].map(|n| temp.path().join(n)));

    let mut set = DuplicatePairSet::without_sizes();
    let found = DuplicateDetector::with_defaults().detect_in(&roots).unwrap();
    assert_eq!(set.add_all(found), 2);
    assert!(set.iter().all(|e| e.pair().first().path() == temp.path().join("a/x")));
}

#[test]
fn test_directory_in_many_pairs_is_measured_once() {
    let temp = tempdir().unwrap();
    for root in ["r1", "r2", "r3", "r4"] {
        fs::create_dir_all(temp.path().join(root).join("x")).unwrap();
    }
    fs::write(temp.path().join("r1/x/f"), vec![0u8; 64]).unwrap();
    let mut roots = RootDirectorySet::new();
    roots.add_all(["r1", "r2", "r3", "r4"].map(|n| temp.path().join(n)));

    let mut set = DuplicatePairSet::with_size_format(SizeFormat::Bytes);
    let log = labels(&set);
    let found = DuplicateDetector::with_defaults().detect_in(&roots).unwrap();
    assert_eq!(set.add_all(found), 3);

    let shared = set.get(0).unwrap().first_size().unwrap().clone();
    assert!(set.iter().all(|e| e.first_size().unwrap().ptr_eq(&shared)));
    assert!(set.wait_for_sizes(Duration::from_secs(10)));
    assert!(set.iter().all(|e| e.first_size().unwrap().bytes() == Some(64)));

    // One reset per distinct directory: r1/x once, plus three second sides
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while log.lock().unwrap().iter().filter(|l| *l == "reset").count() < 4 {
        assert!(std::time::Instant::now() < deadline, "resets not delivered");
        std::thread::sleep(Duration::from_millis(10));
    }
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(log.lock().unwrap().iter().filter(|l| *l == "reset").count(), 4);
}
