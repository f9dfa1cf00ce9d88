use dupdirs::duplicates::{DetectError, DetectorConfig, DuplicateDetector, DuplicatePair};
use dupdirs::roots::RootDirectorySet;
use dupdirs::scanner::DirectoryRef;
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn layout(dirs: &[&str]) -> TempDir {
    let temp = tempdir().unwrap();
    for dir in dirs {
        fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    temp
}

fn roots(base: &Path, names: &[&str]) -> Vec<DirectoryRef> {
    names.iter().map(|n| DirectoryRef::new(base.join(n))).collect()
}

/// Pairs as sorted `(first, second)` paths relative to `base`.
fn relative(pairs: &[DuplicatePair], base: &Path) -> Vec<(String, String)> {
    let rel = |dir: &DirectoryRef| {
        dir.path()
            .strip_prefix(base)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/")
    };
    let mut out: Vec<_> = pairs
        .iter()
        .map(|p| (rel(p.first()), rel(p.second())))
        .collect();
    out.sort();
    out
}

#[test]
fn test_same_named_children_are_paired() {
    let temp = layout(&["r1/photos", "r1/docs", "r2/photos", "r2/music"]);
    let pairs = DuplicateDetector::with_defaults()
        .detect(&roots(temp.path(), &["r1", "r2"]))
        .unwrap();

    assert_eq!(
        relative(&pairs, temp.path()),
        vec![("r1/photos".to_string(), "r2/photos".to_string())]
    );
    assert_eq!(pairs[0].name(), "photos");
}

#[test]
fn test_first_root_wins_across_three_roots() {
    let temp = layout(&["a/x", "b/x", "c/x"]);
    let pairs = DuplicateDetector::with_defaults()
        .detect(&roots(temp.path(), &["a", "b", "c"]))
        .unwrap();

    assert_eq!(
        relative(&pairs, temp.path()),
        vec![
            ("a/x".to_string(), "b/x".to_string()),
            ("a/x".to_string(), "c/x".to_string()),
        ]
    );
}

#[test]
fn test_root_order_decides_first_side() {
    let temp = layout(&["a/x", "b/x"]);
    let pairs = DuplicateDetector::with_defaults()
        .detect(&roots(temp.path(), &["b", "a"]))
        .unwrap();
    assert_eq!(
        relative(&pairs, temp.path()),
        vec![("b/x".to_string(), "a/x".to_string())]
    );
}

#[test]
fn test_files_and_grandchildren_are_ignored() {
    let temp = layout(&["r1/outer/inner", "r2/other/inner"]);
    fs::write(temp.path().join("r1").join("notes"), b"file").unwrap();
    fs::write(temp.path().join("r2").join("notes"), b"file").unwrap();

    let pairs = DuplicateDetector::with_defaults()
        .detect(&roots(temp.path(), &["r1", "r2"]))
        .unwrap();
    assert!(pairs.is_empty());
}

#[test]
fn test_fewer_than_two_roots_yield_nothing() {
    let temp = layout(&["r1/x"]);
    let detector = DuplicateDetector::with_defaults();
    assert!(detector.detect(&[]).unwrap().is_empty());
    assert!(detector
        .detect(&roots(temp.path(), &["r1"]))
        .unwrap()
        .is_empty());
}

#[test]
fn test_vanished_root_contributes_nothing() {
    let temp = layout(&["r1/x", "r2/x"]);
    let all = roots(temp.path(), &["r1", "gone", "r2"]);
    let pairs = DuplicateDetector::with_defaults().detect(&all).unwrap();
    assert_eq!(pairs.len(), 1);
}

#[test]
fn test_skip_hidden_children() {
    let temp = layout(&["r1/.cache", "r2/.cache", "r1/src", "r2/src"]);
    let all = roots(temp.path(), &["r1", "r2"]);

    let with_hidden = DuplicateDetector::with_defaults().detect(&all).unwrap();
    assert_eq!(with_hidden.len(), 2);

    let detector = DuplicateDetector::new(DetectorConfig::default().with_skip_hidden(true));
    let pairs = detector.detect(&all).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].name(), "src");
}

#[cfg(unix)]
#[test]
fn test_symlinked_directories_need_follow_symlinks() {
    let temp = layout(&["r1/data", "r2", "target"]);
    std::os::unix::fs::symlink(temp.path().join("target"), temp.path().join("r2").join("data"))
        .unwrap();
    let all = roots(temp.path(), &["r1", "r2"]);

    assert!(DuplicateDetector::with_defaults()
        .detect(&all)
        .unwrap()
        .is_empty());

    let following = DuplicateDetector::new(DetectorConfig::default().with_follow_symlinks(true));
    assert_eq!(following.detect(&all).unwrap().len(), 1);
}

#[test]
fn test_raised_shutdown_flag_interrupts() {
    let temp = layout(&["r1/x", "r2/x"]);
    let detector =
        DuplicateDetector::with_defaults().with_shutdown_flag(Arc::new(AtomicBool::new(true)));

    let result = detector.detect(&roots(temp.path(), &["r1", "r2"]));
    assert!(matches!(result, Err(DetectError::Interrupted)));
}

#[test]
fn test_detect_in_uses_set_order() {
    let temp = layout(&["r1/x", "r2/x", "r3/y"]);
    let mut set = RootDirectorySet::new();
    set.add_all(["r2", "r1", "r3"].map(|n| temp.path().join(n)));

    let pairs = DuplicateDetector::with_defaults().detect_in(&set).unwrap();
    assert_eq!(
        relative(&pairs, temp.path()),
        vec![("r2/x".to_string(), "r1/x".to_string())]
    );
}

/// Pairs as `(first, second)` paths in the order `detect` returned them.
fn ordered(pairs: &[DuplicatePair]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|p| {
            (
                p.first().path().display().to_string(),
                p.second().path().display().to_string(),
            )
        })
        .collect()
}

#[test]
fn test_detect_is_repeatable_for_a_fixed_tree() {
    let temp = layout(&[
        "r1/a", "r1/b", "r1/c", "r2/c", "r2/b", "r2/d", "r3/a", "r3/d", "r3/b",
    ]);
    let detector = DuplicateDetector::with_defaults();
    let dirs = roots(temp.path(), &["r1", "r2", "r3"]);

    let first_run = detector.detect(&dirs).unwrap();
    let second_run = detector.detect(&dirs).unwrap();
    assert_eq!(first_run.len(), 5);
    assert_eq!(ordered(&first_run), ordered(&second_run));
}

#[test]
fn test_root_listed_twice_yields_no_self_pairs() {
    let temp = layout(&["r1/x", "r2/x"]);
    let a = DirectoryRef::new(temp.path().join("r1"));
    let detector = DuplicateDetector::with_defaults();

    assert!(detector.detect(&[a.clone(), a.clone()]).unwrap().is_empty());

    let mut dirs = vec![a.clone()];
    dirs.extend(roots(temp.path(), &["r2"]));
    dirs.push(a);
    assert_eq!(
        relative(&detector.detect(&dirs).unwrap(), temp.path()),
        vec![("r1/x".to_string(), "r2/x".to_string())]
    );
}

#[cfg(all(unix, not(target_os = "macos")))]
#[test]
fn test_normal_form_spellings_are_different_names() {
    let temp = layout(&["r1/caf\u{00E9}", "r2/cafe\u{0301}"]);
    let pairs = DuplicateDetector::with_defaults()
        .detect(&roots(temp.path(), &["r1", "r2"]))
        .unwrap();
    assert!(pairs.is_empty());
}
