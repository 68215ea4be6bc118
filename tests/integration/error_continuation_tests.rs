use super::common::{sha256, walk, write_file};
use dupfind::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupfind::scanner::SkipReason;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_vanished_file_is_skipped() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.bin", b"same");
    write_file(dir.path(), "b.bin", b"same");
    let gone = write_file(dir.path(), "c.bin", b"gone");

    let paths = walk(&[dir.path()]);
    std::fs::remove_file(&gone).unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_mode(sha256()));
    let (groups, summary) = finder.find_duplicates(paths).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].path.ends_with("c.bin"));
    assert_eq!(summary.skipped[0].reason, SkipReason::NotFound);
    assert_eq!(summary.classified_files, 2);
}

#[test]
fn test_directory_path_is_not_a_file() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a.bin", b"same");
    let b = write_file(dir.path(), "b.bin", b"same");
    let sub = dir.path().join("sub");
    std::fs::create_dir(&sub).unwrap();

    let finder = DuplicateFinder::new(FinderConfig::default().with_mode(sha256()));
    let (groups, summary) = finder.find_duplicates(vec![a, sub, b]).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.skipped[0].reason, SkipReason::NotAFile);
}

#[test]
fn test_every_file_missing_is_empty_success() {
    let dir = tempdir().unwrap();
    let paths = vec![dir.path().join("one"), dir.path().join("two")];

    let finder = DuplicateFinder::new(FinderConfig::default().with_mode(sha256()));
    let (groups, summary) = finder.find_duplicates(paths).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.skipped.len(), 2);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_interrupt_discards_results() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.bin", b"same");
    write_file(dir.path(), "b.bin", b"same");

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_mode(sha256())
            .with_shutdown_flag(flag),
    );
    let result = finder.find_duplicates(walk(&[dir.path()]));
    assert!(matches!(result, Err(FinderError::Interrupted)));
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed_by_default() {
    let dir = tempdir().unwrap();
    let target = write_file(dir.path(), "real.bin", b"content");
    std::os::unix::fs::symlink(&target, dir.path().join("link.bin")).unwrap();

    let paths = walk(&[dir.path()]);
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("real.bin"));
}
