use super::common::{rel_paths, scan, sha256, walk, write_file};
use dupfind::duplicates::{detect_duplicates, DetectionMode, DuplicateFinder, FinderConfig};
use dupfind::scanner::DigestAlgorithm;
use tempfile::tempdir;

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    assert!(walk(&[dir.path()]).is_empty());
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.txt", b"content a");
    write_file(dir.path(), "b.txt", b"content bb");
    write_file(dir.path(), "c.txt", b"content ccc");

    let (groups, summary) = scan(dir.path(), sha256());
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.candidates, 0);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_end_to_end_fast_mode() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a/x.txt", b"AAAAAAAAAA");
    write_file(dir.path(), "b/x.txt", b"AAAAAAAAAA");
    write_file(dir.path(), "c/y.txt", b"BBBBBBBBBB");

    let (groups, _) = scan(dir.path(), DetectionMode::NameSize);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].label, "x.txt");
    assert_eq!(groups[0].size, 10);
    assert_eq!(rel_paths(&groups[0], dir.path()), vec!["a/x.txt", "b/x.txt"]);
}

#[test]
fn test_end_to_end_hash_mode() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a/x.txt", b"AAAAAAAAAA");
    write_file(dir.path(), "b/x.txt", b"AAAAAAAAAA");
    write_file(dir.path(), "c/y.txt", b"BBBBBBBBBB");

    for algorithm in DigestAlgorithm::ALL {
        let (groups, summary) = scan(dir.path(), DetectionMode::Hash(algorithm));
        assert_eq!(groups.len(), 1, "{}", algorithm);
        assert_eq!(rel_paths(&groups[0], dir.path()), vec!["a/x.txt", "b/x.txt"]);
        assert_eq!(groups[0].label.len(), algorithm.hex_len());
        assert_eq!(summary.candidates, 3);
        assert_eq!(summary.hashed_files, 3);
    }
}

#[test]
fn test_fast_mode_is_case_insensitive() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "one/Report.TXT", b"0123456789");
    write_file(dir.path(), "two/report.txt", b"9876543210");

    let (groups, _) = scan(dir.path(), DetectionMode::NameSize);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].label, "Report.TXT");
}

#[test]
fn test_fast_mode_requires_equal_size() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "one/report.txt", b"0123456789");
    write_file(dir.path(), "two/report.txt", b"012345678");

    let (groups, summary) = scan(dir.path(), DetectionMode::NameSize);
    assert!(groups.is_empty());
    assert_eq!(summary.eliminated_by_key, 2);
}

#[test]
fn test_fast_mode_reads_no_content() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "one/data.bin", b"aaaa");
    write_file(dir.path(), "two/data.bin", b"bbbb");

    let (groups, summary) = scan(dir.path(), DetectionMode::NameSize);
    assert_eq!(groups.len(), 1);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_hash_mode_ignores_names() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "holiday.jpg", b"same bytes");
    write_file(dir.path(), "copy of holiday.jpg", b"same bytes");
    write_file(dir.path(), "IMG_0001.JPG", b"same bytes");

    let (groups, _) = scan(dir.path(), sha256());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[0].duplicate_count(), 2);
    assert_eq!(groups[0].wasted_space(), 20);
}

#[test]
fn test_one_byte_difference_splits_group() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"AAAAAAAAAA");
    write_file(dir.path(), "b", b"AAAAAAAAAA");
    write_file(dir.path(), "c", b"AAAAAAAAAB");

    let (groups, _) = scan(dir.path(), DetectionMode::Hash(DigestAlgorithm::Md5));
    assert_eq!(groups.len(), 1);
    assert_eq!(rel_paths(&groups[0], dir.path()), vec!["a", "b"]);
}

#[test]
fn test_groups_sorted_by_size_then_label() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "big1", &[7u8; 300]);
    write_file(dir.path(), "big2", &[7u8; 300]);
    write_file(dir.path(), "small1", b"xy");
    write_file(dir.path(), "small2", b"xy");
    write_file(dir.path(), "mid1", b"zz");
    write_file(dir.path(), "mid2", b"zz");

    let (groups, _) = scan(dir.path(), sha256());
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].size, 2);
    assert_eq!(groups[1].size, 2);
    assert!(groups[0].label < groups[1].label);
    assert_eq!(groups[2].size, 300);
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempdir().unwrap();
    for i in 0..12 {
        write_file(
            dir.path(),
            &format!("d{}/copy{}.bin", i % 4, i),
            format!("{}", i % 3).as_bytes(),
        );
    }

    let paths = walk(&[dir.path()]);
    let first = detect_duplicates(paths.clone(), sha256()).unwrap();
    let second = detect_duplicates(paths.clone(), sha256()).unwrap();
    assert_eq!(first, second);

    let threaded = DuplicateFinder::new(
        FinderConfig::default()
            .with_mode(sha256())
            .with_io_threads(7),
    );
    let (third, _) = threaded.find_duplicates(paths).unwrap();
    assert_eq!(first, third);
}

#[test]
fn test_groups_partition_the_files() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write_file(dir.path(), &format!("f{:02}", i), &vec![b'a'; i % 5]);
    }

    let (groups, _) = scan(dir.path(), sha256());
    let mut seen = std::collections::HashSet::new();
    for group in &groups {
        assert!(group.len() >= 2);
        for member in &group.members {
            assert!(seen.insert(member.path.clone()), "{:?} in two groups", member.path);
            assert_eq!(member.size, group.size);
        }
    }
    assert_eq!(groups.len(), 5);
}
