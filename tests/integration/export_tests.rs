use super::common::{scan, sha256, write_file};
use dupfind::duplicates::DetectionMode;
use dupfind::output::csv::{export_rows, CsvOutput};
use dupfind::output::display::GroupView;
use tempfile::tempdir;

#[test]
fn test_export_sampling_large_group() {
    let dir = tempdir().unwrap();
    for i in 0..25 {
        write_file(dir.path(), &format!("copy{:02}.dat", i), b"identical payload");
    }

    let (groups, _) = scan(dir.path(), sha256());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 25);

    let rows = export_rows(&groups[0], 10);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].pair, 1);
    assert_eq!(rows[1].pair, 25);
    assert!(rows[0].path_a.ends_with("copy00.dat"));
    assert!(rows[0].path_b.ends_with("copy01.dat"));
    assert!(rows[1].path_a.ends_with("copy23.dat"));
    assert!(rows[1].path_b.ends_with("copy24.dat"));
    assert_eq!(rows[0].name, "copy00.dat");
}

#[test]
fn test_export_small_group_all_pairs() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write_file(dir.path(), &format!("d{}/song.mp3", i), b"0123456789");
    }

    let (groups, _) = scan(dir.path(), DetectionMode::NameSize);
    let rows = export_rows(&groups[0], 10);
    assert_eq!(rows.len(), 6);
    let numbers: Vec<usize> = rows.iter().map(|r| r.pair).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    assert!(rows.iter().all(|r| r.name == "song.mp3" && r.size_bytes == 10));
}

#[test]
fn test_display_truncates_large_group() {
    let dir = tempdir().unwrap();
    for i in 0..25 {
        write_file(dir.path(), &format!("copy{:02}.dat", i), b"identical payload");
    }

    let (groups, _) = scan(dir.path(), sha256());
    let view = GroupView::new(&groups[0], 10);
    assert_eq!(view.shown.len(), 10);
    let hidden = view.hidden.unwrap();
    assert_eq!(hidden.count, 15);
    assert_eq!(hidden.first_name, "copy00.dat");
    assert_eq!(hidden.last_name, "copy24.dat");
}

#[test]
fn test_csv_file_written() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    write_file(&data, "a/x.txt", b"AAAAAAAAAA");
    write_file(&data, "b/x.txt", b"AAAAAAAAAA");
    write_file(&data, "c/x.txt", b"AAAAAAAAAA");

    let (groups, _) = scan(&data, DetectionMode::NameSize);
    let csv_path = dir.path().join("pairs.csv");
    let file = std::fs::File::create(&csv_path).unwrap();
    let written = CsvOutput::new(&groups, 10).write_to(file).unwrap();
    assert_eq!(written, 3);

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["name", "pair", "size_bytes", "path_a", "path_b"]
    );
    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 3);
    assert_eq!(&records[2][1], "3");
    assert_eq!(&records[2][2], "10");
}
