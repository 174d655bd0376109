mod common;

use std::fs;
use std::io::{Cursor, ErrorKind, Read};
use std::path::PathBuf;

use table_ingest::UploadError;
use table_ingest::ingestion::{StreamOptions, ingest};
use table_ingest::types::RawUpload;

fn options_in(dir: &tempfile::TempDir, chunk_size: usize) -> StreamOptions {
    StreamOptions {
        chunk_size,
        temp_dir: Some(dir.path().to_path_buf()),
    }
}

#[test]
fn copies_all_bytes_in_small_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let body: String = (0..500).map(|i| format!("{i},row{i}\n")).collect();
    let mut upload = RawUpload::from_bytes(Some("big.csv".to_string()), format!("id,name\n{body}"));

    let transient = ingest(&mut upload, &options_in(&dir, 7)).unwrap();

    let copied = fs::read_to_string(transient.path()).unwrap();
    assert_eq!(copied, format!("id,name\n{body}"));
    assert_eq!(transient.bytes_written(), copied.len() as u64);
}

#[test]
fn rewinds_partially_consumed_streams() {
    let dir = tempfile::tempdir().unwrap();
    let mut cursor = Cursor::new(b"id,name\n1,a\n".to_vec());
    let mut skipped = [0u8; 5];
    cursor.read_exact(&mut skipped).unwrap();

    let mut upload = RawUpload::new(Some("partial.csv".to_string()), cursor);
    let transient = ingest(&mut upload, &options_in(&dir, 1024)).unwrap();

    assert_eq!(fs::read_to_string(transient.path()).unwrap(), "id,name\n1,a\n");
}

#[test]
fn transient_file_is_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let mut upload = RawUpload::from_bytes(None, "a\n1\n");

    let path: PathBuf = {
        let transient = ingest(&mut upload, &options_in(&dir, 1024)).unwrap();
        assert!(transient.path().exists());
        assert!(transient.path().starts_with(dir.path()));
        assert_eq!(transient.path().extension().and_then(|e| e.to_str()), Some("csv"));
        transient.path().to_path_buf()
    };

    assert!(!path.exists());
    assert_eq!(common::dir_entries(dir.path()), 0);
}

#[test]
fn empty_upload_produces_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut upload = RawUpload::from_bytes(None, Vec::new());
    let transient = ingest(&mut upload, &options_in(&dir, 16)).unwrap();
    assert_eq!(transient.bytes_written(), 0);
    assert_eq!(fs::metadata(transient.path()).unwrap().len(), 0);
}

#[test]
fn missing_temp_dir_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let opts = StreamOptions {
        chunk_size: 16,
        temp_dir: Some(dir.path().join("does_not_exist")),
    };
    let mut upload = RawUpload::from_bytes(None, "a\n1\n");

    let err = ingest(&mut upload, &opts).unwrap_err();
    assert!(err.to_string().starts_with("storage error"), "{err}");
}

#[test]
fn uploads_from_path_keep_the_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_fixture(dir.path(), "Sales Q1.csv", "id\n1\n");
    let upload = RawUpload::from_path(&path).unwrap();
    assert_eq!(upload.filename(), Some("Sales Q1.csv"));
}

#[test]
fn zero_chunk_size_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut upload = RawUpload::from_bytes(Some("a.csv".to_string()), "a\n1\n");

    let err = ingest(&mut upload, &options_in(&dir, 0)).unwrap_err();

    match err {
        UploadError::Storage(e) => assert_eq!(e.kind(), ErrorKind::InvalidInput),
        other => panic!("expected Storage, got {other:?}"),
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
