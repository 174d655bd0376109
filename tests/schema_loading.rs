mod common;

use common::{RecordingEngine, write_fixture};
use table_ingest::UploadError;
use table_ingest::engine::{EngineConnection, SqlContextConnection, SqlContextOptions};
use table_ingest::ingestion::load;
use table_ingest::types::{ColumnSchema, TableIdentifier};

fn table(name: &str) -> TableIdentifier {
    TableIdentifier::parse(name).unwrap()
}

#[test]
fn engine_infers_types_in_physical_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "people.csv",
        "id,name,score,active\n1,Ada,98.5,true\n2,Grace,87.25,false\n",
    );
    let mut conn = SqlContextConnection::new();

    let cols = load(&table("abcd_people"), &path, &mut conn).unwrap();

    assert_eq!(
        cols,
        vec![
            ColumnSchema::new("id", "BIGINT"),
            ColumnSchema::new("name", "VARCHAR"),
            ColumnSchema::new("score", "DOUBLE"),
            ColumnSchema::new("active", "BOOLEAN"),
        ]
    );
}

#[test]
fn created_tables_are_queryable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "sales.csv", "id,region\n1,north\n2,south\n3,north\n");
    let mut conn = SqlContextConnection::new();
    let t = table("qrst_sales");

    load(&t, &path, &mut conn).unwrap();
    // The engine keeps its own copy; the source file may go away.
    std::fs::remove_file(&path).unwrap();

    assert_eq!(conn.table_names(), vec!["qrst_sales".to_string()]);
    let df = conn
        .query("SELECT region FROM qrst_sales WHERE region = 'north'")
        .unwrap();
    assert_eq!(df.height(), 2);
}

#[test]
fn ragged_rows_are_malformed_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "bad.csv", "a,b\n1,2\n3,4,5\n");
    let mut conn = SqlContextConnection::new();

    let err = load(&table("abcd_bad"), &path, &mut conn).unwrap_err();

    match err {
        UploadError::MalformedSource { table, .. } => assert_eq!(table, "abcd_bad"),
        other => panic!("expected MalformedSource, got {other:?}"),
    }
    assert!(conn.table_names().is_empty());
}

#[test]
fn short_rows_are_malformed_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "short.csv", "a,b\n1,2\n3\n");
    let mut conn = SqlContextConnection::new();

    let err = load(&table("abcd_short"), &path, &mut conn).unwrap_err();

    assert!(matches!(err, UploadError::MalformedSource { .. }), "{err:?}");
    assert!(conn.table_names().is_empty());
}

#[test]
fn quoted_separators_do_not_count_as_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "quoted.csv", "name,city\n\"Doe, Jane\",Oslo\n");
    let mut conn = SqlContextConnection::new();

    let cols = load(&table("abcd_quoted"), &path, &mut conn).unwrap();
    assert_eq!(cols.len(), 2);
}

#[test]
fn existing_table_is_not_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_fixture(dir.path(), "first.csv", "a\n1\n2\n");
    let second = write_fixture(dir.path(), "second.csv", "b,c\nx,y\n");
    let mut conn = SqlContextConnection::new();
    let t = table("abcd_dup");

    load(&t, &first, &mut conn).unwrap();
    let err = load(&t, &second, &mut conn).unwrap_err();

    match err {
        UploadError::TableExists { table } => assert_eq!(table, "abcd_dup"),
        other => panic!("expected TableExists, got {other:?}"),
    }
    assert_eq!(conn.table_names(), vec!["abcd_dup".to_string()]);
    assert_eq!(conn.query("SELECT a FROM abcd_dup").unwrap().height(), 2);
}

#[test]
fn empty_file_is_malformed_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "empty.csv", "");
    let mut conn = SqlContextConnection::new();

    let err = load(&table("abcd_empty"), &path, &mut conn).unwrap_err();
    assert!(matches!(err, UploadError::MalformedSource { .. }), "{err:?}");
}

#[test]
fn custom_separator_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "semi.csv", "id;city\n1;Oslo\n");
    let mut conn = SqlContextConnection::with_options(SqlContextOptions {
        separator: b';',
        ..Default::default()
    });

    let cols = load(&table("abcd_semi"), &path, &mut conn).unwrap();
    assert_eq!(
        cols.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["id", "city"]
    );
}

#[test]
fn drop_table_reports_whether_it_existed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "t.csv", "x\n1\n");
    let mut conn = SqlContextConnection::new();
    let t = table("abcd_t");

    load(&t, &path, &mut conn).unwrap();
    assert!(conn.drop_table(&t).unwrap());
    assert!(!conn.drop_table(&t).unwrap());
    assert!(conn.table_names().is_empty());
}

#[test]
fn loader_passes_path_and_sorts_by_ordinal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "src.csv", "c1,c2,c3\nx,y,z\n");
    let mut engine = RecordingEngine::default();

    let cols = load(&table("abcd_src"), &path, &mut engine).unwrap();

    assert_eq!(engine.creates.len(), 1);
    assert_eq!(engine.creates[0].source, path);
    assert_eq!(engine.creates[0].table, "abcd_src");
    assert_eq!(
        cols.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["c1", "c2", "c3"]
    );
}

#[test]
fn failed_introspection_drops_the_new_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "src.csv", "c1\nx\n");
    let mut engine = RecordingEngine {
        fail_introspection: true,
        ..Default::default()
    };

    let _ = load(&table("abcd_src"), &path, &mut engine).unwrap_err();
    assert_eq!(engine.dropped, vec!["abcd_src".to_string()]);
}

#[test]
fn failed_drop_still_returns_the_introspection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "src.csv", "c1\nx\n");
    let mut engine = RecordingEngine {
        fail_introspection: true,
        fail_drop: true,
        ..Default::default()
    };

    let err = load(&table("abcd_src"), &path, &mut engine).unwrap_err();

    assert!(matches!(err, UploadError::MalformedSource { .. }), "{err:?}");
    assert!(engine.dropped.is_empty());
}
