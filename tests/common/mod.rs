#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use table_ingest::engine::{ColumnInfo, EngineConnection};
use table_ingest::types::TableIdentifier;
use table_ingest::{UploadError, UploadResult};

/// Write `contents` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// One `create_table_from_csv` call as seen by [`RecordingEngine`].
#[derive(Debug, Clone)]
pub struct CreateCall {
    pub table: String,
    pub source: PathBuf,
    /// File contents at the time of the call.
    pub contents: String,
}

/// Fake engine: every header field becomes a `VARCHAR` column.
///
/// `table_info` reports columns in reverse ordinal order so callers must sort.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub creates: Vec<CreateCall>,
    pub dropped: Vec<String>,
    /// Fail `create_table_from_csv` for tables whose name ends with this.
    pub reject_suffix: Option<String>,
    /// Fail every `table_info` call.
    pub fail_introspection: bool,
    /// Fail every `drop_table` call.
    pub fail_drop: bool,
}

impl EngineConnection for RecordingEngine {
    fn create_table_from_csv(&mut self, table: &TableIdentifier, source: &Path) -> UploadResult<()> {
        let contents = fs::read_to_string(source)?;
        if let Some(suffix) = &self.reject_suffix {
            if table.as_str().ends_with(suffix.as_str()) {
                return Err(UploadError::MalformedSource {
                    table: table.to_string(),
                    message: "rejected by test engine".to_string(),
                });
            }
        }
        self.creates.push(CreateCall {
            table: table.to_string(),
            source: source.to_path_buf(),
            contents,
        });
        Ok(())
    }

    fn table_info(&mut self, table: &TableIdentifier) -> UploadResult<Vec<ColumnInfo>> {
        if self.fail_introspection {
            return Err(UploadError::MalformedSource {
                table: table.to_string(),
                message: "introspection disabled".to_string(),
            });
        }
        let call = self
            .creates
            .iter()
            .find(|c| c.table == table.as_str())
            .expect("table_info for unknown table");
        let header = call.contents.lines().next().unwrap_or("");
        let mut cols: Vec<ColumnInfo> = header
            .split(',')
            .enumerate()
            .map(|(ordinal, name)| ColumnInfo {
                ordinal,
                name: name.to_string(),
                data_type: "VARCHAR".to_string(),
            })
            .collect();
        cols.reverse();
        Ok(cols)
    }

    fn drop_table(&mut self, table: &TableIdentifier) -> UploadResult<bool> {
        if self.fail_drop {
            return Err(UploadError::Storage(std::io::Error::other("catalog locked")));
        }
        self.dropped.push(table.to_string());
        Ok(true)
    }
}

/// Entries left in a directory.
pub fn dir_entries(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}
