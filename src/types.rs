//! Core data model types for uploads.
//!
//! An upload ([`RawUpload`]) is turned into a table named by a [`TableIdentifier`]; the engine
//! reports the table's shape back as a [`TableSchema`] (an ordered list of [`ColumnSchema`]s).

use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::{UploadError, UploadResult};

/// Length of the random prefix at the start of every [`TableIdentifier`].
pub const TABLE_PREFIX_LEN: usize = 4;

/// A readable, rewindable byte stream.
///
/// Blanket-implemented for every `Read + Seek + Send` type (files, cursors, ...).
pub trait UploadStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> UploadStream for T {}

/// One uploaded file: an optional user-supplied filename plus its byte stream.
///
/// The pipeline only borrows the stream for the duration of ingestion.
pub struct RawUpload {
    filename: Option<String>,
    stream: Box<dyn UploadStream>,
}

impl RawUpload {
    /// Create an upload from any rewindable reader.
    pub fn new(filename: Option<String>, stream: impl UploadStream + 'static) -> Self {
        Self {
            filename,
            stream: Box::new(stream),
        }
    }

    /// Create an upload backed by an in-memory buffer.
    pub fn from_bytes(filename: Option<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(filename, Cursor::new(bytes.into()))
    }

    /// Open a file on disk as an upload, using its final path component as the filename.
    pub fn from_path(path: impl AsRef<Path>) -> UploadResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(Self::new(filename, file))
    }

    /// Filename as received, if one was supplied.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Mutable access to the underlying stream.
    pub fn stream_mut(&mut self) -> &mut dyn UploadStream {
        self.stream.as_mut()
    }
}

impl fmt::Debug for RawUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawUpload")
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

/// A table name that is always safe to use unquoted in SQL.
///
/// Shape: `^[a-z0-9_]{4}_[a-z0-9_]*$`. Values are produced by
/// [`crate::naming::generate_table_name`] or validated through [`TableIdentifier::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableIdentifier(String);

impl TableIdentifier {
    /// Join an already-sanitized prefix and base.
    pub(crate) fn from_parts(prefix: &str, base: &str) -> Self {
        debug_assert!(is_identifier_shaped(prefix) && prefix.len() == TABLE_PREFIX_LEN);
        debug_assert!(is_identifier_shaped(base));
        Self(format!("{prefix}_{base}"))
    }

    /// Validate a previously generated identifier.
    pub fn parse(value: &str) -> UploadResult<Self> {
        let valid = value.len() > TABLE_PREFIX_LEN
            && value.as_bytes()[TABLE_PREFIX_LEN] == b'_'
            && is_identifier_shaped(value);
        if valid {
            Ok(Self(value.to_owned()))
        } else {
            Err(UploadError::InvalidIdentifier {
                value: value.to_owned(),
            })
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The random prefix.
    pub fn prefix(&self) -> &str {
        &self.0[..TABLE_PREFIX_LEN]
    }

    /// Everything after the prefix and its separating underscore.
    pub fn base(&self) -> &str {
        &self.0[TABLE_PREFIX_LEN + 1..]
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_identifier_shaped(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// A single column as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Engine-reported type name (e.g. `BIGINT`, `VARCHAR`).
    pub data_type: String,
}

impl ColumnSchema {
    /// Create a new column.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// The schema of one created table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Generated table name.
    pub table: TableIdentifier,
    /// Columns in physical order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Create a table schema.
    pub fn new(table: TableIdentifier, columns: Vec<ColumnSchema>) -> Self {
        Self { table, columns }
    }

    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
