//! The analytical engine seam.
//!
//! The upload pipeline only needs three things from an engine: create a table from a CSV file,
//! list a table's columns in physical order, and drop a table. [`EngineConnection`] captures
//! exactly that; [`SqlContextConnection`] implements it on top of a polars-sql catalog.
//!
//! Connection lifecycle belongs to the caller. The pipeline borrows a connection for one request
//! and never opens or closes it.

mod sql_context;

use std::path::Path;

use crate::error::UploadResult;
use crate::types::TableIdentifier;

pub use sql_context::{SqlContextConnection, SqlContextOptions, sql_type_name};

/// One row of table introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Zero-based physical position.
    pub ordinal: usize,
    /// Column name.
    pub name: String,
    /// Engine type name.
    pub data_type: String,
}

/// Capabilities the upload pipeline needs from an analytical engine.
pub trait EngineConnection {
    /// Create `table` from every row of the delimited-text file at `source`, letting the engine
    /// infer column types from the header row and the data.
    ///
    /// `source` is passed as data, never spliced into statement text. Fails if `table` already
    /// exists, or if any record has a different number of fields than the header.
    fn create_table_from_csv(&mut self, table: &TableIdentifier, source: &Path) -> UploadResult<()>;

    /// Columns of `table` in physical order.
    fn table_info(&mut self, table: &TableIdentifier) -> UploadResult<Vec<ColumnInfo>>;

    /// Remove `table` from the catalog. Returns `false` if it did not exist.
    fn drop_table(&mut self, table: &TableIdentifier) -> UploadResult<bool>;
}
