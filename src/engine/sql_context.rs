//! polars-sql backed engine.

use std::fmt;
use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use polars_sql::SQLContext;

use crate::error::{UploadError, UploadResult};
use crate::types::TableIdentifier;

use super::{ColumnInfo, EngineConnection};

/// Options for [`SqlContextConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlContextOptions {
    /// Number of data rows the CSV reader scans to infer column types.
    pub infer_schema_length: usize,
    /// Field separator byte.
    pub separator: u8,
}

impl Default for SqlContextOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: 100,
            separator: b',',
        }
    }
}

/// An in-process engine session: a polars-sql catalog of named, materialized tables.
///
/// Tables created through [`EngineConnection::create_table_from_csv`] stay in the catalog until
/// dropped, and can be queried with [`SqlContextConnection::query`].
pub struct SqlContextConnection {
    ctx: SQLContext,
    options: SqlContextOptions,
}

impl SqlContextConnection {
    /// Create an empty session with default options.
    pub fn new() -> Self {
        Self::with_options(SqlContextOptions::default())
    }

    /// Create an empty session.
    pub fn with_options(options: SqlContextOptions) -> Self {
        Self {
            ctx: SQLContext::new(),
            options,
        }
    }

    /// Run a SQL query against the session and collect the result.
    pub fn query(&mut self, sql: &str) -> UploadResult<DataFrame> {
        Ok(self.ctx.execute(sql)?.collect()?)
    }

    /// Names of all tables currently in the catalog.
    pub fn table_names(&self) -> Vec<String> {
        self.ctx.get_tables()
    }

    fn has_table(&self, table: &TableIdentifier) -> bool {
        self.ctx.get_tables().iter().any(|t| t == table.as_str())
    }
}

impl Default for SqlContextConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SqlContextConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlContextConnection")
            .field("tables", &self.ctx.get_tables())
            .field("options", &self.options)
            .finish()
    }
}

impl EngineConnection for SqlContextConnection {
    fn create_table_from_csv(&mut self, table: &TableIdentifier, source: &Path) -> UploadResult<()> {
        if self.has_table(table) {
            return Err(UploadError::TableExists {
                table: table.to_string(),
            });
        }

        let separator = self.options.separator;
        check_record_widths(table, source, separator)?;

        // Read eagerly: the source is a transient file that is deleted right after this call.
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.options.infer_schema_length))
            .map_parse_options(|parse| parse.with_separator(separator))
            .try_into_reader_with_file_path(Some(source.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| UploadError::MalformedSource {
                table: table.to_string(),
                message: e.to_string(),
            })?;

        self.ctx.register(table.as_str(), df.lazy());
        Ok(())
    }

    fn table_info(&mut self, table: &TableIdentifier) -> UploadResult<Vec<ColumnInfo>> {
        let empty = self
            .ctx
            .execute(&format!("SELECT * FROM {table} LIMIT 0"))?
            .collect()?;

        let columns = empty
            .schema()
            .iter()
            .enumerate()
            .map(|(ordinal, (name, dtype))| ColumnInfo {
                ordinal,
                name: name.to_string(),
                data_type: sql_type_name(dtype),
            })
            .collect();
        Ok(columns)
    }

    fn drop_table(&mut self, table: &TableIdentifier) -> UploadResult<bool> {
        if !self.has_table(table) {
            return Ok(false);
        }
        self.ctx.unregister(table.as_str());
        Ok(true)
    }
}

/// Reject files whose records do not all have as many fields as the header.
///
/// The polars reader pads short rows with nulls; the strict `csv` reader does not.
fn check_record_widths(table: &TableIdentifier, source: &Path, separator: u8) -> UploadResult<()> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .delimiter(separator)
        .from_reader(File::open(source)?);

    let mut record = csv::ByteRecord::new();
    loop {
        match rdr.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(e) => {
                return Err(UploadError::MalformedSource {
                    table: table.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
}

/// SQL type name reported for a polars dtype.
///
/// Names follow the usual analytical-SQL spelling (`BIGINT`, `DOUBLE`, `VARCHAR`, ...). Types
/// without a conventional SQL name fall back to the polars name, uppercased.
pub fn sql_type_name(dtype: &DataType) -> String {
    let name = match dtype {
        DataType::Boolean => "BOOLEAN",
        DataType::Int32 => "INTEGER",
        DataType::Int64 => "BIGINT",
        DataType::UInt32 => "UINTEGER",
        DataType::UInt64 => "UBIGINT",
        DataType::Float32 => "FLOAT",
        DataType::Float64 => "DOUBLE",
        DataType::String => "VARCHAR",
        DataType::Binary => "BLOB",
        DataType::Date => "DATE",
        DataType::Datetime(_, None) => "TIMESTAMP",
        DataType::Datetime(_, Some(_)) => "TIMESTAMP WITH TIME ZONE",
        DataType::Duration(_) => "INTERVAL",
        DataType::Null => "NULL",
        DataType::List(inner) => return format!("{}[]", sql_type_name(inner)),
        other => return other.to_string().to_uppercase(),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use polars::prelude::{DataType, TimeUnit};

    use super::sql_type_name;

    #[test]
    fn common_types_use_sql_names() {
        assert_eq!(sql_type_name(&DataType::Int64), "BIGINT");
        assert_eq!(sql_type_name(&DataType::Float64), "DOUBLE");
        assert_eq!(sql_type_name(&DataType::String), "VARCHAR");
        assert_eq!(sql_type_name(&DataType::Boolean), "BOOLEAN");
        assert_eq!(
            sql_type_name(&DataType::Datetime(TimeUnit::Microseconds, None)),
            "TIMESTAMP"
        );
    }

    #[test]
    fn list_types_nest() {
        let dtype = DataType::List(Box::new(DataType::Int32));
        assert_eq!(sql_type_name(&dtype), "INTEGER[]");
    }
}
