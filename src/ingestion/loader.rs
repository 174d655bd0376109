//! Table creation and schema read-back.

use std::path::Path;

use crate::engine::EngineConnection;
use crate::error::UploadResult;
use crate::types::{ColumnSchema, TableIdentifier};

/// Create `table` from the CSV at `source` and return its columns in physical order.
///
/// Column types are whatever the engine inferred; nothing here re-interprets them. If the table
/// was created but cannot be introspected, it is dropped again before the error is returned.
pub fn load<C>(table: &TableIdentifier, source: &Path, conn: &mut C) -> UploadResult<Vec<ColumnSchema>>
where
    C: EngineConnection + ?Sized,
{
    conn.create_table_from_csv(table, source)?;

    let mut info = match conn.table_info(table) {
        Ok(info) => info,
        Err(e) => {
            // The introspection error is the one returned.
            if let Err(drop_err) = conn.drop_table(table) {
                tracing::warn!(%table, error = %drop_err, "could not drop table after failed introspection");
            }
            return Err(e);
        }
    };

    info.sort_by_key(|c| c.ordinal);
    Ok(info
        .into_iter()
        .map(|c| ColumnSchema::new(c.name, c.data_type))
        .collect())
}
