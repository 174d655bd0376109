//! XML export of table schemas.
//!
//! The document has one `table` element per table and one empty `column` element per column,
//! with all data carried in attributes:
//!
//! ```xml
//! <tables_schema>
//!   <table name="abcd_sales">
//!     <column name="id" data_type="BIGINT"/>
//!     <column name="region" data_type="VARCHAR"/>
//!   </table>
//! </tables_schema>
//! ```
//!
//! Output is indented with two spaces and has neither an XML declaration nor a trailing newline.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::error::UploadResult;
use crate::types::TableSchema;

const ROOT: &str = "tables_schema";
const TABLE: &str = "table";
const COLUMN: &str = "column";

/// Render `schemas` as a `tables_schema` document.
///
/// Tables appear in slice order and columns in their stored order, so equal input always
/// yields byte-identical output.
pub fn serialize(schemas: &[TableSchema]) -> UploadResult<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    if schemas.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(ROOT)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(ROOT)))?;
        for schema in schemas {
            write_table(&mut writer, schema)?;
        }
        writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
    }

    let bytes = writer.into_inner().into_inner();
    // Every event above was built from `&str`, so the buffer is valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_table(writer: &mut Writer<Cursor<Vec<u8>>>, schema: &TableSchema) -> UploadResult<()> {
    let mut table = BytesStart::new(TABLE);
    table.push_attribute(("name", schema.table.as_str()));

    if schema.columns.is_empty() {
        writer.write_event(Event::Empty(table))?;
        return Ok(());
    }

    writer.write_event(Event::Start(table))?;
    for column in &schema.columns {
        let mut el = BytesStart::new(COLUMN);
        el.push_attribute(("name", column.name.as_str()));
        el.push_attribute(("data_type", column.data_type.as_str()));
        writer.write_event(Event::Empty(el))?;
    }
    writer.write_event(Event::End(BytesEnd::new(TABLE)))?;
    Ok(())
}
