use thiserror::Error;

/// Convenience result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Error type returned by the upload pipeline.
///
/// This is a single error enum shared by naming, streaming, schema loading and XML export.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The transient store could not be written, or the upload stream could not be read
    /// (disk full, permission denied, broken stream).
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The engine could not parse the uploaded content as delimited text with a header row.
    #[error("malformed source for table '{table}': {message}")]
    MalformedSource { table: String, message: String },

    /// The engine already has a table with this name.
    #[error("table '{table}' already exists")]
    TableExists { table: String },

    /// Any other engine failure (introspection, catalog access, queries).
    #[error("engine error: {0}")]
    Engine(#[from] polars::prelude::PolarsError),

    /// The schema document could not be written.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A string that is not a valid generated table identifier.
    #[error("invalid table identifier '{value}'")]
    InvalidIdentifier { value: String },
}
