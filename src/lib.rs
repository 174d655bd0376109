//! `table-ingest` loads uploaded CSV files into an embedded analytical engine, one table per file,
//! and reports the inferred column schemas as an XML document.
//!
//! The primary entrypoint is [`ingestion::handle`], which for each upload:
//!
//! 1. derives a SQL-safe table name from the filename ([`naming::generate_table_name`])
//! 2. streams the bytes to a transient file in bounded-memory chunks ([`ingestion::ingest`])
//! 3. creates the table through an [`engine::EngineConnection`] and reads its columns back
//!    ([`ingestion::load`])
//!
//! and then renders every loaded schema once ([`schema_xml::serialize`]).
//!
//! ## Table names
//!
//! `Sales Q1.csv` becomes `<prefix>_sales_q1`: a trailing `.csv` is removed (exactly that suffix,
//! case-sensitive), anything outside `[A-Za-z0-9_]` becomes `_`, the result is lowercased and a
//! 4-symbol random prefix is prepended. Other extensions stay in the name (`data.tsv` becomes
//! `<prefix>_data_tsv`).
//!
//! ## Quick example
//!
//! ```no_run
//! use table_ingest::engine::SqlContextConnection;
//! use table_ingest::ingestion::{handle, UploadOptions};
//! use table_ingest::types::RawUpload;
//!
//! # fn main() -> Result<(), table_ingest::UploadError> {
//! let mut conn = SqlContextConnection::new();
//! let uploads = vec![
//!     RawUpload::from_path("sales.csv")?,
//!     RawUpload::from_bytes(None, "id,region\n1,north\n"),
//! ];
//!
//! let response = handle(uploads, &mut conn, &UploadOptions::default())?.into_response();
//! println!("{}", response.to_json_pretty().unwrap());
//! # Ok(())
//! # }
//! ```
//!
//! ## Partial failures
//!
//! By default the first file that fails aborts the request ([`ingestion::FailurePolicy::Abort`]).
//! With [`ingestion::FailurePolicy::Isolate`] the failure is recorded in the
//! [`ingestion::UploadReport`] and the remaining files are still loaded.
//!
//! ## Modules
//!
//! - [`ingestion`]: orchestration, streaming, schema loading and observers
//! - [`naming`]: table name generation and token sources
//! - [`engine`]: the engine connection trait and the polars-sql implementation
//! - [`schema_xml`]: XML export of table schemas
//! - [`response`]: the JSON response envelope
//! - [`types`]: upload and schema types
//! - [`error`]: error types used across the crate

pub mod engine;
pub mod error;
pub mod ingestion;
pub mod naming;
pub mod response;
pub mod schema_xml;
pub mod types;

pub use error::{UploadError, UploadResult};
