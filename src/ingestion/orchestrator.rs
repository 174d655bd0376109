//! Upload orchestration.
//!
//! [`handle`] runs every upload in a request through the pipeline, one file at a time and in
//! request order:
//!
//! 1. generate a table name ([`crate::naming`])
//! 2. stream the bytes to a transient file ([`super::stream`])
//! 3. create the table and read its columns back ([`super::loader`])
//!
//! and finally renders all loaded schemas once ([`crate::schema_xml`]).
//!
//! If an [`super::observability::UploadObserver`] is configured, every stage transition,
//! success, failure and alert is reported to it.

use std::fmt;
use std::sync::Arc;

use crate::engine::EngineConnection;
use crate::error::{UploadError, UploadResult};
use crate::naming::{DEFAULT_UPLOAD_FILENAME, RandomTokenSource, TokenSource, generate_table_name};
use crate::response::UploadResponse;
use crate::schema_xml;
use crate::types::{RawUpload, TableIdentifier, TableSchema};

use super::observability::{FileStage, UploadContext, UploadObserver, UploadSeverity, UploadStats};
use super::{loader, stream};
use super::stream::StreamOptions;

/// What to do when one file in a request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure and return it as the request's error. Tables created for
    /// earlier files stay in the engine.
    #[default]
    Abort,
    /// Record the failure and carry on with the next file.
    Isolate,
}

/// Options controlling [`handle`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct UploadOptions {
    /// Streaming options (chunk size, temp directory).
    pub stream: StreamOptions,
    /// Per-file failure handling.
    pub failure_policy: FailurePolicy,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn UploadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: UploadSeverity,
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("stream", &self.stream)
            .field("failure_policy", &self.failure_policy)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            stream: StreamOptions::default(),
            failure_policy: FailurePolicy::default(),
            observer: None,
            alert_at_or_above: UploadSeverity::Critical,
        }
    }
}

/// A file that did not make it to a table.
#[derive(Debug)]
pub struct FileFailure {
    /// Zero-based position in the request.
    pub index: usize,
    /// Filename as received.
    pub filename: Option<String>,
    /// Table name, if one had been generated before the failure.
    pub table: Option<TableIdentifier>,
    /// What went wrong.
    pub error: UploadError,
}

/// Result for a single file.
#[derive(Debug)]
pub enum FileOutcome {
    /// The table was created.
    Loaded(TableSchema),
    /// The file failed (only recorded under [`FailurePolicy::Isolate`]).
    Failed(FileFailure),
}

/// Everything produced by one request.
#[derive(Debug)]
pub struct UploadReport {
    filenames: Vec<Option<String>>,
    outcomes: Vec<FileOutcome>,
    tables_schema_xml: String,
}

impl UploadReport {
    /// Filenames as received, in request order.
    pub fn filenames(&self) -> &[Option<String>] {
        &self.filenames
    }

    /// Per-file outcomes, in request order.
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    /// Schemas of the tables that were created, in request order.
    pub fn loaded(&self) -> impl Iterator<Item = &TableSchema> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Loaded(schema) => Some(schema),
            FileOutcome::Failed(_) => None,
        })
    }

    /// Files that failed, in request order.
    pub fn failures(&self) -> impl Iterator<Item = &FileFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Failed(failure) => Some(failure),
            FileOutcome::Loaded(_) => None,
        })
    }

    /// Names of the tables created by this request.
    ///
    /// Useful for callers that want tables to live only as long as the request.
    pub fn table_names(&self) -> Vec<&TableIdentifier> {
        self.loaded().map(|s| &s.table).collect()
    }

    /// The serialized schema document.
    pub fn tables_schema_xml(&self) -> &str {
        &self.tables_schema_xml
    }

    /// `true` when every file produced a table.
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Convert into the transport response envelope.
    pub fn into_response(self) -> UploadResponse {
        UploadResponse::success(self.filenames, self.tables_schema_xml)
    }
}

/// Load every upload into `conn` as its own table, using random table prefixes.
///
/// See [`handle_with_tokens`].
pub fn handle<C>(uploads: Vec<RawUpload>, conn: &mut C, options: &UploadOptions) -> UploadResult<UploadReport>
where
    C: EngineConnection + ?Sized,
{
    handle_with_tokens(uploads, conn, options, &mut RandomTokenSource::new())
}

/// Load every upload into `conn` as its own table.
///
/// Files are processed sequentially in request order. An upload without a filename is named as
/// if it were [`DEFAULT_UPLOAD_FILENAME`]. The transient copy of each upload is deleted as soon as
/// the engine has read it.
///
/// With [`FailurePolicy::Abort`] the first failing file's error is returned and later files are
/// not attempted. With [`FailurePolicy::Isolate`] failures are recorded in the report and the
/// schema document covers only the tables that were created.
///
/// When an observer is configured, this function reports:
///
/// - `on_stage` for every state transition of every file
/// - `on_success` once a file's table exists, with byte and column counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use table_ingest::engine::SqlContextConnection;
/// use table_ingest::ingestion::{handle, UploadOptions};
/// use table_ingest::types::RawUpload;
///
/// # fn main() -> Result<(), table_ingest::UploadError> {
/// let mut conn = SqlContextConnection::new();
/// let uploads = vec![RawUpload::from_path("sales.csv")?];
///
/// let report = handle(uploads, &mut conn, &UploadOptions::default())?;
/// println!("{}", report.tables_schema_xml());
/// # Ok(())
/// # }
/// ```
pub fn handle_with_tokens<C>(
    uploads: Vec<RawUpload>,
    conn: &mut C,
    options: &UploadOptions,
    tokens: &mut dyn TokenSource,
) -> UploadResult<UploadReport>
where
    C: EngineConnection + ?Sized,
{
    let filenames: Vec<Option<String>> = uploads
        .iter()
        .map(|u| u.filename().map(str::to_owned))
        .collect();
    let mut outcomes = Vec::with_capacity(uploads.len());

    for (index, mut upload) in uploads.into_iter().enumerate() {
        let mut ctx = UploadContext {
            index,
            filename: upload.filename().map(str::to_owned),
            table: None,
        };
        emit_stage(options, &ctx, FileStage::Pending);

        match process_file(&mut upload, &mut ctx, conn, options, tokens) {
            Ok((schema, stats)) => {
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_success(&ctx, stats);
                }
                emit_stage(options, &ctx, FileStage::Done);
                outcomes.push(FileOutcome::Loaded(schema));
            }
            Err(error) => {
                emit_stage(options, &ctx, FileStage::Failed);
                report_failure(options, &ctx, &error);
                match options.failure_policy {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::Isolate => outcomes.push(FileOutcome::Failed(FileFailure {
                        index,
                        filename: ctx.filename,
                        table: ctx.table,
                        error,
                    })),
                }
            }
        }
    }

    let loaded: Vec<TableSchema> = outcomes
        .iter()
        .filter_map(|o| match o {
            FileOutcome::Loaded(schema) => Some(schema.clone()),
            FileOutcome::Failed(_) => None,
        })
        .collect();
    let tables_schema_xml = schema_xml::serialize(&loaded)?;

    Ok(UploadReport {
        filenames,
        outcomes,
        tables_schema_xml,
    })
}

fn process_file<C>(
    upload: &mut RawUpload,
    ctx: &mut UploadContext,
    conn: &mut C,
    options: &UploadOptions,
    tokens: &mut dyn TokenSource,
) -> UploadResult<(TableSchema, UploadStats)>
where
    C: EngineConnection + ?Sized,
{
    let raw_name = upload.filename().unwrap_or(DEFAULT_UPLOAD_FILENAME);
    let table = generate_table_name(raw_name, tokens);
    ctx.table = Some(table.clone());
    emit_stage(options, ctx, FileStage::Named);

    let transient = stream::ingest(upload, &options.stream)?;
    let bytes = transient.bytes_written();
    emit_stage(options, ctx, FileStage::Ingested);

    let columns = loader::load(&table, transient.path(), conn)?;
    drop(transient);
    emit_stage(options, ctx, FileStage::SchemaLoaded);

    let stats = UploadStats {
        bytes,
        columns: columns.len(),
    };
    Ok((TableSchema::new(table, columns), stats))
}

fn emit_stage(options: &UploadOptions, ctx: &UploadContext, stage: FileStage) {
    if let Some(obs) = options.observer.as_ref() {
        obs.on_stage(ctx, stage);
    }
}

fn report_failure(options: &UploadOptions, ctx: &UploadContext, error: &UploadError) {
    if let Some(obs) = options.observer.as_ref() {
        let sev = severity_for_error(error);
        obs.on_failure(ctx, sev, error);
        if sev >= options.alert_at_or_above {
            obs.on_alert(ctx, sev, error);
        }
    }
}

fn severity_for_error(e: &UploadError) -> UploadSeverity {
    match e {
        UploadError::Storage(_) => UploadSeverity::Critical,
        UploadError::MalformedSource { .. } => UploadSeverity::Error,
        UploadError::TableExists { .. } => UploadSeverity::Error,
        UploadError::Engine(_) => UploadSeverity::Error,
        UploadError::Xml(_) => UploadSeverity::Error,
        UploadError::InvalidIdentifier { .. } => UploadSeverity::Error,
    }
}
