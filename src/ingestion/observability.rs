use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::UploadError;
use crate::types::TableIdentifier;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the file failed).
    Error,
    /// Critical error (local storage failures).
    Critical,
}

/// Lifecycle of one file within a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStage {
    /// Received, nothing done yet.
    Pending,
    /// Table name generated.
    Named,
    /// Bytes copied to a transient file.
    Ingested,
    /// Table created and its columns read back.
    SchemaLoaded,
    /// Finished.
    Done,
    /// Gave up on this file.
    Failed,
}

/// Context about one file in an upload request.
#[derive(Debug, Clone)]
pub struct UploadContext {
    /// Zero-based position of the file in the request.
    pub index: usize,
    /// Filename as received.
    pub filename: Option<String>,
    /// Generated table name, once known.
    pub table: Option<TableIdentifier>,
}

impl UploadContext {
    fn label(&self) -> &str {
        self.filename.as_deref().unwrap_or("<unnamed>")
    }

    fn table_label(&self) -> &str {
        self.table.as_ref().map(|t| t.as_str()).unwrap_or("-")
    }
}

/// Minimal stats reported when a file is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadStats {
    /// Bytes streamed to the transient file.
    pub bytes: u64,
    /// Number of columns in the created table.
    pub columns: usize,
}

/// Observer interface for upload outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait UploadObserver: Send + Sync {
    /// Called on every state transition of a file.
    fn on_stage(&self, _ctx: &UploadContext, _stage: FileStage) {}

    /// Called when a file's table has been created and introspected.
    fn on_success(&self, _ctx: &UploadContext, _stats: UploadStats) {}

    /// Called when a file fails.
    fn on_failure(&self, _ctx: &UploadContext, _severity: UploadSeverity, _error: &UploadError) {}

    /// Called when a failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn UploadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn UploadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl UploadObserver for CompositeObserver {
    fn on_stage(&self, ctx: &UploadContext, stage: FileStage) {
        for o in &self.observers {
            o.on_stage(ctx, stage);
        }
    }

    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs upload events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl UploadObserver for StdErrObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        eprintln!(
            "[upload][ok] file={} table={} bytes={} columns={}",
            ctx.label(),
            ctx.table_label(),
            stats.bytes,
            stats.columns
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        eprintln!(
            "[upload][{:?}] file={} table={} err={}",
            severity,
            ctx.label(),
            ctx.table_label(),
            error
        );
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        eprintln!(
            "[ALERT][upload][{:?}] file={} table={} err={}",
            severity,
            ctx.label(),
            ctx.table_label(),
            error
        );
    }
}

/// Forwards upload events to [`tracing`].
///
/// Stage transitions are emitted at `debug`, successes at `info`, failures at `warn` and alerts
/// at `error`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl UploadObserver for TracingObserver {
    fn on_stage(&self, ctx: &UploadContext, stage: FileStage) {
        tracing::debug!(index = ctx.index, file = ctx.label(), table = ctx.table_label(), ?stage, "upload stage");
    }

    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        tracing::info!(
            index = ctx.index,
            file = ctx.label(),
            table = ctx.table_label(),
            bytes = stats.bytes,
            columns = stats.columns,
            "table created"
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        tracing::warn!(
            index = ctx.index,
            file = ctx.label(),
            table = ctx.table_label(),
            ?severity,
            %error,
            "upload failed"
        );
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        tracing::error!(
            index = ctx.index,
            file = ctx.label(),
            table = ctx.table_label(),
            ?severity,
            %error,
            "upload alert"
        );
    }
}

/// Appends upload events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl UploadObserver for FileObserver {
    fn on_success(&self, ctx: &UploadContext, stats: UploadStats) {
        self.append_line(&format!(
            "{} ok file={} table={} bytes={} columns={}",
            unix_ts(),
            ctx.label(),
            ctx.table_label(),
            stats.bytes,
            stats.columns
        ));
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        self.append_line(&format!(
            "{} fail severity={:?} file={} table={} err={}",
            unix_ts(),
            severity,
            ctx.label(),
            ctx.table_label(),
            error
        ));
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} file={} table={} err={}",
            unix_ts(),
            severity,
            ctx.label(),
            ctx.table_label(),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
