//! Upload pipeline entrypoints and stages.
//!
//! Most callers should use [`handle`] (from [`orchestrator`]) which:
//!
//! - names, streams and loads every upload of a request, in order
//! - renders the loaded schemas as XML ([`crate::schema_xml`])
//! - optionally reports stage transitions, success, failure and alerts to an [`UploadObserver`]
//!
//! The individual stages are also available under:
//! - [`stream`]
//! - [`loader`]

pub mod loader;
pub mod observability;
pub mod orchestrator;
pub mod stream;

pub use loader::load;
pub use observability::{
    CompositeObserver, FileObserver, FileStage, StdErrObserver, TracingObserver, UploadContext, UploadObserver,
    UploadSeverity, UploadStats,
};
pub use orchestrator::{
    FailurePolicy, FileFailure, FileOutcome, UploadOptions, UploadReport, handle, handle_with_tokens,
};
pub use stream::{DEFAULT_CHUNK_SIZE, StreamOptions, TransientFile, ingest};
