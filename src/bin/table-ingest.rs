use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use table_ingest::engine::{SqlContextConnection, SqlContextOptions};
use table_ingest::ingestion::{
    CompositeObserver, DEFAULT_CHUNK_SIZE, FailurePolicy, FileObserver, StreamOptions, TracingObserver, UploadObserver,
    UploadOptions, handle,
};
use table_ingest::types::RawUpload;

#[derive(Parser)]
#[command(name = "table-ingest")]
#[command(about = "Load CSV files as tables and print their inferred schemas")]
struct Args {
    /// CSV files to load, one table each
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Bytes read per chunk while copying each file
    #[arg(
        long,
        default_value_t = DEFAULT_CHUNK_SIZE,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    chunk_size: usize,

    /// Directory for transient copies (default: system temp dir)
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Keep going when a file fails instead of aborting
    #[arg(long)]
    isolate_failures: bool,

    /// Data rows scanned to infer column types
    #[arg(long, default_value_t = 100)]
    infer_schema_length: usize,

    /// Also append upload events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// SQL to run against the loaded tables afterwards
    #[arg(long)]
    query: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let uploads = args
        .files
        .iter()
        .map(|path| RawUpload::from_path(path).with_context(|| format!("opening {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    let mut observers: Vec<Arc<dyn UploadObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = &args.log_file {
        observers.push(Arc::new(FileObserver::new(path)));
    }

    let options = UploadOptions {
        stream: StreamOptions {
            chunk_size: args.chunk_size,
            temp_dir: args.temp_dir.clone(),
        },
        failure_policy: if args.isolate_failures {
            FailurePolicy::Isolate
        } else {
            FailurePolicy::Abort
        },
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        ..Default::default()
    };

    let mut conn = SqlContextConnection::with_options(SqlContextOptions {
        infer_schema_length: args.infer_schema_length,
        ..Default::default()
    });

    let report = handle(uploads, &mut conn, &options)?;
    info!(
        loaded = report.loaded().count(),
        failed = report.failures().count(),
        "upload finished"
    );

    if let Some(sql) = &args.query {
        let df = conn.query(sql).with_context(|| format!("running query: {sql}"))?;
        eprintln!("{df}");
    }

    println!("{}", report.into_response().to_json_pretty()?);
    Ok(())
}
