//! Streaming an upload into a transient file.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::UploadResult;
use crate::types::RawUpload;

/// Default read size when copying uploads: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Options for [`ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// Bytes read from the upload per call. Peak memory is one chunk.
    pub chunk_size: usize,
    /// Directory for transient files. `None` uses the platform temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            temp_dir: None,
        }
    }
}

/// A copy of an upload on local storage.
///
/// The file is removed when this value is dropped, whichever way the owning scope exits.
#[derive(Debug)]
pub struct TransientFile {
    file: NamedTempFile,
    bytes_written: u64,
}

impl TransientFile {
    /// Path the engine should read from.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of bytes copied from the upload.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

/// Copy an upload's bytes into a new transient file, one chunk at a time.
///
/// The stream is rewound to its start first, so partially consumed uploads are copied in full.
/// Reading stops at the first zero-length read. The file is flushed and synced before returning
/// so out-of-process readers that open it by path see every byte.
///
/// A `chunk_size` of zero is rejected as [`ErrorKind::InvalidInput`] before any file is created.
pub fn ingest(upload: &mut RawUpload, options: &StreamOptions) -> UploadResult<TransientFile> {
    if options.chunk_size == 0 {
        return Err(io::Error::new(ErrorKind::InvalidInput, "chunk_size must be > 0").into());
    }

    let mut builder = tempfile::Builder::new();
    builder.prefix("upload-").suffix(".csv");
    let mut file = match &options.temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };

    let stream = upload.stream_mut();
    stream.seek(SeekFrom::Start(0))?;
    let bytes_written = copy_chunked(stream, file.as_file_mut(), options.chunk_size)?;

    file.as_file_mut().flush()?;
    file.as_file().sync_all()?;

    Ok(TransientFile {
        file,
        bytes_written,
    })
}

fn copy_chunked<R, W>(reader: &mut R, writer: &mut W, chunk_size: usize) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}
