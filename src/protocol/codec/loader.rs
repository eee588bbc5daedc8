//! Deferred large object loading.

use std::future::Future;
use std::path::{Path, PathBuf};

use log::trace;

use crate::error::Result;
use crate::protocol::constants::DEFAULT_MAX_INLINE_LOB_LEN;
use crate::protocol::types::{BlobRef, ClobRef, ExternalLob};

use super::jdbc::RowSource;

/// Materializes CLOB and BLOB columns from a retained result row.
///
/// A loader is driven by `load_deferred` after a record has been read, once per
/// LOB column. Implementations decide whether a payload is kept inline or
/// staged somewhere else and referenced.
pub trait LobLoader {
    /// Load the CLOB at `ordinal`. Returns `Ok(None)` for SQL NULL.
    fn read_clob(
        &mut self,
        ordinal: usize,
        cursor: &dyn RowSource,
    ) -> impl Future<Output = Result<Option<ClobRef>>> + Send;

    /// Load the BLOB at `ordinal`. Returns `Ok(None)` for SQL NULL.
    fn read_blob(
        &mut self,
        ordinal: usize,
        cursor: &dyn RowSource,
    ) -> impl Future<Output = Result<Option<BlobRef>>> + Send;
}

/// Loader that keeps small objects inline and writes large ones to files.
///
/// Objects longer than the inline limit are written to
/// `<dir>/large_obj_<n>.clob` (or `.blob`) and referenced as
/// `externalLob(lf,<path>,0,<length>)`. The file counter belongs to the loader
/// instance.
///
/// # Example
///
/// ```no_run
/// use sql_record_rs::StagingLobLoader;
///
/// let loader = StagingLobLoader::new("/tmp/lobs").with_inline_limit(1024 * 1024);
/// assert_eq!(loader.inline_limit(), 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct StagingLobLoader {
    dir: PathBuf,
    inline_limit: u64,
    next_file: u64,
}

impl StagingLobLoader {
    /// Create a loader staging into `dir` with the default 16 MiB inline limit.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            inline_limit: DEFAULT_MAX_INLINE_LOB_LEN,
            next_file: 0,
        }
    }

    /// Set the largest payload kept inline.
    pub fn with_inline_limit(mut self, limit: u64) -> Self {
        self.inline_limit = limit;
        self
    }

    /// Largest payload kept inline.
    pub fn inline_limit(&self) -> u64 {
        self.inline_limit
    }

    /// Staging directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn stage(&mut self, extension: &str, payload: &[u8]) -> Result<ExternalLob> {
        let path = self
            .dir
            .join(format!("large_obj_{}.{}", self.next_file, extension));
        self.next_file += 1;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, payload).await?;
        trace!("Staged {} byte large object to {}", payload.len(), path.display());

        Ok(ExternalLob::new(
            path.to_string_lossy().into_owned(),
            0,
            payload.len() as u64,
        ))
    }
}

impl LobLoader for StagingLobLoader {
    async fn read_clob(&mut self, ordinal: usize, cursor: &dyn RowSource) -> Result<Option<ClobRef>> {
        let Some(data) = cursor.get_clob_data(ordinal)? else {
            return Ok(None);
        };
        if data.len() as u64 <= self.inline_limit {
            return Ok(Some(ClobRef::Inline(data)));
        }
        let lob = self.stage("clob", data.as_bytes()).await?;
        Ok(Some(ClobRef::External(lob)))
    }

    async fn read_blob(&mut self, ordinal: usize, cursor: &dyn RowSource) -> Result<Option<BlobRef>> {
        let Some(data) = cursor.get_blob_data(ordinal)? else {
            return Ok(None);
        };
        if data.len() as u64 <= self.inline_limit {
            return Ok(Some(BlobRef::Inline(data)));
        }
        let lob = self.stage("blob", &data).await?;
        Ok(Some(BlobRef::External(lob)))
    }
}
