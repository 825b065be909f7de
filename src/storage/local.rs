//! Local filesystem storage implementation.
//!
//! Files are streamed into `<name>.part` next to their final path and renamed
//! into place once the body is complete, so an interrupted or failed download
//! never leaves a truncated PDF behind.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::storage::ArchiveStorage;
use crate::utils::http::ByteStream;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &Path) -> PathBuf {
        self.root_dir.join(key)
    }

    fn part_path(path: &Path) -> PathBuf {
        let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".part");
        path.with_file_name(name)
    }

    async fn copy_stream(path: &Path, mut body: ByteStream) -> Result<u64> {
        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

#[async_trait]
impl ArchiveStorage for LocalStorage {
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(self.path(path)).await?;
        Ok(())
    }

    async fn write_stream(&self, path: &Path, body: ByteStream) -> Result<u64> {
        let path = self.path(path);
        let tmp = Self::part_path(&path);

        let result: Result<u64> = async {
            let written = Self::copy_stream(&tmp, body).await?;
            tokio::fs::rename(&tmp, &path).await?;
            Ok(written)
        }
        .await;

        if result.is_err() {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not remove {}: {}", tmp.display(), cleanup);
                }
            }
        }
        result
    }
}
