//! Filesystem store for downloadable documents

use bytes::Bytes;
use futures::future::BoxFuture;
use log::info;
use std::path::{Path, PathBuf};

use super::FileStore;
use crate::canonical::CanonicalUrl;
use crate::utils::download_path;

/// Writes each download to `<dir>/<sanitized last path segment>`
#[derive(Debug, Clone)]
pub struct FsFileStore {
    dir: PathBuf,
}

impl FsFileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write(&self, url: &CanonicalUrl, bytes: Bytes) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = download_path(&self.dir, url.as_url().path(), url.host());
        tokio::fs::write(&path, &bytes).await?;
        info!(
            target: "frontier::store",
            "Downloaded {url} to {} ({} bytes)",
            path.display(),
            bytes.len()
        );
        Ok(path)
    }
}

impl FileStore for FsFileStore {
    fn save<'a>(
        &'a self,
        url: &'a CanonicalUrl,
        bytes: Bytes,
    ) -> BoxFuture<'a, std::io::Result<PathBuf>> {
        Box::pin(self.write(url, bytes))
    }
}
