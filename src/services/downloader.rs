// src/services/downloader.rs

//! Archive download service.
//!
//! Walks the catalogue volume by volume, issue by issue, article by article,
//! and streams each PDF to disk before starting the next one.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::Result;
use crate::models::{Article, Catalogue, DownloadReport, FailedDownload};
use crate::storage::{ArchiveLayout, ArchiveStorage};
use crate::utils::{self, http::Fetch};

/// Service that materializes a catalogue on disk.
pub struct ArchiveDownloader<'a> {
    fetcher: &'a dyn Fetch,
    storage: &'a dyn ArchiveStorage,
    layout: ArchiveLayout,
    request_delay_ms: u64,
}

impl<'a> ArchiveDownloader<'a> {
    /// Create a new downloader.
    pub fn new(
        fetcher: &'a dyn Fetch,
        storage: &'a dyn ArchiveStorage,
        layout: ArchiveLayout,
    ) -> Self {
        Self {
            fetcher,
            storage,
            layout,
            request_delay_ms: 0,
        }
    }

    /// Pause between article downloads.
    pub fn with_request_delay(mut self, delay_ms: u64) -> Self {
        self.request_delay_ms = delay_ms;
        self
    }

    /// Download every article in catalogue order.
    ///
    /// Failures are recorded in the report and never stop the walk. A volume
    /// or issue whose directory cannot be created has all of its articles
    /// recorded as failed.
    pub async fn download_all(&self, catalogue: &Catalogue) -> DownloadReport {
        let mut report = DownloadReport::new();

        for volume in &catalogue.volumes {
            let volume_dir = self.layout.volume_dir(volume);
            if let Err(e) = self.storage.ensure_dir(&volume_dir).await {
                log::error!("Cannot create {}: {}", volume_dir.display(), e);
                report.directory_failures.push(volume_dir);
                for issue in &volume.issues {
                    let paths = self.layout.article_paths(volume, issue);
                    Self::record_skipped(&mut report, &issue.articles, paths, &e.to_string());
                }
                continue;
            }

            for issue in &volume.issues {
                let issue_dir = self.layout.issue_dir(volume, issue);
                let paths = self.layout.article_paths(volume, issue);

                if let Err(e) = self.storage.ensure_dir(&issue_dir).await {
                    log::error!("Cannot create {}: {}", issue_dir.display(), e);
                    report.directory_failures.push(issue_dir);
                    Self::record_skipped(&mut report, &issue.articles, paths, &e.to_string());
                    continue;
                }

                for (article, path) in issue.articles.iter().zip(paths) {
                    if report.attempted > 0 {
                        utils::pause(self.request_delay_ms).await;
                    }
                    report.attempted += 1;
                    log::info!("Downloading: {}", article.name);

                    match self.download_one(article, &path).await {
                        Ok(bytes) => {
                            log::debug!("Wrote {} bytes to {}", bytes, path.display());
                            report.downloaded += 1;
                            report.bytes_written += bytes;
                        }
                        Err(e) => {
                            log::error!("Error downloading {}: {}", article.pdf, e);
                            report.failures.push(FailedDownload {
                                path,
                                url: article.pdf.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        report.end_time = Utc::now();
        report
    }

    async fn download_one(&self, article: &Article, path: &Path) -> Result<u64> {
        let body = self.fetcher.fetch(&article.pdf).await?;
        self.storage.write_stream(path, body).await
    }

    fn record_skipped(
        report: &mut DownloadReport,
        articles: &[Article],
        paths: Vec<PathBuf>,
        reason: &str,
    ) {
        for (article, path) in articles.iter().zip(paths) {
            report.attempted += 1;
            report.failures.push(FailedDownload {
                path,
                url: article.pdf.clone(),
                reason: format!("directory not created: {reason}"),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::{StreamExt, stream};
    use tempfile::TempDir;

    use super::*;
    use crate::error::AppError;
    use crate::models::{Issue, Volume};
    use crate::storage::LocalStorage;
    use crate::utils::http::ByteStream;

    /// PDF bodies keyed by URL; unknown URLs fail like a 404.
    #[derive(Default)]
    struct FakeFiles {
        files: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeFiles {
        fn file(mut self, url: &str, body: &[u8]) -> Self {
            self.files.insert(url.to_string(), body.to_vec());
            self
        }
    }

    #[async_trait]
    impl Fetch for FakeFiles {
        async fn fetch(&self, url: &str) -> Result<ByteStream> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.files.get(url) {
                Some(body) => {
                    let chunks: Vec<Result<Vec<u8>>> =
                        body.chunks(3).map(|c| Ok(c.to_vec())).collect();
                    Ok(stream::iter(chunks).boxed())
                }
                None => Err(AppError::fetch(url, "HTTP status 404 Not Found")),
            }
        }
    }

    fn catalogue(articles: &[(&str, &str)]) -> Catalogue {
        let issue = Issue {
            title: "Vol. 32, No. 1".to_string(),
            image: String::new(),
            url: "https://j/issues/32-1/".to_string(),
            articles: articles.iter().map(|(n, u)| Article::new(*n, *u)).collect(),
        };
        let mut volume = Volume::new("Vol. 32");
        volume.issues.push(issue);
        Catalogue::new(vec![volume])
    }

    #[tokio::test]
    async fn test_failed_article_does_not_stop_walk() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let fetcher = FakeFiles::default()
            .file("https://cdn/1.pdf", b"first pdf")
            .file("https://cdn/3.pdf", b"third pdf");
        let catalogue = catalogue(&[
            ("One", "https://cdn/1.pdf"),
            ("Two", "https://cdn/2.pdf"),
            ("Three", "https://cdn/3.pdf"),
        ]);

        let report = ArchiveDownloader::new(&fetcher, &storage, ArchiveLayout::default())
            .download_all(&catalogue)
            .await;

        let issue_dir = tmp.path().join("Vol. 32").join("No. 1");
        assert_eq!(std::fs::read(issue_dir.join("One.pdf")).unwrap(), b"first pdf");
        assert!(!issue_dir.join("Two.pdf").exists());
        assert_eq!(std::fs::read(issue_dir.join("Three.pdf")).unwrap(), b"third pdf");

        assert_eq!(
            *fetcher.requests.lock().unwrap(),
            vec!["https://cdn/1.pdf", "https://cdn/2.pdf", "https://cdn/3.pdf"]
        );
        assert_eq!(report.attempted, 3);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.bytes_written, 18);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].url, "https://cdn/2.pdf");
        assert_eq!(report.failures[0].path, Path::new("Vol. 32/No. 1/Two.pdf"));
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_rerun_overwrites_existing_files() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let catalogue = catalogue(&[("One", "https://cdn/1.pdf")]);

        let old = FakeFiles::default().file("https://cdn/1.pdf", b"old");
        ArchiveDownloader::new(&old, &storage, ArchiveLayout::default())
            .download_all(&catalogue)
            .await;
        let new = FakeFiles::default().file("https://cdn/1.pdf", b"new version");
        let report = ArchiveDownloader::new(&new, &storage, ArchiveLayout::default())
            .download_all(&catalogue)
            .await;

        assert!(report.is_complete());
        let path = tmp.path().join("Vol. 32/No. 1/One.pdf");
        assert_eq!(std::fs::read(path).unwrap(), b"new version");
    }

    #[tokio::test]
    async fn test_directory_failure_is_contained() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the volume directory should go
        std::fs::write(tmp.path().join("Vol. 32"), b"not a directory").unwrap();
        let storage = LocalStorage::new(tmp.path());
        let fetcher = FakeFiles::default().file("https://cdn/1.pdf", b"pdf");

        let mut catalogue = catalogue(&[("One", "https://cdn/1.pdf")]);
        let mut other = Volume::new("Vol. 31");
        other.issues.push(Issue {
            title: "Vol. 31, No. 1".to_string(),
            image: String::new(),
            url: "https://j/issues/31-1/".to_string(),
            articles: vec![Article::new("Other", "https://cdn/1.pdf")],
        });
        catalogue.volumes.push(other);

        let report = ArchiveDownloader::new(&fetcher, &storage, ArchiveLayout::default())
            .download_all(&catalogue)
            .await;

        assert_eq!(report.directory_failures, vec![PathBuf::from("Vol. 32")]);
        assert_eq!(report.attempted, 2);
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.failed(), 1);
        assert!(tmp.path().join("Vol. 31/No. 1/Other.pdf").exists());
        assert_eq!(fetcher.requests.lock().unwrap().len(), 1);
    }
}
