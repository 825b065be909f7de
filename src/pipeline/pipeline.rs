// src/pipeline/pipeline.rs

use std::path::Path;

use crate::error::Result;
use crate::models::{AssemblyStats, Catalogue, Config, DownloadReport};
use crate::storage::ArchiveStorage;
use crate::utils::{self, http::HttpFetcher};

use super::catalogue::run_catalogue;
use super::download::run_download;

/// Outcome of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// `None` when an existing catalogue was reused
    pub assembly: Option<AssemblyStats>,
    pub download: DownloadReport,
}

impl PipelineReport {
    /// Number of issues and articles that failed across both stages.
    pub fn failed(&self) -> usize {
        let issues = self.assembly.as_ref().map_or(0, |s| s.issue_failures);
        issues + self.download.failed()
    }

    pub fn total(&self) -> usize {
        let issues = self.assembly.as_ref().map_or(0, |s| s.issue_count);
        issues + self.download.attempted
    }

    pub fn is_complete(&self) -> bool {
        self.failed() == 0 && self.download.is_complete()
    }
}

/// Run the full pipeline: build (or load) the catalogue, then download it.
///
/// A freshly built catalogue is saved to `catalogue_path` before downloading.
pub async fn run_pipeline(
    config: &Config,
    fetcher: &HttpFetcher,
    storage: &dyn ArchiveStorage,
    catalogue_path: &Path,
    skip_catalogue: bool,
) -> Result<PipelineReport> {
    utils::log::header("Running full pipeline");

    let (catalogue, assembly) = if skip_catalogue {
        utils::log::step(1, 2, "Catalogue - Loading existing catalogue");
        (Catalogue::load(catalogue_path)?, None)
    } else {
        utils::log::step(1, 2, "Catalogue - Discovering issues and articles");
        let (catalogue, stats) = run_catalogue(config, fetcher).await?;
        catalogue.save(catalogue_path)?;
        log::info!("Catalogue saved to {}", catalogue_path.display());
        (catalogue, Some(stats))
    };

    utils::log::step(2, 2, "Download - Fetching article PDFs");
    let download = run_download(config, fetcher, storage, &catalogue).await?;

    Ok(PipelineReport { assembly, download })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::FailedDownload;

    fn stats(issue_count: usize, issue_failures: usize) -> AssemblyStats {
        AssemblyStats {
            start_time: Utc::now(),
            end_time: Utc::now(),
            issue_count,
            issue_failures,
            article_count: 0,
            skipped_records: 0,
        }
    }

    #[test]
    fn test_report_counts_both_stages() {
        let mut download = DownloadReport::new();
        download.attempted = 4;
        download.failures.push(FailedDownload {
            path: "Vol. 1/No. 1/A.pdf".into(),
            url: "https://example.com/a.pdf".to_string(),
            reason: "HTTP status 404 Not Found".to_string(),
        });

        let report = PipelineReport {
            assembly: Some(stats(3, 1)),
            download,
        };
        assert_eq!(report.failed(), 2);
        assert_eq!(report.total(), 7);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_reused_catalogue_counts_downloads_only() {
        let report = PipelineReport {
            assembly: None,
            download: DownloadReport::new(),
        };
        assert_eq!(report.total(), 0);
        assert!(report.is_complete());
    }
}
