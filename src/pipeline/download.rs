// src/pipeline/download.rs

//! Download pipeline: materialize a catalogue under the output directory.

use crate::error::Result;
use crate::models::{Catalogue, Config, DownloadReport};
use crate::services::ArchiveDownloader;
use crate::storage::{ArchiveLayout, ArchiveStorage};
use crate::utils::{self, http::Fetch};

/// Download every article of the catalogue, one at a time.
///
/// Returns the report even when some articles failed; callers decide how to
/// surface an incomplete run.
pub async fn run_download(
    config: &Config,
    fetcher: &dyn Fetch,
    storage: &dyn ArchiveStorage,
    catalogue: &Catalogue,
) -> Result<DownloadReport> {
    utils::log::header("Downloading archive");
    log::info!(
        "{} volumes, {} issues, {} articles",
        catalogue.volumes.len(),
        catalogue.issue_count(),
        catalogue.article_count()
    );

    let layout = ArchiveLayout::new(config.download.filenames);
    let downloader = ArchiveDownloader::new(fetcher, storage, layout)
        .with_request_delay(config.crawler.request_delay_ms);
    let report = downloader.download_all(catalogue).await;

    let elapsed = report.end_time - report.start_time;
    utils::log::summary(
        "Download",
        &[
            ("Attempted", report.attempted.to_string()),
            ("Downloaded", report.downloaded.to_string()),
            ("Failed", report.failed().to_string()),
            (
                "Directories failed",
                report.directory_failures.len().to_string(),
            ),
            ("Bytes written", report.bytes_written.to_string()),
            ("Elapsed", format!("{}s", elapsed.num_seconds())),
        ],
    );

    for failure in &report.failures {
        log::warn!(
            "    {} <- {}: {}",
            failure.path.display(),
            failure.url,
            failure.reason
        );
    }

    if report.is_complete() {
        log::info!("All PDFs have been downloaded.");
    }

    Ok(report)
}
