// src/pipeline/catalogue.rs

//! Catalogue building pipeline: listing discovery, then per-issue extraction.

use crate::error::Result;
use crate::models::{AssemblyStats, Catalogue, Config};
use crate::services::{ArticleExtractor, CatalogueAssembler, IssueDiscoverer};
use crate::utils::{self, http::HttpFetcher};

/// Discover every issue and extract its articles.
///
/// Only a failed listing page is fatal; issue pages that cannot be scanned
/// are counted in the returned stats.
pub async fn run_catalogue(
    config: &Config,
    fetcher: &HttpFetcher,
) -> Result<(Catalogue, AssemblyStats)> {
    utils::log::header("Building catalogue");

    // Compile patterns before any network traffic
    let extractor = ArticleExtractor::new(&config.extraction)?;

    utils::log::step(1, 2, "Discovering issues on the listing page");
    let discoverer = IssueDiscoverer::new(fetcher.client(), &config.discovery);
    let volumes = discoverer.discover().await?;
    log::info!(
        "Grouped into {} volumes with {} issues",
        volumes.len(),
        volumes.iter().map(|v| v.issues.len()).sum::<usize>()
    );

    utils::log::step(2, 2, "Extracting articles from issue pages");
    let assembler = CatalogueAssembler::new(fetcher, &extractor)
        .with_request_delay(config.crawler.request_delay_ms);
    let (catalogue, stats) = assembler.assemble(volumes).await;

    let elapsed = stats.end_time - stats.start_time;
    utils::log::summary(
        "Catalogue",
        &[
            ("Volumes", catalogue.volumes.len().to_string()),
            ("Issues", stats.issue_count.to_string()),
            ("Issues failed", stats.issue_failures.to_string()),
            ("Articles", stats.article_count.to_string()),
            ("Records skipped", stats.skipped_records.to_string()),
            ("Elapsed", format!("{}s", elapsed.num_seconds())),
        ],
    );

    if stats.issue_failures > 0 {
        log::warn!(
            "{} of {} issues could not be scanned and have no articles",
            stats.issue_failures,
            stats.issue_count
        );
    }

    Ok((catalogue, stats))
}
