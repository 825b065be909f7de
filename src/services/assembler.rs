// src/services/assembler.rs

//! Catalogue assembly service.
//!
//! Runs the article extractor over every discovered issue, one at a time, and
//! attaches the results to the volume tree.

use chrono::Utc;

use crate::models::{AssemblyStats, Catalogue, Volume};
use crate::services::ArticleExtractor;
use crate::utils::{self, http::Fetch};

/// Service that fills discovered issues with their articles.
pub struct CatalogueAssembler<'a> {
    fetcher: &'a dyn Fetch,
    extractor: &'a ArticleExtractor,
    request_delay_ms: u64,
}

impl<'a> CatalogueAssembler<'a> {
    /// Create a new assembler.
    pub fn new(fetcher: &'a dyn Fetch, extractor: &'a ArticleExtractor) -> Self {
        Self {
            fetcher,
            extractor,
            request_delay_ms: 0,
        }
    }

    /// Pause between issue fetches.
    pub fn with_request_delay(mut self, delay_ms: u64) -> Self {
        self.request_delay_ms = delay_ms;
        self
    }

    /// Extract articles for every issue in order.
    ///
    /// A failed issue is logged and keeps an empty article list; it never
    /// stops the remaining issues.
    pub async fn assemble(&self, mut volumes: Vec<Volume>) -> (Catalogue, AssemblyStats) {
        let start_time = Utc::now();
        let mut issue_count = 0;
        let mut issue_failures = 0;
        let mut skipped_records = 0;

        for volume in &mut volumes {
            log::info!("Scanning {} ({} issues)", volume.title, volume.issues.len());

            for issue in &mut volume.issues {
                if issue_count > 0 {
                    utils::pause(self.request_delay_ms).await;
                }
                issue_count += 1;

                match self.extractor.extract(self.fetcher, &issue.url).await {
                    Ok(extraction) => {
                        log::info!(
                            "    {}: {} articles",
                            issue.title,
                            extraction.articles.len()
                        );
                        skipped_records += extraction.skipped;
                        issue.articles = extraction.articles;
                    }
                    Err(e) => {
                        log::error!("    {}: extraction failed: {}", issue.title, e);
                        issue_failures += 1;
                        issue.articles = Vec::new();
                    }
                }
            }
        }

        let catalogue = Catalogue {
            generated_at: Some(Utc::now()),
            volumes,
        };
        let stats = AssemblyStats {
            start_time,
            end_time: Utc::now(),
            issue_count,
            issue_failures,
            article_count: catalogue.article_count(),
            skipped_records,
        };

        (catalogue, stats)
    }
}
