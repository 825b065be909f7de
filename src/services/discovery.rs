// src/services/discovery.rs

//! Issue discovery service.
//!
//! Reads the archive listing page and groups issue links into volumes.

use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{DiscoveryConfig, Issue, ListingEntry, Volume, volume_key};
use crate::utils::http::fetch_page;
use crate::utils::url::issue_url;

/// Service for discovering issues on the archive listing page.
pub struct IssueDiscoverer<'a> {
    client: &'a Client,
    config: DiscoveryConfig,
}

impl<'a> IssueDiscoverer<'a> {
    /// Create a new issue discoverer.
    pub fn new(client: &'a Client, config: &DiscoveryConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    /// Fetch the listing page and return its issues grouped by volume.
    pub async fn discover(&self) -> Result<Vec<Volume>> {
        let document = fetch_page(self.client, &self.config.listing_url).await?;
        let entries = parse_listing(&document, &self.config.issue_selector)?;
        log::info!(
            "Found {} issue links on {}",
            entries.len(),
            self.config.listing_url
        );

        Ok(group_issues(
            entries,
            self.config.base(),
            &self.config.strip_segment,
        ))
    }
}

/// Pull `{title, image, href}` out of every anchor matching `selector`.
///
/// Anchors without a `title` or `href` attribute are skipped.
pub fn parse_listing(document: &Html, selector: &str) -> Result<Vec<ListingEntry>> {
    let anchor_sel = parse_selector(selector)?;
    let image_sel = parse_selector("img")?;

    let entries = document
        .select(&anchor_sel)
        .filter_map(|anchor| {
            let element = anchor.value();
            let (Some(title), Some(href)) = (element.attr("title"), element.attr("href")) else {
                log::debug!("Skipping listing anchor without title/href");
                return None;
            };
            let image = anchor
                .select(&image_sel)
                .next()
                .and_then(|img| img.value().attr("src"))
                .unwrap_or_default();
            Some(ListingEntry::new(title, image, href))
        })
        .collect();

    Ok(entries)
}

/// Bucket listing entries into volumes keyed by the title prefix before the
/// first comma.
///
/// Volumes appear in order of their first issue; issues keep listing order.
pub fn group_issues(entries: Vec<ListingEntry>, base: &str, strip_segment: &str) -> Vec<Volume> {
    let mut volumes: Vec<Volume> = Vec::new();

    for entry in entries {
        if !entry.title.contains(',') {
            log::warn!(
                "Issue title '{}' has no volume prefix; using the whole title",
                entry.title
            );
        }

        let key = volume_key(&entry.title).to_string();
        let issue = Issue {
            url: issue_url(base, &entry.href, strip_segment),
            title: entry.title,
            image: entry.image,
            articles: Vec::new(),
        };

        match volumes.iter_mut().find(|v| v.title == key) {
            Some(volume) => volume.issues.push(issue),
            None => {
                let mut volume = Volume::new(key);
                volume.issues.push(issue);
                volumes.push(volume);
            }
        }
    }

    volumes
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
