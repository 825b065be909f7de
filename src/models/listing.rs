//! Raw entries scraped from the archive listing page.

use serde::{Deserialize, Serialize};

/// One issue link on the listing page, before URL normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Value of the anchor's `title` attribute
    pub title: String,

    /// Thumbnail `src` of the anchor's first image
    pub image: String,

    /// Raw `href` attribute, usually site-relative
    pub href: String,
}

impl ListingEntry {
    pub fn new(
        title: impl Into<String>,
        image: impl Into<String>,
        href: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            image: image.into(),
            href: href.into(),
        }
    }
}
