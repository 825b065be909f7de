// src/models/mod.rs

//! Domain models for the archiver.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod catalogue;
mod config;
mod listing;
mod report;

// Re-export all public types
pub use catalogue::{Article, Catalogue, Issue, Volume, volume_key};
pub use config::{
    Config, CrawlerConfig, DiscoveryConfig, DownloadConfig, ExtractionConfig, FilenamePolicy,
    MismatchPolicy,
};
pub use listing::ListingEntry;
pub use report::{AssemblyStats, DownloadReport, FailedDownload};
