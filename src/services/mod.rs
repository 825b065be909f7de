//! Service layer for the archiver.
//!
//! This module contains the business logic for:
//! - Issue discovery on the listing page (`IssueDiscoverer`)
//! - Article extraction from issue pages (`ArticleExtractor`)
//! - Catalogue assembly (`CatalogueAssembler`)
//! - PDF downloads (`ArchiveDownloader`)

mod assembler;
pub mod discovery;
mod downloader;
pub mod extractor;

pub use assembler::CatalogueAssembler;
pub use discovery::IssueDiscoverer;
pub use downloader::ArchiveDownloader;
pub use extractor::{ArticleExtractor, ArticleScanner, Extraction, LineMatch, ScanState};
