//! Storage abstractions for the downloaded archive.
//!
//! ## Directory Structure
//!
//! ```text
//! {output_dir}/
//! └── Vol. 32/                  # Volume title
//!     ├── No. 1/                # Issue title minus "Vol. 32, "
//!     │   ├── Cultivating the Garden of Eden.pdf
//!     │   └── ...
//!     └── No. 2/
//! ```

pub mod layout;
pub mod local;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::utils::http::ByteStream;

// Re-export for convenience
pub use layout::ArchiveLayout;
pub use local::LocalStorage;

/// Trait for archive storage backends.
///
/// Paths are relative to the backend's root.
#[async_trait]
pub trait ArchiveStorage: Send + Sync {
    /// Create a directory and its parents; an existing directory is not an error.
    async fn ensure_dir(&self, path: &Path) -> Result<()>;

    /// Stream a body into a file, replacing any previous file at `path`.
    ///
    /// Returns the number of bytes written. On error no file is left at `path`.
    async fn write_stream(&self, path: &Path, body: ByteStream) -> Result<u64>;
}
