//! Pipeline entry points for archiver operations.
//!
//! - `run_catalogue`: Discover issues and extract their articles
//! - `run_download`: Download every article PDF of a catalogue
//! - `run_pipeline`: Both, in order

pub mod catalogue;
pub mod download;
#[allow(clippy::module_inception)]
pub mod pipeline;

pub use catalogue::run_catalogue;
pub use download::run_download;
pub use pipeline::{PipelineReport, run_pipeline};
