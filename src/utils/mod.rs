//! Utility functions and helpers.

pub mod http;
pub mod lines;
pub mod log;
pub mod url;

use std::time::Duration;

/// Sleep between sequential requests when a delay is configured.
pub async fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
