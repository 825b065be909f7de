// src/utils/log.rs

//! Run banners and summaries on top of the `log` facade.
//!
//! Plain messages go through `log::info!` and friends directly; these helpers
//! only give multi-line output a consistent shape.

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("{}", format_step(step_num, total, message));
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        log::info!("    {}: {}", key, value);
    }
}

fn format_step(step_num: usize, total: usize, message: &str) -> String {
    format!("[STEP {}/{}] {}", step_num, total, message)
}
