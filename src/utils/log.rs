// src/utils/log.rs

//! Console formatting helpers layered on the `log` facade.
//!
//! Level filtering and timestamps come from whichever logger the binary
//! installs; these helpers only shape headers and summary blocks.

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{border}");
    log::info!("  {title}");
    log::info!("{border}");
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("    {message}");
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {title}");
    for line in summary_lines(items) {
        log::info!("    {line}");
    }
}

/// Render summary rows the way [`summary`] prints them.
pub fn summary_lines(items: &[(&str, String)]) -> Vec<String> {
    items
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect()
}
