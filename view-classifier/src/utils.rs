/// Percentage of `part` in `total` formatted with two decimals; `0.00` when `total` is zero.
pub fn format_accuracy(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", part as f64 / total as f64 * 100.0)
}

/// URL utilities
pub mod url {
    use url::Url;

    /// Short name for an image locator: the last non-empty path segment, or
    /// the whole locator when it is not a URL or has no path.
    pub fn file_name(locator: &str) -> String {
        Url::parse(locator)
            .ok()
            .and_then(|url| {
                url.path_segments()?
                    .filter(|segment| !segment.is_empty())
                    .last()
                    .map(|segment| segment.to_string())
            })
            .unwrap_or_else(|| locator.to_string())
    }
}
