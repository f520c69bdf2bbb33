use crate::types::{ClassifierError, DatasetSpec, Result};
use std::path::Path;
use tracing::debug;

/// Reads the image URLs listed in a dataset's CSV source.
pub fn load_urls(dataset: &DatasetSpec) -> Result<Vec<String>> {
    load_urls_from_csv(&dataset.source)
}

pub fn load_urls_from_csv(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path).map_err(|source| ClassifierError::DatasetLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let urls = parse_url_list(&raw);
    debug!("Read {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

/// One URL per line; an optional `url` header is skipped, surrounding quotes
/// are removed and blank lines ignored.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let data_lines = match lines.first() {
        Some(first) if is_header(first) => &lines[1..],
        _ => &lines[..],
    };

    data_lines
        .iter()
        .map(|line| unquote(line).trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn is_header(line: &str) -> bool {
    line.replace('"', "").to_lowercase() == "url"
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
