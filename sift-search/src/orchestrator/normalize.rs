//! Turn raw backend items into attributed, positioned results.

use crate::types::{SearchItem, SearchResult};

/// Normalize one backend's items, keeping the backend's order.
///
/// Positions are 1-based. A missing or blank title becomes
/// `"Result {position}"`; a missing description becomes empty.
pub fn normalize_items(items: Vec<SearchItem>, source: &str) -> Vec<SearchResult> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let position = index + 1;
            let title = item
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| format!("Result {position}"));
            SearchResult {
                position,
                url: item.url,
                title,
                description: item.description.unwrap_or_default(),
                source: source.to_owned(),
            }
        })
        .collect()
}
