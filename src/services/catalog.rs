//! Group listing and search over one bucket of a classified playlist

use serde::Deserialize;
use std::collections::HashSet;

use crate::models::PlaylistEntry;

/// Filter for a catalog listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    /// Case-insensitive substring matched against entry names
    #[serde(default)]
    pub term: String,
    /// Exact group name; `None` means all groups
    pub group: Option<String>,
}

impl CatalogQuery {
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            group: None,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Distinct groups in first-seen order
pub fn groups(entries: &[PlaylistEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert(entry.group.as_str()))
        .map(|entry| entry.group.clone())
        .collect()
}

/// Entries matching the query, in source order
pub fn search<'a>(entries: &'a [PlaylistEntry], query: &CatalogQuery) -> Vec<&'a PlaylistEntry> {
    let term = query.term.trim().to_lowercase();

    entries
        .iter()
        .filter(|entry| match &query.group {
            Some(group) => &entry.group == group,
            None => true,
        })
        .filter(|entry| term.is_empty() || entry.name.to_lowercase().contains(&term))
        .collect()
}
