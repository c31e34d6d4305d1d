use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name used when an EXTINF line carries no title
pub const DEFAULT_ENTRY_NAME: &str = "unnamed channel";

/// Group used when an EXTINF line carries no group-title
pub const DEFAULT_GROUP: &str = "uncategorized";

/// Media type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Channel,
    Movie,
    Series,
}

impl Default for MediaKind {
    fn default() -> Self {
        Self::Channel
    }
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Channel, MediaKind::Movie, MediaKind::Series];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Channel => "channel",
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "channel" | "channels" | "live" => Ok(MediaKind::Channel),
            "movie" | "movies" => Ok(MediaKind::Movie),
            "series" => Ok(MediaKind::Series),
            other => Err(format!("unknown media kind: {}", other)),
        }
    }
}

/// Single playlist entry (channel/movie/episode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub id: String,
    pub name: String,
    pub group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub url: String,
    pub kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epg_id: Option<String>,
}

/// Playlist split into one ordered bucket per media kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedPlaylist {
    pub channels: Vec<PlaylistEntry>,
    pub movies: Vec<PlaylistEntry>,
    pub series: Vec<PlaylistEntry>,
}

impl ClassifiedPlaylist {
    /// Append an entry to the bucket matching its kind
    pub fn push(&mut self, entry: PlaylistEntry) {
        self.bucket_mut(entry.kind).push(entry);
    }

    pub fn bucket(&self, kind: MediaKind) -> &[PlaylistEntry] {
        match kind {
            MediaKind::Channel => &self.channels,
            MediaKind::Movie => &self.movies,
            MediaKind::Series => &self.series,
        }
    }

    fn bucket_mut(&mut self, kind: MediaKind) -> &mut Vec<PlaylistEntry> {
        match kind {
            MediaKind::Channel => &mut self.channels,
            MediaKind::Movie => &mut self.movies,
            MediaKind::Series => &mut self.series,
        }
    }

    /// True when no bucket holds a playable entry
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.movies.is_empty() && self.series.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channels.len() + self.movies.len() + self.series.len()
    }

    /// All entries, bucket by bucket (channels, movies, series)
    pub fn entries(&self) -> impl Iterator<Item = &PlaylistEntry> {
        self.channels.iter().chain(self.movies.iter()).chain(self.series.iter())
    }

    pub fn find(&self, id: &str) -> Option<&PlaylistEntry> {
        self.entries().find(|entry| entry.id == id)
    }

    pub fn stats(&self) -> PlaylistStats {
        let group_count = self
            .entries()
            .map(|entry| entry.group.as_str())
            .collect::<HashSet<_>>()
            .len();

        PlaylistStats {
            total_items: self.len(),
            channel_count: self.channels.len(),
            movie_count: self.movies.len(),
            series_count: self.series.len(),
            group_count,
        }
    }
}

/// Playlist statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStats {
    pub total_items: usize,
    pub channel_count: usize,
    pub movie_count: usize,
    pub series_count: usize,
    pub group_count: usize,
}

impl std::fmt::Display for PlaylistStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} channels, {} movies, {} series",
            self.channel_count, self.movie_count, self.series_count
        )
    }
}

/// Parsing options
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    /// Collapse runs of whitespace in names and groups
    #[serde(default = "default_true")]
    pub normalize: bool,
    /// Drop entries whose stream URL was already emitted
    #[serde(default)]
    pub remove_duplicates: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            remove_duplicates: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Request to parse a playlist, either by URL or inline content
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub options: ParseOptions,
}

/// Parse response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub success: bool,
    pub fingerprint: String,
    pub stats: PlaylistStats,
    pub playlist: ClassifiedPlaylist,
    pub parsed_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, group: &str, kind: MediaKind) -> PlaylistEntry {
        PlaylistEntry {
            id: id.to_string(),
            name: format!("Item {}", id),
            group: group.to_string(),
            logo: None,
            url: format!("http://cdn/{}.ts", id),
            kind,
            epg_id: None,
        }
    }

    #[test]
    fn test_push_routes_to_bucket() {
        let mut playlist = ClassifiedPlaylist::default();
        playlist.push(entry("1", "Abertos", MediaKind::Channel));
        playlist.push(entry("2", "Filmes", MediaKind::Movie));
        playlist.push(entry("3", "Abertos", MediaKind::Channel));

        assert_eq!(playlist.channels.len(), 2);
        assert_eq!(playlist.movies.len(), 1);
        assert!(playlist.series.is_empty());
        assert_eq!(playlist.bucket(MediaKind::Channel)[1].id, "3");
        assert_eq!(playlist.find("2").map(|e| e.kind), Some(MediaKind::Movie));
    }

    #[test]
    fn test_stats_counts_distinct_groups() {
        let mut playlist = ClassifiedPlaylist::default();
        playlist.push(entry("1", "Abertos", MediaKind::Channel));
        playlist.push(entry("2", "Abertos", MediaKind::Channel));
        playlist.push(entry("3", "Series", MediaKind::Series));

        let stats = playlist.stats();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.channel_count, 2);
        assert_eq!(stats.series_count, 1);
        assert_eq!(stats.group_count, 2);
        assert_eq!(stats.to_string(), "2 channels, 0 movies, 1 series");
    }

    #[test]
    fn test_media_kind_serde() {
        let json = serde_json::to_string(&MediaKind::Movie).unwrap();
        assert_eq!(json, "\"movie\"");
        assert_eq!("Series".parse::<MediaKind>(), Ok(MediaKind::Series));
        assert!("radio".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let mut e = entry("9", "Abertos", MediaKind::Channel);
        e.epg_id = Some("globo".to_string());
        let value = serde_json::to_value(&e).unwrap();
        assert_eq!(value["epgId"], "globo");
        assert_eq!(value["kind"], "channel");
        assert!(value.get("logo").is_none());
    }
}
