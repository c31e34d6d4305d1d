use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::models::{
    ClassifiedPlaylist, ParseOptions, PlaylistEntry, DEFAULT_ENTRY_NAME, DEFAULT_GROUP,
};
use crate::services::classifier::ContentClassifier;

/// Playlist header marker
pub const HEADER_MARKER: &str = "#EXTM3U";

/// Metadata line marker
pub const EXTINF_MARKER: &str = "#EXTINF:";

lazy_static! {
    /// Regex to normalize multiple whitespaces into single space
    static ref MULTI_SPACE_REGEX: Regex = Regex::new(r"\s{2,}").unwrap();
    /// Regex to parse EXTINF attributes (tvg-id="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).unwrap();
    /// Duration token that may precede the first attribute ("-1 ", "10.5,")
    static ref DURATION_PREFIX_REGEX: Regex = Regex::new(r"^\s*(?:-?\d+(?:\.\d+)?)?\s*,?\s*$").unwrap();
}

/// Parsed EXTINF line data
#[derive(Debug, Default)]
struct ExtinfData {
    attributes: HashMap<String, String>,
    title: Option<String>,
}

impl ExtinfData {
    /// Attribute value, treating an empty value as absent
    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Pending entry built from the most recent EXTINF line
#[derive(Debug)]
struct PendingEntry {
    name: String,
    group: String,
    logo: Option<String>,
    epg_id: Option<String>,
}

/// Generate a unique item ID based on URL and index
fn generate_item_id(url: &str, index: usize) -> String {
    let hash: i32 = url.chars().fold(0, |acc, c| {
        ((acc << 5).wrapping_sub(acc)).wrapping_add(c as i32)
    });
    format!("item_{}_{}", hash.unsigned_abs(), index)
}

/// Parse an EXTINF line
///
/// Accepts both layouts seen in the wild:
/// `#EXTINF:-1 tvg-logo="..." group-title="...",Title` and
/// `#EXTINF:-1,tvg-logo="..." group-title="...",Title`.
///
/// Attributes are read left to right and only count while they directly
/// follow the duration or another attribute. The title starts after the first
/// comma past the last such attribute, so commas inside quoted values never
/// split the line and `key="value"` text inside the title stays in the title.
fn parse_extinf(line: &str) -> Option<ExtinfData> {
    let content = line.strip_prefix(EXTINF_MARKER)?;

    let mut attributes = HashMap::new();
    let mut attrs_end = 0;

    for caps in ATTR_REGEX.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        let gap = &content[attrs_end..whole.start()];
        let leading = if attrs_end == 0 {
            DURATION_PREFIX_REGEX.is_match(gap)
        } else {
            gap.trim().is_empty()
        };
        if !leading {
            break;
        }

        let key = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
        let value = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        attributes.insert(key, value);
        attrs_end = whole.end();
    }

    let title = content[attrs_end..]
        .find(',')
        .map(|offset| content[attrs_end + offset + 1..].trim().to_string());

    Some(ExtinfData {
        attributes,
        title: title.filter(|t| !t.is_empty()),
    })
}

/// Normalize text: trim and collapse multiple spaces into single space
fn normalize_text(text: &str) -> String {
    let trimmed = text.trim();
    MULTI_SPACE_REGEX.replace_all(trimmed, " ").to_string()
}

/// Generate URL hash for deduplication (shorter than keeping every URL)
fn url_dedup_hash(url: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    url.hash(&mut hasher);
    hasher.finish()
}

fn pending_from_extinf(extinf: ExtinfData, options: &ParseOptions) -> PendingEntry {
    let clean = |text: &str| {
        if options.normalize {
            normalize_text(text)
        } else {
            text.trim().to_string()
        }
    };

    PendingEntry {
        name: extinf
            .title
            .as_deref()
            .map(clean)
            .unwrap_or_else(|| DEFAULT_ENTRY_NAME.to_string()),
        group: extinf
            .attr("group-title")
            .map(clean)
            .unwrap_or_else(|| DEFAULT_GROUP.to_string()),
        logo: extinf.attr("tvg-logo").map(str::to_string),
        epg_id: extinf.attr("tvg-id").map(str::to_string),
    }
}

/// Format sniffing used by callers before parsing.
///
/// True when the text carries the header or at least one metadata line.
pub fn looks_like_playlist(text: &str) -> bool {
    text.contains(HEADER_MARKER) || text.contains(EXTINF_MARKER)
}

/// Parse playlist text with default options
pub fn parse(text: &str) -> ClassifiedPlaylist {
    parse_with_options(text, &ParseOptions::default())
}

/// Parse playlist text into classified buckets.
///
/// Never fails: malformed lines are skipped, URL lines without a preceding
/// EXTINF are dropped, and an EXTINF followed by another EXTINF is discarded.
pub fn parse_with_options(text: &str, options: &ParseOptions) -> ClassifiedPlaylist {
    let mut playlist = ClassifiedPlaylist::default();
    let mut pending: Option<PendingEntry> = None;
    let mut item_index = 0usize;

    let mut seen_urls: HashSet<u64> = HashSet::new();
    let mut duplicates_skipped = 0usize;
    let mut orphans_skipped = 0usize;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with(EXTINF_MARKER) {
            pending = parse_extinf(trimmed).map(|extinf| pending_from_extinf(extinf, options));
            continue;
        }

        // Header, comments and unknown directives
        if trimmed.starts_with('#') {
            continue;
        }

        if !trimmed.starts_with("http") {
            continue;
        }

        let Some(entry) = pending.take() else {
            orphans_skipped += 1;
            continue;
        };

        if options.remove_duplicates && !seen_urls.insert(url_dedup_hash(trimmed)) {
            duplicates_skipped += 1;
            continue;
        }

        let kind = ContentClassifier::classify(&entry.name, &entry.group);
        playlist.push(PlaylistEntry {
            id: generate_item_id(trimmed, item_index),
            name: entry.name,
            group: entry.group,
            logo: entry.logo,
            url: trimmed.to_string(),
            kind,
            epg_id: entry.epg_id,
        });
        item_index += 1;
    }

    tracing::debug!(
        items = item_index,
        orphans_skipped,
        duplicates_skipped,
        "Playlist parsed"
    );

    playlist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    const SAMPLE: &str = r#"#EXTM3U
#EXTINF:-1 group-title="Filmes" tvg-logo="http://x/l.png",Matrix
http://cdn/matrix.m3u8
#EXTINF:-1 group-title="Abertos",Canal 1
http://cdn/canal1.ts
"#;

    #[test]
    fn test_parse_sample_playlist() {
        let playlist = parse(SAMPLE);

        assert_eq!(playlist.movies.len(), 1);
        let matrix = &playlist.movies[0];
        assert_eq!(matrix.name, "Matrix");
        assert_eq!(matrix.group, "Filmes");
        assert_eq!(matrix.logo.as_deref(), Some("http://x/l.png"));
        assert_eq!(matrix.url, "http://cdn/matrix.m3u8");
        assert_eq!(matrix.kind, MediaKind::Movie);

        assert_eq!(playlist.channels.len(), 1);
        let canal = &playlist.channels[0];
        assert_eq!(canal.name, "Canal 1");
        assert_eq!(canal.group, "Abertos");
        assert_eq!(canal.logo, None);
        assert_eq!(canal.url, "http://cdn/canal1.ts");
        assert_eq!(canal.kind, MediaKind::Channel);

        assert!(playlist.series.is_empty());
    }

    #[test]
    fn test_parse_empty_input() {
        let playlist = parse("");
        assert!(playlist.is_empty());
        assert!(parse("\n\n   \n").is_empty());
    }

    #[test]
    fn test_extinf_followed_by_extinf_discards_first() {
        let content = r#"#EXTM3U
#EXTINF:-1 group-title="Abertos",Lost Channel
#EXTINF:-1 group-title="Abertos",Kept Channel
http://cdn/kept.ts
"#;
        let playlist = parse(content);
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.channels[0].name, "Kept Channel");
    }

    #[test]
    fn test_orphan_url_is_dropped() {
        let content = r#"#EXTM3U
http://cdn/orphan.ts
#EXTINF:-1,Canal 2
http://cdn/canal2.ts
http://cdn/second-url.ts
"#;
        let playlist = parse(content);
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.channels[0].url, "http://cdn/canal2.ts");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let content = "#EXTINF:-1\nhttp://cdn/a.ts\n#EXTINF:-1 group-title=\"\" tvg-logo=\"\",\nhttp://cdn/b.ts\n";
        let playlist = parse(content);
        assert_eq!(playlist.channels.len(), 2);
        for entry in &playlist.channels {
            assert_eq!(entry.name, DEFAULT_ENTRY_NAME);
            assert_eq!(entry.group, DEFAULT_GROUP);
            assert_eq!(entry.logo, None);
        }
    }

    #[test]
    fn test_title_keeps_embedded_commas() {
        let content = r#"#EXTINF:-1 group-title="Filmes",Matrix, The (1999)
http://cdn/matrix.mp4
"#;
        let playlist = parse(content);
        assert_eq!(playlist.movies[0].name, "Matrix, The (1999)");
    }

    #[test]
    fn test_comma_inside_attribute_does_not_split() {
        let content = r#"#EXTINF:-1 tvg-logo="http://x/a,b.png" group-title="Filmes, Ação",Top Gun
http://cdn/topgun.mp4
"#;
        let playlist = parse(content);
        let entry = &playlist.movies[0];
        assert_eq!(entry.name, "Top Gun");
        assert_eq!(entry.group, "Filmes, Ação");
        assert_eq!(entry.logo.as_deref(), Some("http://x/a,b.png"));
    }

    #[test]
    fn test_attribute_like_text_in_title_is_kept() {
        let content = "#EXTINF:-1 group-title=\"News\",CNN feed=\"hd\"\nhttp://cdn/cnn.ts\n";
        let playlist = parse(content);
        let entry = &playlist.channels[0];
        assert_eq!(entry.name, r#"CNN feed="hd""#);
        assert_eq!(entry.group, "News");

        let bare = parse("#EXTINF:-1,Canal feed=\"sd\"\nhttp://cdn/canal.ts\n");
        assert_eq!(bare.channels[0].name, r#"Canal feed="sd""#);
        assert_eq!(bare.channels[0].group, DEFAULT_GROUP);
    }

    #[test]
    fn test_attrs_after_duration_comma() {
        let content = r#"#EXTM3U
#EXTINF:10.000000,TVG-ID="Channel1" tvg-logo="http://x/1.png" group-title="Entertainment",Channel 1
http://example.com/stream1.ts
"#;
        let playlist = parse(content);
        let entry = &playlist.channels[0];
        assert_eq!(entry.name, "Channel 1");
        assert_eq!(entry.group, "Entertainment");
        assert_eq!(entry.epg_id.as_deref(), Some("Channel1"));
        assert_eq!(entry.logo.as_deref(), Some("http://x/1.png"));
    }

    #[test]
    fn test_comments_and_non_http_lines_keep_pending() {
        let content = r#"#EXTM3U
#EXTINF:-1 group-title="Abertos",Canal 3
#EXTVLCOPT:http-user-agent=VLC
rtmp://not-supported/stream
http://cdn/canal3.ts
"#;
        let playlist = parse(content);
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.channels[0].name, "Canal 3");
        assert_eq!(playlist.channels[0].url, "http://cdn/canal3.ts");
    }

    #[test]
    fn test_duplicates_kept_by_default() {
        let content = r#"#EXTINF:-1,Canal 1
http://cdn/canal1.ts
#EXTINF:-1,Canal 1
http://cdn/canal1.ts
"#;
        let playlist = parse(content);
        assert_eq!(playlist.channels.len(), 2);
        assert_ne!(playlist.channels[0].id, playlist.channels[1].id);

        let options = ParseOptions {
            remove_duplicates: true,
            ..ParseOptions::default()
        };
        assert_eq!(parse_with_options(content, &options).channels.len(), 1);
    }

    #[test]
    fn test_ids_unique_within_parse() {
        let mut content = String::from("#EXTM3U\n");
        for i in 0..50 {
            content.push_str(&format!("#EXTINF:-1,Canal {}\nhttp://cdn/{}.ts\n", i, i % 5));
        }
        let playlist = parse(&content);
        let ids: HashSet<_> = playlist.entries().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        let content = "#EXTINF:-1 group-title=\"  Canais   Abertos \",  Globo    HD  \r\nhttp://cdn/globo.ts\r\n";
        let playlist = parse(content);
        assert_eq!(playlist.channels[0].name, "Globo HD");
        assert_eq!(playlist.channels[0].group, "Canais Abertos");

        let raw = ParseOptions {
            normalize: false,
            ..ParseOptions::default()
        };
        let playlist = parse_with_options(content, &raw);
        assert_eq!(playlist.channels[0].name, "Globo    HD");
    }

    #[test]
    fn test_classification_uses_name_and_group() {
        let content = r#"#EXTINF:-1 group-title="Variedades",Breaking Bad Series S01E01
http://cdn/bb.mp4
#EXTINF:-1 group-title="Premium",Showtime
http://cdn/showtime.ts
#EXTINF:-1 group-title="Séries",Dark S01E01
http://cdn/dark.mp4
"#;
        let playlist = parse(content);
        assert_eq!(playlist.series.len(), 2);
        assert_eq!(playlist.series[0].name, "Breaking Bad Series S01E01");
        assert_eq!(playlist.series[1].name, "Dark S01E01");
        assert_eq!(playlist.channels.len(), 1);
        assert_eq!(playlist.channels[0].name, "Showtime");
    }

    #[test]
    fn test_parse_extinf_minimal() {
        let extinf = parse_extinf("#EXTINF:-1,Canal Teste").unwrap();
        assert_eq!(extinf.title.as_deref(), Some("Canal Teste"));
        assert!(extinf.attributes.is_empty());
        assert!(parse_extinf("#EXTM3U").is_none());
    }

    #[test]
    fn test_looks_like_playlist() {
        assert!(looks_like_playlist(SAMPLE));
        assert!(looks_like_playlist("#EXTINF:-1,Solo\nhttp://cdn/solo.ts"));
        assert!(!looks_like_playlist("<html><body>Not found</body></html>"));
        assert!(!looks_like_playlist(""));
    }

    #[test]
    fn test_generate_item_id() {
        let id1 = generate_item_id("http://stream1.com", 0);
        let id2 = generate_item_id("http://stream2.com", 0);
        assert_ne!(id1, id2);
        assert!(id1.starts_with("item_"));
    }
}
