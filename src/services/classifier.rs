use lazy_static::lazy_static;
use regex::Regex;

use crate::models::MediaKind;

lazy_static! {
    // Movie tokens match anywhere in the text ("Filmes", "Telefilme", "MOVIES 4K")
    static ref MOVIE_TOKENS: Regex =
        Regex::new(r"(?i)movie|filme|(?:^|[^\p{L}\p{N}])vod(?:$|[^\p{L}\p{N}])").unwrap();

    // Series tokens only match whole words, so "Showtime" or "TV Showcase" stay channels.
    // Underscores separate words too ("Netflix_Series").
    static ref SERIES_TOKENS: Regex = Regex::new(
        r"(?i)(?:^|[^\p{L}\p{N}])(?:s[eé]ries?|shows?|novelas?)(?:$|[^\p{L}\p{N}])"
    )
    .unwrap();
}

/// Content classifier for IPTV entries
pub struct ContentClassifier;

impl ContentClassifier {
    /// Classify an entry from its display name and group.
    ///
    /// Movie tokens win over series tokens, and both fields are checked for
    /// each token family before moving on. Anything else is a live channel.
    pub fn classify(name: &str, group: &str) -> MediaKind {
        if Self::is_movie(group) || Self::is_movie(name) {
            return MediaKind::Movie;
        }

        if Self::is_series(group) || Self::is_series(name) {
            return MediaKind::Series;
        }

        MediaKind::Channel
    }

    pub fn is_movie(text: &str) -> bool {
        !text.is_empty() && MOVIE_TOKENS.is_match(text)
    }

    pub fn is_series(text: &str) -> bool {
        !text.is_empty() && SERIES_TOKENS.is_match(text)
    }
}
