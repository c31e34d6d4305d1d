//! IPTV playlist parsing, classification and playback session control.
//!
//! The library exposes the M3U/M3U8 parser and its content classifier, a
//! loader for URL/file/inline playlists, catalog helpers for browsing, the
//! application session state and a playback session controller. The binary
//! serves the parser over HTTP.

pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::Config;
pub use errors::{LoadError, PlaybackError};
pub use models::{ClassifiedPlaylist, MediaKind, PlaylistEntry};
pub use services::m3u_parser::{looks_like_playlist, parse, parse_with_options};
pub use services::playback::{DetachFn, MediaElement, PlaybackController, StreamAttacher};
pub use state::AppState;
