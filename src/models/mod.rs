pub mod playback;
pub mod playlist;
pub mod session;

pub use playback::{LoadState, MediaEvent, PlaybackPhase, PlaybackSnapshot};
pub use playlist::{
    ClassifiedPlaylist, MediaKind, ParseOptions, ParseRequest, ParseResponse, PlaylistEntry,
    PlaylistStats, DEFAULT_ENTRY_NAME, DEFAULT_GROUP,
};
pub use session::{AppSession, IptvCredentials, PlayerSettings, Quality, Screen};
