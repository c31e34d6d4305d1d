use serde::{Deserialize, Serialize};

/// Load state of the media behind a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Error,
}

impl Default for LoadState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Combined load/play state, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Error,
}

impl std::fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PlaybackPhase::Idle => "idle",
            PlaybackPhase::Loading => "loading",
            PlaybackPhase::Ready => "ready",
            PlaybackPhase::Playing => "playing",
            PlaybackPhase::Paused => "paused",
            PlaybackPhase::Error => "error",
        };
        f.write_str(label)
    }
}

/// Notifications pushed by the media element or streaming layer
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Enough data is buffered to start playback
    CanPlay,
    /// Periodic progress tick
    Progress { position: f64 },
    /// Duration became known or changed (metadata loaded)
    DurationChange(f64),
    /// Playback started outside of a controller command (media keys, autoplay)
    Playing,
    /// Playback paused outside of a controller command
    Paused,
    /// Load or decode failure
    Error(String),
}

/// Serializable copy of a playback session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub session_id: String,
    pub source_url: String,
    pub load_state: LoadState,
    pub phase: PlaybackPhase,
    pub playing: bool,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub volume: f64,
    pub muted: bool,
    pub fullscreen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
