//! Playback session controller
//!
//! Wraps one media element and drives it through
//! `idle -> loading -> ready -> (playing <-> paused)`, with a terminal `error`
//! state. Segmented streams are bound to the element through an injected
//! [`StreamAttacher`]; the returned [`DetachFn`] is released exactly once on
//! teardown so no network activity outlives the session.
//!
//! The controller owns its media element by value, so two sessions can never
//! drive the same element at once.

use uuid::Uuid;

use crate::errors::PlaybackError;
use crate::models::{LoadState, MediaEvent, PlaybackPhase, PlaybackSnapshot};

/// Releases whatever an attach call set up
pub type DetachFn = Box<dyn FnOnce()>;

/// Platform media primitive driven by the controller
pub trait MediaElement {
    /// Hand a progressive source (mp4, ts) straight to the element
    fn load(&mut self, url: &str);
    /// Start playback; an `Err` means the element rejected the attempt
    fn play(&mut self) -> Result<(), String>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    /// Effective output volume in [0, 1]
    fn set_volume(&mut self, level: f64);
    /// Ask the presentation surface to enter or leave fullscreen
    fn request_fullscreen(&mut self, enter: bool);
}

/// Binds a segmented stream URL to a media element
pub trait StreamAttacher<M: ?Sized> {
    fn attach(&self, url: &str, media: &mut M) -> DetachFn;
}

impl<M: ?Sized, F> StreamAttacher<M> for F
where
    F: Fn(&str, &mut M) -> DetachFn,
{
    fn attach(&self, url: &str, media: &mut M) -> DetachFn {
        self(url, media)
    }
}

/// Segmented (HLS) sources need the attach point; everything else plays natively
pub fn is_adaptive_stream(url: &str) -> bool {
    let lower = url.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or_default();
    path.ends_with(".m3u8")
}

/// Format seconds as `m:ss` for the progress display
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Playback session for a single source URL
pub struct PlaybackController<M: MediaElement> {
    session_id: Uuid,
    source_url: String,
    media: M,
    detach: Option<DetachFn>,
    load_state: LoadState,
    playing: bool,
    started: bool,
    play_queued: bool,
    position: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    fullscreen: bool,
    error: Option<String>,
    disposed: bool,
}

impl<M: MediaElement> PlaybackController<M> {
    pub fn new(source_url: impl Into<String>, media: M) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            source_url: source_url.into(),
            media,
            detach: None,
            load_state: LoadState::Idle,
            playing: false,
            started: false,
            play_queued: false,
            position: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
            fullscreen: false,
            error: None,
            disposed: false,
        }
    }

    /// Start with a given volume (usually the user's saved preference)
    pub fn with_volume(mut self, level: f64) -> Self {
        self.set_volume(level);
        self
    }

    /// Bind the source to the media element and start loading.
    ///
    /// Only the first call per controller has an effect.
    pub fn attach<A>(&mut self, attacher: &A) -> Result<(), PlaybackError>
    where
        A: StreamAttacher<M> + ?Sized,
    {
        if self.disposed {
            return Err(PlaybackError::Disposed);
        }
        if self.load_state != LoadState::Idle {
            tracing::debug!(session = %self.session_id, "Source already attached");
            return match &self.error {
                Some(message) => Err(PlaybackError::Unavailable(message.clone())),
                None => Ok(()),
            };
        }

        let url = self.source_url.trim().to_string();
        if url.is_empty() {
            self.fail("Empty source URL".to_string());
            return Err(PlaybackError::Unavailable("Empty source URL".to_string()));
        }

        self.load_state = LoadState::Loading;
        self.media.set_volume(self.effective_volume());

        if is_adaptive_stream(&url) {
            tracing::info!(session = %self.session_id, url = %url, "Attaching adaptive stream");
            self.detach = Some(attacher.attach(&url, &mut self.media));
        } else {
            tracing::info!(session = %self.session_id, url = %url, "Loading progressive source");
            self.media.load(&url);
        }

        Ok(())
    }

    /// Apply a notification from the media layer. Ignored after teardown.
    pub fn handle_event(&mut self, event: MediaEvent) {
        if self.disposed {
            tracing::debug!(session = %self.session_id, ?event, "Event after teardown ignored");
            return;
        }
        if self.load_state == LoadState::Error {
            return;
        }

        match event {
            MediaEvent::CanPlay => {
                if self.load_state != LoadState::Loading {
                    return;
                }
                self.load_state = LoadState::Ready;
                tracing::debug!(session = %self.session_id, "Media ready");

                if self.play_queued {
                    self.play_queued = false;
                    // Failures move the session to the error state
                    let _ = self.start_playback();
                }
            }
            MediaEvent::Progress { position } => {
                if position.is_finite() {
                    self.position = position.max(0.0);
                }
            }
            MediaEvent::DurationChange(duration) => {
                self.duration = if duration.is_finite() && duration > 0.0 {
                    duration
                } else {
                    0.0
                };
            }
            MediaEvent::Playing => {
                // Platform autoplay can start before CanPlay; treat it as ready
                if self.load_state == LoadState::Loading {
                    self.load_state = LoadState::Ready;
                    self.play_queued = false;
                }
                if self.load_state == LoadState::Ready {
                    self.playing = true;
                    self.started = true;
                }
            }
            MediaEvent::Paused => {
                self.playing = false;
            }
            MediaEvent::Error(message) => self.fail(message),
        }
    }

    /// Start playback.
    ///
    /// Before the media is ready the request is queued and executed on
    /// `CanPlay`; `pause` cancels it.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.disposed {
            return Err(PlaybackError::Disposed);
        }

        match self.load_state {
            LoadState::Error => Err(PlaybackError::Unavailable(
                self.error.clone().unwrap_or_default(),
            )),
            LoadState::Idle | LoadState::Loading => {
                self.play_queued = true;
                Ok(())
            }
            LoadState::Ready if self.playing => Ok(()),
            LoadState::Ready => self.start_playback(),
        }
    }

    fn start_playback(&mut self) -> Result<(), PlaybackError> {
        match self.media.play() {
            Ok(()) => {
                self.playing = true;
                self.started = true;
                Ok(())
            }
            Err(reason) => {
                self.fail(reason.clone());
                Err(PlaybackError::StartRejected(reason))
            }
        }
    }

    pub fn pause(&mut self) {
        if self.disposed {
            return;
        }
        self.play_queued = false;
        if self.playing {
            self.media.pause();
            self.playing = false;
        }
    }

    pub fn toggle_play(&mut self) -> Result<(), PlaybackError> {
        if self.playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Jump to a position, clamped into [0, duration]
    pub fn seek(&mut self, seconds: f64) {
        if self.disposed || self.load_state == LoadState::Error {
            tracing::debug!(session = %self.session_id, "Seek ignored");
            return;
        }
        if !seconds.is_finite() {
            return;
        }

        let target = seconds.clamp(0.0, self.duration);
        self.position = target;
        self.media.seek(target);
    }

    pub fn skip(&mut self, delta_seconds: f64) {
        self.seek(self.position + delta_seconds);
    }

    /// Set volume in [0, 1]. Zero mutes, anything else unmutes.
    pub fn set_volume(&mut self, level: f64) {
        if self.disposed || level.is_nan() {
            return;
        }

        self.volume = level.clamp(0.0, 1.0);
        self.muted = self.volume == 0.0;
        self.media.set_volume(self.effective_volume());
    }

    /// Mute or restore the pre-mute volume. A remembered volume of 0 stays 0.
    pub fn toggle_mute(&mut self) {
        if self.disposed {
            return;
        }
        self.muted = !self.muted;
        self.media.set_volume(self.effective_volume());
    }

    /// Flip fullscreen optimistically; a denial by the surface is not tracked
    pub fn toggle_fullscreen(&mut self) {
        if self.disposed {
            return;
        }
        self.fullscreen = !self.fullscreen;
        self.media.request_fullscreen(self.fullscreen);
    }

    /// Release the stream attachment. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.play_queued = false;

        if self.playing {
            self.media.pause();
            self.playing = false;
        }
        self.release_attachment();

        tracing::debug!(session = %self.session_id, "Playback session closed");
    }

    fn release_attachment(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }

    fn fail(&mut self, message: String) {
        tracing::warn!(session = %self.session_id, url = %self.source_url, error = %message, "Playback failed");
        self.load_state = LoadState::Error;
        self.playing = false;
        self.play_queued = false;
        self.error = Some(message);
        self.release_attachment();
    }

    pub fn phase(&self) -> PlaybackPhase {
        match self.load_state {
            LoadState::Idle => PlaybackPhase::Idle,
            LoadState::Loading => PlaybackPhase::Loading,
            LoadState::Error => PlaybackPhase::Error,
            LoadState::Ready if self.playing => PlaybackPhase::Playing,
            LoadState::Ready if self.started => PlaybackPhase::Paused,
            LoadState::Ready => PlaybackPhase::Ready,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_play_queued(&self) -> bool {
        self.play_queued
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Volume the user set, kept while muted
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Volume actually sent to the media element
    pub fn effective_volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            session_id: self.session_id.to_string(),
            source_url: self.source_url.clone(),
            load_state: self.load_state,
            phase: self.phase(),
            playing: self.playing,
            position_seconds: self.position,
            duration_seconds: self.duration,
            volume: self.volume,
            muted: self.muted,
            fullscreen: self.fullscreen,
            error_message: self.error.clone(),
        }
    }
}

impl<M: MediaElement> Drop for PlaybackController<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}
