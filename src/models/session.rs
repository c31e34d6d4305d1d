use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::LoadError;
use crate::models::{ClassifiedPlaylist, PlaylistEntry};

/// Default port used by IPTV panels when the user leaves it blank
pub const DEFAULT_IPTV_PORT: u16 = 8080;

/// Screen currently shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    Login,
    LoadPlaylist,
    Browse,
    Player,
}

/// Requested stream quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Auto,
    High,
    Medium,
    Low,
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSettings {
    pub autoplay: bool,
    pub quality: Quality,
    /// Initial volume for new playback sessions, in [0, 1]
    pub volume: f64,
    pub buffer_seconds: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            autoplay: true,
            quality: Quality::Auto,
            volume: 0.8,
            buffer_seconds: 30,
        }
    }
}

/// IPTV panel credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IptvCredentials {
    /// Server host, with or without scheme (e.g. "example.com" or "http://example.com")
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
}

fn default_port() -> u16 {
    DEFAULT_IPTV_PORT
}

impl IptvCredentials {
    /// Check that server, username and password are all present
    pub fn validate(&self) -> Result<(), LoadError> {
        let missing: Vec<&str> = [
            ("server", self.server.trim()),
            ("username", self.username.trim()),
            ("password", self.password.trim()),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LoadError::MissingCredentials(missing.join(", ")))
        }
    }

    /// Server base URL with scheme and port, path ending in `/`
    /// (e.g. "http://example.com:8080/" or "http://example.com:8080/panel/")
    pub fn base_url(&self) -> Result<Url, LoadError> {
        let server = self.server.trim().trim_end_matches('/');
        let raw = if server.starts_with("http://") || server.starts_with("https://") {
            server.to_string()
        } else {
            format!("http://{}", server)
        };

        let mut url = Url::parse(&raw).map_err(|e| LoadError::InvalidUrl(e.to_string()))?;
        url.set_port(Some(self.port))
            .map_err(|_| LoadError::InvalidUrl(raw.clone()))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    fn endpoint(&self, relative: &str) -> Result<Url, LoadError> {
        self.base_url()?
            .join(relative)
            .map_err(|e| LoadError::InvalidUrl(e.to_string()))
    }

    /// M3U Plus playlist URL for this account
    pub fn playlist_url(&self) -> Result<String, LoadError> {
        let mut url = self.endpoint("get.php")?;
        url.query_pairs_mut()
            .append_pair("username", &self.username)
            .append_pair("password", &self.password)
            .append_pair("type", "m3u_plus")
            .append_pair("output", "ts");
        Ok(url.to_string())
    }

    /// Build playback URL for live streams
    pub fn live_url(&self, stream_id: i64) -> Result<String, LoadError> {
        let url = self.endpoint(&format!(
            "live/{}/{}/{}.ts",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            stream_id
        ))?;
        Ok(url.to_string())
    }
}

/// Application state for one user session: which screen is shown, what was
/// loaded and what is being watched. Passed by reference to the screens that
/// need it.
#[derive(Debug, Clone)]
pub struct AppSession {
    screen: Screen,
    credentials: Option<IptvCredentials>,
    playlist: Option<ClassifiedPlaylist>,
    current: Option<PlaylistEntry>,
    pub settings: PlayerSettings,
    pub show_settings: bool,
    pub show_guide: bool,
}

impl Default for AppSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AppSession {
    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            credentials: None,
            playlist: None,
            current: None,
            settings: PlayerSettings::default(),
            show_settings: false,
            show_guide: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn credentials(&self) -> Option<&IptvCredentials> {
        self.credentials.as_ref()
    }

    pub fn playlist(&self) -> Option<&ClassifiedPlaylist> {
        self.playlist.as_ref()
    }

    pub fn current(&self) -> Option<&PlaylistEntry> {
        self.current.as_ref()
    }

    /// Log in with panel credentials.
    ///
    /// Returns the playlist URL the caller should load; the session moves to
    /// the playlist loading screen until `playlist_loaded` is called.
    pub fn login(&mut self, credentials: IptvCredentials) -> Result<String, LoadError> {
        credentials.validate()?;
        let url = credentials.playlist_url()?;
        self.credentials = Some(credentials);
        self.screen = Screen::LoadPlaylist;
        Ok(url)
    }

    /// Skip credentials and load a playlist by URL or file instead
    pub fn skip_login(&mut self) {
        self.screen = Screen::LoadPlaylist;
    }

    pub fn playlist_loaded(&mut self, playlist: ClassifiedPlaylist) {
        self.playlist = Some(playlist);
        self.current = None;
        self.screen = Screen::Browse;
    }

    /// Select an entry for playback. Ignored unless a playlist is loaded.
    pub fn select(&mut self, entry: PlaylistEntry) -> bool {
        if self.playlist.is_none() {
            return false;
        }
        self.current = Some(entry);
        self.screen = Screen::Player;
        true
    }

    /// Leave the player and return to the lists
    pub fn back(&mut self) {
        self.current = None;
        if self.playlist.is_some() {
            self.screen = Screen::Browse;
        }
    }

    pub fn logout(&mut self) {
        *self = Self {
            settings: self.settings.clone(),
            ..Self::new()
        };
    }

    pub fn toggle_settings(&mut self) {
        self.show_settings = !self.show_settings;
    }

    pub fn toggle_guide(&mut self) {
        self.show_guide = !self.show_guide;
    }
}
