use std::time::Instant;

use crate::config::Config;
use crate::errors::LoadError;
use crate::services::loader::PlaylistLoader;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub loader: PlaylistLoader,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, LoadError> {
        let loader = PlaylistLoader::new(&config)?;
        Ok(Self {
            config,
            loader,
            start_time: Instant::now(),
        })
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> std::sync::Arc<AppState> {
    let config = Config {
        port: 0,
        node_env: "test".to_string(),
        max_m3u_size_mb: 1,
        fetch_timeout_ms: 1_000,
        fallback_proxy_url: String::new(),
        user_agent: "VLC/3.0.20 LibVLC/3.0.20".to_string(),
    };
    std::sync::Arc::new(AppState::new(config).unwrap())
}
