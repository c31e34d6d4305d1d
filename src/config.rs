use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub node_env: String,

    // Loading
    pub max_m3u_size_mb: usize,
    pub fetch_timeout_ms: u64,
    /// Prefix for the single retry through a CORS-style proxy; empty disables it
    pub fallback_proxy_url: String,

    // Misc
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),
            node_env: env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string()),

            // Loading
            max_m3u_size_mb: env::var("MAX_M3U_SIZE_MB")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),

            fetch_timeout_ms: env::var("FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000), // 30 seconds

            fallback_proxy_url: env::var("FALLBACK_PROXY_URL")
                .unwrap_or_else(|_| "https://api.allorigins.win/raw?url=".to_string()),

            // Misc - Use VLC user agent to avoid IPTV server blocks
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "VLC/3.0.20 LibVLC/3.0.20".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.node_env == "production"
    }

    /// Fallback proxy prefix, if one is configured
    pub fn fallback_proxy(&self) -> Option<&str> {
        let prefix = self.fallback_proxy_url.trim();
        if prefix.is_empty() {
            None
        } else {
            Some(prefix)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
