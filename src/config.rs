use std::env;

/// Which [`ChannelStore`](crate::services::store::ChannelStore) backend to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl StoreBackend {
    fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Self::Memory,
            _ => Self::Sqlite,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub app_env: String,
    pub static_dir: Option<String>,

    // SQLite
    pub database_url: String,
    pub db_max_connections: u32,
    pub store_backend: StoreBackend,

    // Data sources
    pub playlist_source: String,
    pub reference_data_dir: String,
    pub fetch_timeout_ms: u64,

    // Pagination
    pub default_page_size: usize,
    pub max_page_size: usize,

    // Misc
    pub user_agent: String,
    pub admin_key: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            static_dir: env::var("STATIC_DIR").ok().filter(|v| !v.trim().is_empty()),

            // SQLite
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/streams.db".to_string()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            store_backend: StoreBackend::from_name(
                &env::var("STORE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
            ),

            // Data sources
            playlist_source: env::var("PLAYLIST_SOURCE")
                .unwrap_or_else(|_| "data/streams/index.m3u".to_string()),
            reference_data_dir: env::var("REFERENCE_DATA_DIR")
                .unwrap_or_else(|_| "data/database".to_string()),
            fetch_timeout_ms: env::var("FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "60000".to_string())
                .parse()
                .unwrap_or(60_000), // 1 minute

            // Pagination
            default_page_size: env::var("DEFAULT_PAGE_SIZE")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .unwrap_or(50),
            max_page_size: env::var("MAX_PAGE_SIZE")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),

            // Misc - VLC user agent, some playlist hosts block anything else
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "VLC/3.0.20 LibVLC/3.0.20".to_string()),
            admin_key: env::var("ADMIN_KEY").unwrap_or_else(|_| "admin123".to_string()),
        }
    }

    /// Configuration for tests: in-memory store, no external data
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            app_env: "test".to_string(),
            static_dir: None,
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            store_backend: StoreBackend::Memory,
            playlist_source: "/nonexistent/world-tv/index.m3u".to_string(),
            reference_data_dir: "/nonexistent/world-tv/database".to_string(),
            fetch_timeout_ms: 5_000,
            default_page_size: 50,
            max_page_size: 1000,
            user_agent: "VLC/3.0.20 LibVLC/3.0.20".to_string(),
            admin_key: "secret".to_string(),
        }
    }
}
