//! Persistent application configuration model and defaults.

/// Root configuration persisted to `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    /// Catalog server connection.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Player server connection.
    #[serde(default)]
    pub player: PlayerConfig,
    /// Per-call HTTP timeouts shared by both servers.
    #[serde(default)]
    pub http: HttpConfig,
    /// Now-playing watcher preferences.
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_endpoint")]
    pub endpoint: String,
    /// Result count requested from free-text song search.
    #[serde(default = "default_search_page_size")]
    pub search_page_size: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_io_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_io_timeout_ms")]
    pub write_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct WatchConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_catalog_endpoint() -> String {
    "http://localhost:9004".to_string()
}

fn default_player_endpoint() -> String {
    "http://localhost:9005".to_string()
}

fn default_search_page_size() -> usize {
    30
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_io_timeout_ms() -> u64 {
    15_000
}

fn default_poll_interval_secs() -> u64 {
    10
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: default_catalog_endpoint(),
            search_page_size: default_search_page_size(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_player_endpoint(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            read_timeout_ms: default_io_timeout_ms(),
            write_timeout_ms: default_io_timeout_ms(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Clamps numeric settings into supported ranges and normalizes endpoints.
pub fn sanitize_config(config: Config) -> Config {
    const TIMEOUT_RANGE_MS: (u64, u64) = (100, 120_000);
    let clamp_timeout = |value: u64| value.clamp(TIMEOUT_RANGE_MS.0, TIMEOUT_RANGE_MS.1);
    let trim_endpoint = |endpoint: &str| endpoint.trim().trim_end_matches('/').to_string();

    Config {
        catalog: CatalogConfig {
            endpoint: trim_endpoint(&config.catalog.endpoint),
            search_page_size: config.catalog.search_page_size.clamp(1, 500),
        },
        player: PlayerConfig {
            endpoint: trim_endpoint(&config.player.endpoint),
        },
        http: HttpConfig {
            connect_timeout_ms: clamp_timeout(config.http.connect_timeout_ms),
            read_timeout_ms: clamp_timeout(config.http.read_timeout_ms),
            write_timeout_ms: clamp_timeout(config.http.write_timeout_ms),
        },
        watch: WatchConfig {
            poll_interval_secs: config.watch.poll_interval_secs.clamp(1, 3_600),
        },
    }
}
