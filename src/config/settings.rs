//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::application::client::DistanceMode;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port, static assets)
    pub server: ServerSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// Broadcast hub configuration
    pub hub: HubSettings,

    /// Client-side tracker configuration
    pub tracker: TrackerSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,

    /// Directory holding index.html and client assets
    pub static_dir: String,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 4KB)
    /// Location frames are tiny; anything bigger is not ours
    pub max_message_size: usize,

    /// Maximum frame size in bytes (default: 4KB)
    pub max_frame_size: usize,

    /// Ping interval in milliseconds (default: 25000)
    pub heartbeat_interval_ms: u64,

    /// Per-session outbound queue length before events are dropped
    pub outbound_buffer: usize,
}

/// Broadcast hub configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    /// Command queue length between connections and the hub task
    pub command_buffer: usize,
}

/// Tracker client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSettings {
    /// Which pairs get a distance line
    pub distance_mode: DistanceMode,

    /// Zoom level used when recentering the map
    pub initial_zoom: u8,
}

/// Grace period on top of the heartbeat interval before a silent
/// connection is closed
pub const HEARTBEAT_GRACE_MS: u64 = 10_000;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a buffer size is zero.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::defaults(&environment)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("tracker.distance_mode", std::env::var("DISTANCE_MODE").ok())?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    /// Built-in defaults only, without files or environment.
    pub fn default_for(environment: &str) -> Result<Self, ConfigError> {
        Self::defaults(environment)?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    fn defaults(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.static_dir", "public")?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("websocket.max_message_size", 4096_i64)?
            .set_default("websocket.max_frame_size", 4096_i64)?
            .set_default("websocket.heartbeat_interval_ms", 25000_i64)?
            .set_default("websocket.outbound_buffer", 64_i64)?
            .set_default("hub.command_buffer", 1024_i64)?
            .set_default("tracker.distance_mode", DistanceMode::default().as_str())?
            .set_default("tracker.initial_zoom", 16_i64)
    }

    fn validate(settings: Self) -> Result<Self, ConfigError> {
        if settings.websocket.outbound_buffer == 0 {
            return Err(ConfigError::Message(
                "websocket.outbound_buffer must be greater than zero".into(),
            ));
        }
        if settings.hub.command_buffer == 0 {
            return Err(ConfigError::Message(
                "hub.command_buffer must be greater than zero".into(),
            ));
        }
        if settings.websocket.heartbeat_interval_ms == 0 {
            return Err(ConfigError::Message(
                "websocket.heartbeat_interval_ms must be greater than zero".into(),
            ));
        }
        Ok(settings)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl WebSocketSettings {
    /// How long a connection may stay silent before it is closed
    pub fn idle_timeout_ms(&self) -> u64 {
        self.heartbeat_interval_ms + HEARTBEAT_GRACE_MS
    }
}
