//! Configuration file support for the leaderboard CLI.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `LEADERBOARD_`, e.g., `LEADERBOARD_DATABASE_URL`)
//! 3. Local config file (./leaderboard.toml)
//! 4. XDG config file (~/.config/leaderboard/config.toml)
//! 5. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/leaderboard/leaderboard.db`
//! on Linux (using the XDG state directory) if not explicitly configured.
//!
//! Environment variables map one underscore to one level of nesting, so only
//! single-word keys (`LEADERBOARD_GITHUB_TOKEN`, `LEADERBOARD_SERVER_PORT`)
//! can be set that way. Multi-word keys such as `no_rate_limit` come from a
//! config file.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/leaderboard/leaderboard.db"  # optional, this is the default
//!
//! [github]
//! token = "ghp_..."  # or LEADERBOARD_GITHUB_TOKEN / GITHUB_TOKEN
//! api_base = "https://api.github.com"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [sync]
//! topic = "pinokio"
//! no_rate_limit = false
//! initial_sync = true
//! ```

use std::path::PathBuf;
use std::{fs, io};

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use leaderboard::github::DEFAULT_API_BASE;
use leaderboard::sync::DEFAULT_TOPIC;
use serde::Deserialize;

const APP_NAME: &str = "leaderboard";

/// Token variable read when no token is configured.
const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token. An empty string disables code search.
    pub token: Option<String>,
    /// REST API base URL.
    pub api_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Topic used by the tag search.
    pub topic: String,
    /// Whether to disable proactive rate limiting.
    pub no_rate_limit: bool,
    /// Run a sync when `serve` starts against an empty catalog.
    pub initial_sync: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            no_rate_limit: false,
            initial_sync: true,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/leaderboard/config.toml)
    /// 3. Local config file (./leaderboard.toml)
    /// 4. Environment variables with LEADERBOARD_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("leaderboard.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./leaderboard.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // LEADERBOARD_DATABASE_URL -> database.url
        builder = builder.add_source(
            Environment::with_prefix("LEADERBOARD")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter creates the SQLite file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("leaderboard.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Get the GitHub token, falling back to `GITHUB_TOKEN`.
    ///
    /// A configured empty token is returned as-is so it still disables code
    /// search even when `GITHUB_TOKEN` is set.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var(GITHUB_TOKEN_ENV).ok())
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/leaderboard` or `~/.local/state/leaderboard`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            // state_dir() returns None on macOS/Windows
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }

    /// Save a GitHub token to the default config file.
    pub fn save_github_token(token: &str) -> io::Result<PathBuf> {
        let config_path = Self::default_config_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;
        write_github_token(&config_path, token)?;
        Ok(config_path)
    }
}

/// Set `[github] token` in the TOML file at `path`.
///
/// Creates the file and parent directories if they don't exist. Existing
/// formatting, comments, and other settings are preserved.
pub(crate) fn write_github_token(path: &std::path::Path, token: &str) -> io::Result<()> {
    use toml_edit::{DocumentMut, value};

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc: DocumentMut = content.parse().map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("Invalid TOML: {}", e))
    })?;

    if !doc.contains_key("github") {
        doc["github"] = toml_edit::table();
    }
    doc["github"]["token"] = value(token);

    fs::write(path, doc.to_string())
}
