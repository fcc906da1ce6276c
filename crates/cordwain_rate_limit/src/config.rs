//! Configuration structures for REST dispatch and rate limiting.
//!
//! This module provides TOML-based configuration. The configuration system supports:
//! - Bundled defaults (include_str! from cordwain.toml)
//! - User overrides (./cordwain.toml or ~/.config/cordwain/cordwain.toml)
//! - Environment overrides (`CORDWAIN_REST__DEFAULT_RETRIES=3`)
//! - Automatic merging with user values taking precedence

use cordwain_error::{ConfigError, ConfigErrorKind, CordwainError, CordwainResult};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP settings for the REST dispatcher.
///
/// # Example
///
/// ```toml
/// [rest]
/// base_url = "https://discord.com/api"
/// api_version = 10
/// default_retries = 5
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RestConfig {
    /// API root without the version segment
    pub base_url: String,

    /// Discord API version appended as `/v{n}`
    pub api_version: u8,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retry budget for endpoints without their own ceiling
    pub default_retries: u32,

    /// First backoff delay after a server or transport error, doubled on each
    /// further retry
    pub initial_backoff_ms: u64,

    /// Upper bound for a single backoff delay
    pub max_backoff_secs: u64,

    /// Randomize backoff delays
    pub jitter: bool,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://discord.com/api".to_string(),
            api_version: 10,
            user_agent: concat!(
                "DiscordBot (https://github.com/crumplecup/cordwain, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            )
            .to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            default_retries: 5,
            initial_backoff_ms: 500,
            max_backoff_secs: 30,
            jitter: true,
        }
    }
}

impl RestConfig {
    /// API root including the version segment.
    pub fn api_url(&self) -> String {
        format!("{}/v{}", self.base_url.trim_end_matches('/'), self.api_version)
    }

    /// Connect timeout as a duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Maximum backoff as a duration.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

/// Client-side limits applied on top of what Discord reports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Proactive cap on requests per second that count toward the global limit.
    ///
    /// Discord allows 50 per second per bot. `None` or `0` disables the cap
    /// and relies on 429 responses alone.
    pub global_requests_per_second: Option<u32>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_requests_per_second: Some(50),
        }
    }
}

/// Top-level Cordwain configuration.
///
/// Loads configuration from TOML files with a precedence system:
/// 1. Bundled defaults (include_str! from cordwain.toml)
/// 2. User config in home directory (~/.config/cordwain/cordwain.toml)
/// 3. User config in current directory (./cordwain.toml)
/// 4. `CORDWAIN_*` environment variables
///
/// # Example
///
/// ```no_run
/// use cordwain_rate_limit::CordwainConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CordwainConfig::load()?;
/// println!("Talking to {}", config.rest.api_url());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct CordwainConfig {
    /// REST dispatcher settings
    #[serde(default)]
    pub rest: RestConfig,

    /// Client-side rate limit settings
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl CordwainConfig {
    /// Load configuration from a specific file path.
    ///
    /// Missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> CordwainResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                CordwainError::from(ConfigError::new(ConfigErrorKind::Read {
                    path: Some(path.as_ref().to_path_buf()),
                    message: e.to_string(),
                }))
            })?
            .try_deserialize()
            .map_err(|e| {
                CordwainError::from(ConfigError::new(ConfigErrorKind::Parse(e.to_string())))
            })
    }

    /// Load configuration with precedence: env > current dir > home dir > bundled default.
    ///
    /// User config files are optional and will be silently skipped if not found.
    #[instrument]
    pub fn load() -> CordwainResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../cordwain.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/cordwain/cordwain.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("cordwain").required(false))
            .add_source(
                Environment::with_prefix("CORDWAIN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder
            .build()
            .map_err(|e| {
                CordwainError::from(ConfigError::new(ConfigErrorKind::Read {
                    path: None,
                    message: e.to_string(),
                }))
            })?
            .try_deserialize()
            .map_err(|e| {
                CordwainError::from(ConfigError::new(ConfigErrorKind::Parse(e.to_string())))
            })
    }

    /// Effective global cap, with `0` treated as disabled.
    pub fn global_requests_per_second(&self) -> Option<u32> {
        self.rate_limit
            .global_requests_per_second
            .filter(|rps| *rps > 0)
    }
}
