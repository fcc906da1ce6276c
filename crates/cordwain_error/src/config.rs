//! Configuration and environment errors.

use std::fmt;
use std::path::PathBuf;

/// What went wrong while assembling the runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// A required environment variable is not set.
    MissingEnv(String),
    /// A configuration source could not be read or merged.
    Read {
        /// File that failed, if a specific one was named
        path: Option<PathBuf>,
        /// Underlying error
        message: String,
    },
    /// Sources were read but do not form a valid configuration.
    Parse(String),
    /// The configuration could not be rendered for display.
    Render(String),
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorKind::MissingEnv(var) => write!(f, "{} environment variable not set", var),
            ConfigErrorKind::Read {
                path: Some(path),
                message,
            } => write!(
                f,
                "Failed to read configuration from {}: {}",
                path.display(),
                message
            ),
            ConfigErrorKind::Read {
                path: None,
                message,
            } => write!(f, "Failed to read configuration: {}", message),
            ConfigErrorKind::Parse(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigErrorKind::Render(msg) => write!(f, "Failed to render configuration: {}", msg),
        }
    }
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use cordwain_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::MissingEnv("DISCORD_TOKEN".into()));
/// assert!(err.to_string().contains("DISCORD_TOKEN environment variable not set"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    line: u32,
    file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }

    /// Source line where the error was created.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Source file where the error was created.
    pub fn file(&self) -> &'static str {
        self.file
    }
}

impl From<ConfigErrorKind> for ConfigError {
    #[track_caller]
    fn from(kind: ConfigErrorKind) -> Self {
        Self::new(kind)
    }
}
