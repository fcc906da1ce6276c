//! Top-level error wrapper types.

use crate::{ConfigError, RestError};

/// Every error condition a Cordwain operation can surface.
///
/// # Examples
///
/// ```
/// use cordwain_error::{CordwainError, ConfigError, ConfigErrorKind};
///
/// let err: CordwainError = ConfigError::new(ConfigErrorKind::MissingEnv("DISCORD_TOKEN".into())).into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CordwainErrorKind {
    /// REST dispatch error
    #[from(RestError)]
    Rest(RestError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Cordwain error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Cordwain Error: {}", _0)]
pub struct CordwainError(Box<CordwainErrorKind>);

impl CordwainError {
    /// Create a new error from a kind.
    pub fn new(kind: CordwainErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CordwainErrorKind {
        &self.0
    }
}

impl<T> From<T> for CordwainError
where
    T: Into<CordwainErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Cordwain operations.
pub type CordwainResult<T> = std::result::Result<T, CordwainError>;
