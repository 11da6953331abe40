//! Service-level error types
//!
//! Request handling fails with [`ResourceError`](crate::resource::ResourceError);
//! the [`Error`] here covers everything around it: loading configuration,
//! binding the listener and wiring codecs.

use thiserror::Error;

/// Result type alias for service setup and lifecycle
pub type Result<T> = std::result::Result<T, Error>;

/// Service-level errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(Box<axum::http::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<axum::http::Error> for Error {
    fn from(err: axum::http::Error) -> Self {
        Error::Http(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_convert() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: port taken");
    }

    #[test]
    fn test_internal_display() {
        let err = Error::Internal("no encoder".to_string());
        assert_eq!(err.to_string(), "Internal server error: no encoder");
    }
}
