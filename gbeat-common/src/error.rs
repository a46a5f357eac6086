//! Common error types for GlitchBeat

use thiserror::Error;

/// Common result type for GlitchBeat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across GlitchBeat microservices
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level HTTP failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream service answered with a non-success status
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Response body could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::Upstream {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "Upstream returned 403: forbidden");

        let err = Error::InvalidInput("tempo".to_string());
        assert_eq!(err.to_string(), "Invalid input: tempo");
    }
}
