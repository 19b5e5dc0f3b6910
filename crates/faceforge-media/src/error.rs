//! Error types for faceforge-media.

/// Result type for all media operations in this crate.
///
/// This is a convenience type alias that defaults to using [`Error`] as the error type.
/// Most functions in this crate return this type for consistent error handling.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for media ingestion operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP client errors (connection, timeout, redirect loops, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Download failed or the downloaded body is not a usable asset
    #[error("Download failed for '{url}': {message}")]
    Download {
        /// The URL that failed
        url: String,
        /// HTTP status code, when the server responded
        status: Option<u16>,
        /// Description of the failure
        message: String,
    },

    /// Downloaded payload is too small to be real media
    #[error("Downloaded file from '{url}' is too small ({size} bytes); likely an error page")]
    SizeValidation {
        /// The URL that produced the payload
        url: String,
        /// Actual payload size in bytes
        size: usize,
        /// Truncated body for diagnostics
        body: String,
    },

    /// File I/O errors during the conversion round-trip
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },
}

impl Error {
    /// Create a download error.
    pub fn download(
        url: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Download {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a size validation error.
    pub fn size_validation(url: impl Into<String>, size: usize, body: impl Into<String>) -> Self {
        Self::SizeValidation {
            url: url.into(),
            size,
            body: body.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get the HTTP status code if this error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Download { status, .. } => *status,
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error indicates a temporary failure that might succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(err) => err.is_timeout() || err.is_connect(),
            Error::Download { status, .. } => matches!(status, Some(s) if *s >= 500),
            Error::SizeValidation { .. } | Error::Io(_) | Error::Config { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_display() {
        let err = Error::download("https://example.com/a.jpg", Some(403), "access denied");
        let text = err.to_string();
        assert!(text.contains("https://example.com/a.jpg"));
        assert!(text.contains("access denied"));
        assert_eq!(err.status_code(), Some(403));
    }

    #[test]
    fn test_retryable() {
        assert!(Error::download("u", Some(503), "oops").is_retryable());
        assert!(!Error::download("u", Some(404), "missing").is_retryable());
        assert!(!Error::size_validation("u", 12, "<xml/>").is_retryable());
        assert!(!Error::config("bad").is_retryable());
    }
}
