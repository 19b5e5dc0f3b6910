//! Error types for Hedra API interactions.

use std::time::Duration;

/// Convenience alias with this crate's [`Error`] as the default error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during asset upload, generation submission and
/// job polling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level HTTP failure.
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an unexpected response.
    #[error("api error (status {status}): {body}")]
    Api {
        /// HTTP status code of the response
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Asset record creation was rejected.
    #[error("asset creation failed (status {status}): {body}")]
    AssetCreation {
        /// HTTP status code of the response
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Asset byte upload was rejected.
    #[error("asset upload failed (status {status}): {body}")]
    Upload {
        /// HTTP status code of the response
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Generation submission was rejected.
    #[error("generation submission failed (status {status}): {body}")]
    Submission {
        /// HTTP status code of the response
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// The requested job does not exist.
    #[error("job not found: {job_id}")]
    JobNotFound {
        /// Identifier of the missing job
        job_id: String,
    },

    /// The job identifier is not a well-formed id.
    #[error("invalid job id: {job_id}")]
    InvalidJobId {
        /// The rejected identifier
        job_id: String,
    },

    /// The remote service reported the generation as failed.
    #[error("{message}")]
    GenerationFailed {
        /// Failure description, prefixed by the remote error message
        message: String,
    },

    /// The job completed but no result payload was published.
    #[error("job {job_id} completed without a result url")]
    MissingResult {
        /// Identifier of the completed job
        job_id: String,
    },

    /// Blocking wait exceeded the configured maximum.
    #[error("job {job_id} did not finish within {waited:?}")]
    PollTimeout {
        /// Identifier of the job being waited on
        job_id: String,
        /// Total time spent waiting
        waited: Duration,
    },

    /// The wait was cancelled by the caller.
    #[error("generation wait cancelled")]
    Cancelled,

    /// Client configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Failure while fetching or preparing a media asset.
    #[error("media error: {0}")]
    Media(#[from] faceforge_media::Error),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an API error from a response status and body.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Create an asset creation error.
    pub fn asset_creation(status: u16, body: impl Into<String>) -> Self {
        Self::AssetCreation {
            status,
            body: body.into(),
        }
    }

    /// Create an upload error.
    pub fn upload(status: u16, body: impl Into<String>) -> Self {
        Self::Upload {
            status,
            body: body.into(),
        }
    }

    /// Create a submission error.
    pub fn submission(status: u16, body: impl Into<String>) -> Self {
        Self::Submission {
            status,
            body: body.into(),
        }
    }

    /// Create a job-not-found error.
    pub fn job_not_found(job_id: impl Into<String>) -> Self {
        Self::JobNotFound {
            job_id: job_id.into(),
        }
    }

    /// Create an invalid-job-id error.
    pub fn invalid_job_id(job_id: impl Into<String>) -> Self {
        Self::InvalidJobId {
            job_id: job_id.into(),
        }
    }

    /// Create a generation-failed error.
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::GenerationFailed {
            message: message.into(),
        }
    }

    /// Create a missing-result error.
    pub fn missing_result(job_id: impl Into<String>) -> Self {
        Self::MissingResult {
            job_id: job_id.into(),
        }
    }

    /// Create a poll-timeout error.
    pub fn poll_timeout(job_id: impl Into<String>, waited: Duration) -> Self {
        Self::PollTimeout {
            job_id: job_id.into(),
            waited,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get the HTTP status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. }
            | Self::AssetCreation { status, .. }
            | Self::Upload { status, .. }
            | Self::Submission { status, .. } => Some(*status),
            Self::Media(e) => e.status_code(),
            _ => None,
        }
    }

    /// Whether the operation may succeed if retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. }
            | Self::AssetCreation { status, .. }
            | Self::Upload { status, .. }
            | Self::Submission { status, .. } => *status >= 500 || *status == 429,
            Self::Media(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::upload(415, "Unsupported media type");
        assert_eq!(
            err.to_string(),
            "asset upload failed (status 415): Unsupported media type"
        );

        let err = Error::job_not_found("abc-123");
        assert_eq!(err.to_string(), "job not found: abc-123");

        let err = Error::generation_failed("Generation failed: invalid keyframe");
        assert_eq!(err.to_string(), "Generation failed: invalid keyframe");
    }

    #[test]
    fn status_codes() {
        assert_eq!(Error::api(503, "unavailable").status_code(), Some(503));
        assert_eq!(Error::upload(422, "bad").status_code(), Some(422));
        assert_eq!(Error::job_not_found("x").status_code(), None);
        assert_eq!(Error::Cancelled.status_code(), None);
    }

    #[test]
    fn retryable_classification() {
        assert!(Error::api(502, "bad gateway").is_retryable());
        assert!(Error::submission(429, "slow down").is_retryable());
        assert!(!Error::upload(415, "unsupported").is_retryable());
        assert!(!Error::invalid_job_id("x").is_retryable());
        assert!(!Error::Cancelled.is_retryable());
    }

    #[test]
    fn media_errors_convert() {
        let media = faceforge_media::Error::config("bad fetch config");
        let err: Error = media.into();
        assert!(matches!(err, Error::Media(_)));
        assert!(err.to_string().contains("bad fetch config"));
    }
}
