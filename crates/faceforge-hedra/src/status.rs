//! Job status retrieval and translation.
//!
//! The remote status document uses its own vocabulary and shifts fields
//! around depending on the job phase. [`GenerationJob::from_remote`] is a
//! pure projection of that document into the stable local view; the HTTP
//! fetch is a thin wrapper around it.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::HdClient;
use crate::{Error, Result, TRACING_TARGET_GENERATION};

/// Lifecycle states of a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::AsRefStr, strum::Display, strum::EnumString, strum::EnumIter)]
#[derive(serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, waiting to start
    Queued,
    /// Actively generating
    Processing,
    /// Finished with a downloadable result
    Completed,
    /// Finished unsuccessfully
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Raw status document returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteGenerationStatus {
    /// Remote status word
    pub status: String,
    /// Creation timestamp, verbatim
    pub created_at: Option<String>,
    /// Last update timestamp, verbatim
    pub updated_at: Option<String>,
    /// Completion fraction reported while processing
    pub progress: Option<f64>,
    /// Download URL, present once complete
    pub url: Option<String>,
    /// Result asset type, e.g. `video`
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    /// Identifier of the produced asset, when reported
    pub asset_id: Option<String>,
    /// Failure description reported on error
    pub error_message: Option<String>,
}

/// Downloadable output of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    /// Download URL of the rendered video
    pub video_url: String,
    /// Result asset type, when reported
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Creation timestamp, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Stable local view of a generation job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationJob {
    /// Job identifier
    pub job_id: String,
    /// Translated lifecycle state
    pub status: JobStatus,
    /// Creation timestamp, verbatim from the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// When work started, best known approximation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    /// When the job reached a terminal state, best known approximation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Stringified completion fraction, `0.0` when unreported
    pub progress: String,
    /// Result payload, present for completed jobs with a published url
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    /// Failure description, present for failed jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationJob {
    /// Project a remote status document into the local job view.
    ///
    /// The service does not report explicit start and completion times, so
    /// both are approximated from `updated_at` with `created_at` as the
    /// fallback. A completed job without a published url keeps its completed
    /// status with no result payload.
    pub fn from_remote(job_id: impl Into<String>, remote: &RemoteGenerationStatus) -> Self {
        let job_id = job_id.into();
        let status = map_status(&remote.status);
        let activity_time = remote.updated_at.clone().or_else(|| remote.created_at.clone());

        let started_at = (status != JobStatus::Queued).then(|| activity_time.clone()).flatten();
        let completed_at = status.is_terminal().then(|| activity_time).flatten();

        let result = if status == JobStatus::Completed {
            match &remote.url {
                Some(url) => Some(GenerationResult {
                    video_url: url.clone(),
                    kind: remote.asset_type.clone(),
                    created_at: remote.created_at.clone(),
                }),
                None => {
                    tracing::warn!(
                        target: TRACING_TARGET_GENERATION,
                        job_id = %job_id,
                        "job completed without a result url"
                    );
                    None
                }
            }
        } else {
            None
        };

        let error = (status == JobStatus::Failed).then(|| {
            format!(
                "Generation failed: {}",
                remote.error_message.as_deref().unwrap_or("Unknown error occurred")
            )
        });

        Self {
            job_id,
            status,
            created_at: remote.created_at.clone(),
            started_at,
            completed_at,
            progress: format_progress(remote.progress),
            result,
            error,
        }
    }
}

/// Stringify the completion fraction, defaulting to `0.0` when unreported.
///
/// Whole values keep one decimal place, so the surface reads as a fraction
/// (`0.0`, `1.0`) rather than a bare integer.
fn format_progress(progress: Option<f64>) -> String {
    let value = progress.unwrap_or(0.0);
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Translate the remote status word into a [`JobStatus`].
///
/// Unknown words degrade to [`JobStatus::Processing`] so a vocabulary change
/// on the remote side stalls polling instead of failing it.
fn map_status(remote: &str) -> JobStatus {
    match remote {
        "queued" => JobStatus::Queued,
        "processing" => JobStatus::Processing,
        "complete" => JobStatus::Completed,
        "error" => JobStatus::Failed,
        other => {
            tracing::warn!(
                target: TRACING_TARGET_GENERATION,
                remote_status = %other,
                "unknown remote status, treating as processing"
            );
            JobStatus::Processing
        }
    }
}

/// Map a non-success status response onto the error taxonomy.
fn classify_status_failure(status: u16, job_id: &str, body: String) -> Error {
    match status {
        404 => Error::job_not_found(job_id),
        422 => Error::invalid_job_id(job_id),
        _ => Error::api(status, body),
    }
}

impl HdClient {
    /// Fetch and translate the status of a generation job.
    ///
    /// # Errors
    ///
    /// - [`Error::JobNotFound`] when the service returns 404
    /// - [`Error::InvalidJobId`] when the service returns 422
    /// - [`Error::Api`] on any other non-success response
    pub async fn generation_status(&self, job_id: &str) -> Result<GenerationJob> {
        let response = self
            .request(Method::GET, &format!("/generations/{job_id}/status"))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = Self::read_failure(response).await;
            return Err(classify_status_failure(status, job_id, body));
        }

        let remote: RemoteGenerationStatus = response.json().await?;
        let job = GenerationJob::from_remote(job_id, &remote);

        tracing::debug!(
            target: TRACING_TARGET_GENERATION,
            job_id = %job_id,
            status = %job.status,
            progress = %job.progress,
            "fetched job status"
        );
        Ok(job)
    }
}
