//! End-to-end avatar video pipeline.
//!
//! [`AvatarVideoService`] drives the full flow: fetch the source image and
//! audio concurrently, resolve and normalize their formats, upload both
//! assets, submit the generation, and either return the job handle for the
//! caller to poll or block until the job reaches a terminal state.

use std::sync::Arc;

use faceforge_media::{
    AssetKind, FfmpegConverter, MediaAsset, MediaConverter, MediaFetcher, resolve_format,
};
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::HdClient;
use crate::generation::{GenerationInputs, GenerationRequest};
use crate::status::{GenerationJob, GenerationResult, JobStatus};
use crate::{Error, Result, TRACING_TARGET_GENERATION};

/// Input for a talking-avatar video generation.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    /// Where to download the keyframe image
    pub image_url: Url,
    /// Where to download the driving audio
    pub audio_url: Url,
    /// Prompt steering the avatar performance
    pub text_prompt: String,
    /// Output aspect ratio
    pub aspect_ratio: String,
    /// Output resolution
    pub resolution: String,
    /// Requested clip length in seconds
    pub duration: Option<f64>,
    /// Seed for reproducible output
    pub seed: Option<i64>,
}

impl VideoRequest {
    /// Create a request with default output settings (16:9 at 720p).
    pub fn new(image_url: Url, audio_url: Url, text_prompt: impl Into<String>) -> Self {
        Self {
            image_url,
            audio_url,
            text_prompt: text_prompt.into(),
            aspect_ratio: "16:9".to_owned(),
            resolution: "720p".to_owned(),
            duration: None,
            seed: None,
        }
    }

    /// Set the output aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = aspect_ratio.into();
        self
    }

    /// Set the output resolution.
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = resolution.into();
        self
    }

    /// Set the requested clip length in seconds.
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Set the generation seed.
    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Project the creative settings into the wire payload shape.
    ///
    /// Duration converts from seconds to whole milliseconds, rounded.
    fn inputs(&self) -> GenerationInputs {
        GenerationInputs {
            text_prompt: self.text_prompt.clone(),
            resolution: self.resolution.clone(),
            aspect_ratio: self.aspect_ratio.clone(),
            duration_ms: self.duration.map(|seconds| (seconds * 1000.0).round() as u64),
            seed: self.seed,
        }
    }
}

/// Handle returned by a non-blocking submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSubmission {
    /// Identifier to poll for status
    pub job_id: String,
    /// Initial lifecycle state
    pub status: JobStatus,
    /// Human-readable confirmation
    pub message: String,
}

/// End-to-end pipeline over an [`HdClient`].
#[derive(Clone)]
pub struct AvatarVideoService {
    client: HdClient,
    fetcher: MediaFetcher,
    converter: Arc<dyn MediaConverter>,
}

impl AvatarVideoService {
    /// Create a service with a default fetcher and the ffmpeg converter.
    ///
    /// # Errors
    ///
    /// Returns an error if the download client cannot be created.
    pub fn new(client: HdClient) -> Result<Self> {
        Ok(Self {
            client,
            fetcher: MediaFetcher::with_defaults()?,
            converter: Arc::new(FfmpegConverter::new()),
        })
    }

    /// Replace the media fetcher.
    pub fn with_fetcher(mut self, fetcher: MediaFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the media converter.
    pub fn with_converter(mut self, converter: Arc<dyn MediaConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Get the underlying API client.
    pub fn client(&self) -> &HdClient {
        &self.client
    }

    /// Download, normalize and upload one asset, returning its remote id.
    async fn ingest(&self, url: &Url, kind: AssetKind) -> Result<String> {
        let fetched = self.fetcher.fetch(url, kind).await?;
        let resolved = resolve_format(
            kind,
            &fetched.bytes,
            fetched.declared_content_type.as_deref(),
            url.path(),
        );

        let mut asset = MediaAsset::new(
            kind,
            resolved.filename,
            resolved.content_type,
            fetched.bytes,
        );
        if resolved.needs_transcode {
            asset = self.converter.convert(asset).await;
        }

        self.client.upload_media(asset, self.converter.as_ref()).await
    }

    /// Ingest both assets and submit a generation, without waiting for it.
    ///
    /// Image and audio are ingested concurrently; the first failure aborts
    /// the submission.
    ///
    /// # Errors
    ///
    /// Propagates ingestion failures ([`Error::Media`], [`Error::Upload`])
    /// and submission rejections ([`Error::Submission`]).
    pub async fn submit(&self, request: &VideoRequest) -> Result<JobSubmission> {
        let model_id = self.client.resolve_model_id().await?;

        let (image_asset_id, audio_asset_id) = futures::try_join!(
            self.ingest(&request.image_url, AssetKind::Image),
            self.ingest(&request.audio_url, AssetKind::Audio),
        )?;

        let generation =
            GenerationRequest::new(model_id, image_asset_id, audio_asset_id, request.inputs());
        let job_id = self.client.submit_generation(&generation).await?;

        Ok(JobSubmission {
            job_id,
            status: JobStatus::Queued,
            message: "Video generation job submitted successfully".to_owned(),
        })
    }

    /// Fetch the current status of a previously submitted job.
    ///
    /// The identifier is normalized first; ids copied out of JSON payloads
    /// tend to arrive with stray quotes.
    pub async fn status(&self, job_id: &str) -> Result<GenerationJob> {
        let job_id = normalize_job_id(job_id);
        self.client.generation_status(&job_id).await
    }

    /// Submit a generation and block until it finishes.
    ///
    /// Equivalent to [`generate_cancellable`](Self::generate_cancellable)
    /// with a token that never fires.
    pub async fn generate(&self, request: &VideoRequest) -> Result<GenerationResult> {
        self.generate_cancellable(request, CancellationToken::new())
            .await
    }

    /// Submit a generation and poll until a terminal state, the configured
    /// maximum wait, or cancellation.
    ///
    /// # Errors
    ///
    /// - [`Error::GenerationFailed`] when the job ends in failure
    /// - [`Error::MissingResult`] when the job completes without a url
    /// - [`Error::PollTimeout`] when the maximum wait elapses
    /// - [`Error::Cancelled`] when the token fires between polls
    pub async fn generate_cancellable(
        &self,
        request: &VideoRequest,
        cancel: CancellationToken,
    ) -> Result<GenerationResult> {
        let submission = self.submit(request).await?;
        let job_id = submission.job_id;

        let poll_interval = self.client.config().poll_interval();
        let max_poll_wait = self.client.config().max_poll_wait();
        let started = Instant::now();

        loop {
            let job = self.client.generation_status(&job_id).await?;

            match job.status {
                JobStatus::Completed => {
                    tracing::info!(
                        target: TRACING_TARGET_GENERATION,
                        job_id = %job_id,
                        waited = ?started.elapsed(),
                        "generation finished"
                    );
                    return job.result.ok_or_else(|| Error::missing_result(&job_id));
                }
                JobStatus::Failed => {
                    let message = job
                        .error
                        .unwrap_or_else(|| "Generation failed: Unknown error occurred".to_owned());
                    return Err(Error::generation_failed(message));
                }
                JobStatus::Queued | JobStatus::Processing => {}
            }

            let waited = started.elapsed();
            if waited >= max_poll_wait {
                return Err(Error::poll_timeout(job_id, waited));
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
    }
}

/// Strip whitespace and stray quote characters from a job identifier.
///
/// Handles both literal quotes and their percent-encoded forms, which show
/// up when an id copied out of a JSON payload lands in a URL path.
fn normalize_job_id(raw: &str) -> String {
    let mut id = raw.trim();
    for encoded in ["%22", "%27"] {
        id = id.strip_prefix(encoded).unwrap_or(id);
        id = id.strip_suffix(encoded).unwrap_or(id);
    }
    id.trim_matches(|c| c == '"' || c == '\'').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> VideoRequest {
        VideoRequest::new(
            Url::parse("https://cdn.example.com/face.png").unwrap(),
            Url::parse("https://cdn.example.com/voice.mp3").unwrap(),
            "a calm news anchor",
        )
    }

    #[test]
    fn request_defaults() {
        let request = request();
        assert_eq!(request.aspect_ratio, "16:9");
        assert_eq!(request.resolution, "720p");
        assert!(request.duration.is_none());
        assert!(request.seed.is_none());
    }

    #[test]
    fn duration_converts_to_whole_milliseconds() {
        let inputs = request().with_duration(1.5).inputs();
        assert_eq!(inputs.duration_ms, Some(1500));

        let inputs = request().with_duration(2.0004).inputs();
        assert_eq!(inputs.duration_ms, Some(2000));

        let inputs = request().with_duration(0.0015).inputs();
        assert_eq!(inputs.duration_ms, Some(2));

        let inputs = request().inputs();
        assert_eq!(inputs.duration_ms, None);
    }

    #[test]
    fn creative_settings_flow_through() {
        let inputs = request()
            .with_aspect_ratio("9:16")
            .with_resolution("1080p")
            .with_seed(42)
            .inputs();

        assert_eq!(inputs.aspect_ratio, "9:16");
        assert_eq!(inputs.resolution, "1080p");
        assert_eq!(inputs.seed, Some(42));
        assert_eq!(inputs.text_prompt, "a calm news anchor");
    }

    #[test]
    fn job_ids_are_normalized() {
        assert_eq!(normalize_job_id("abc-123"), "abc-123");
        assert_eq!(normalize_job_id("  abc-123  "), "abc-123");
        assert_eq!(normalize_job_id("\"abc-123\""), "abc-123");
        assert_eq!(normalize_job_id("'abc-123'"), "abc-123");
        assert_eq!(normalize_job_id(" \"abc-123\" "), "abc-123");
        assert_eq!(normalize_job_id("%22abc-123%22"), "abc-123");
        assert_eq!(normalize_job_id("%27abc-123%27"), "abc-123");
    }

    #[test]
    fn submission_serializes() {
        let submission = JobSubmission {
            job_id: "job-1".to_owned(),
            status: JobStatus::Queued,
            message: "Video generation job submitted successfully".to_owned(),
        };
        let json = serde_json::to_value(&submission).unwrap();

        assert_eq!(json["job_id"], "job-1");
        assert_eq!(json["status"], "queued");
    }
}
