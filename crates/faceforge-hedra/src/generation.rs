//! Generation submission.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::HdClient;
use crate::{Error, Result, TRACING_TARGET_GENERATION};

/// Creative inputs for a talking-avatar generation.
///
/// Optional fields are omitted from the wire payload entirely when unset so
/// the service applies its own defaults.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationInputs {
    /// Prompt steering the avatar performance
    pub text_prompt: String,
    /// Output resolution, e.g. `720p`
    pub resolution: String,
    /// Output aspect ratio, e.g. `16:9`
    pub aspect_ratio: String,
    /// Requested clip length in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Seed for reproducible output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

/// A complete generation submission payload.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    #[serde(rename = "type")]
    request_type: &'static str,
    ai_model_id: String,
    start_keyframe_id: String,
    audio_id: String,
    generated_video_inputs: GenerationInputs,
}

impl GenerationRequest {
    /// Assemble a video generation request from uploaded asset ids.
    pub fn new(
        model_id: impl Into<String>,
        image_asset_id: impl Into<String>,
        audio_asset_id: impl Into<String>,
        inputs: GenerationInputs,
    ) -> Self {
        Self {
            request_type: "video",
            ai_model_id: model_id.into(),
            start_keyframe_id: image_asset_id.into(),
            audio_id: audio_asset_id.into(),
            generated_video_inputs: inputs,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    id: String,
}

impl HdClient {
    /// Submit a generation request and return the job id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Submission`] on a non-success response.
    pub async fn submit_generation(&self, request: &GenerationRequest) -> Result<String> {
        let response = self
            .request(Method::POST, "/generations")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = Self::read_failure(response).await;
            tracing::error!(
                target: TRACING_TARGET_GENERATION,
                status,
                "generation submission failed"
            );
            return Err(Error::submission(status, body));
        }

        let submitted: GenerationResponse = response.json().await?;
        tracing::info!(
            target: TRACING_TARGET_GENERATION,
            job_id = %submitted.id,
            model_id = %request.ai_model_id,
            "submitted generation"
        );
        Ok(submitted.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> GenerationInputs {
        GenerationInputs {
            text_prompt: "a calm news anchor".to_owned(),
            resolution: "720p".to_owned(),
            aspect_ratio: "16:9".to_owned(),
            duration_ms: None,
            seed: None,
        }
    }

    #[test]
    fn request_wire_shape() {
        let request = GenerationRequest::new("model-1", "img-1", "aud-1", inputs());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["type"], "video");
        assert_eq!(json["ai_model_id"], "model-1");
        assert_eq!(json["start_keyframe_id"], "img-1");
        assert_eq!(json["audio_id"], "aud-1");
        assert_eq!(json["generated_video_inputs"]["text_prompt"], "a calm news anchor");
        assert_eq!(json["generated_video_inputs"]["resolution"], "720p");
        assert_eq!(json["generated_video_inputs"]["aspect_ratio"], "16:9");
    }

    #[test]
    fn unset_optionals_are_omitted() {
        let request = GenerationRequest::new("m", "i", "a", inputs());
        let json = serde_json::to_value(&request).unwrap();
        let video_inputs = json["generated_video_inputs"].as_object().unwrap();

        assert!(!video_inputs.contains_key("duration_ms"));
        assert!(!video_inputs.contains_key("seed"));
    }

    #[test]
    fn set_optionals_are_serialized() {
        let mut inputs = inputs();
        inputs.duration_ms = Some(5000);
        inputs.seed = Some(42);

        let request = GenerationRequest::new("m", "i", "a", inputs);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["generated_video_inputs"]["duration_ms"], 5000);
        assert_eq!(json["generated_video_inputs"]["seed"], 42);
    }
}
