//! Core HTTP client for the Hedra generation API.

use reqwest::{Client as HttpClient, ClientBuilder, Method, RequestBuilder, Response};
use serde::Deserialize;

use crate::client::{HdConfig, HdCredentials};
use crate::{Error, Result, TRACING_TARGET};

/// How much of an error body is kept for diagnostics.
pub(crate) const BODY_PREVIEW_BYTES: usize = 400;

/// A generation model advertised by the `/models` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteModel {
    /// Model identifier
    pub id: String,
    /// Human-readable model name, when provided
    #[serde(default)]
    pub name: Option<String>,
}

/// HTTP client for the Hedra generation API.
///
/// Wraps a shared `reqwest` client with the configured timeouts and injects
/// the `x-api-key` header on every request. Higher-level operations (asset
/// upload, generation submission, status polling) are implemented in the
/// sibling modules on top of [`HdClient::request`].
#[derive(Debug, Clone)]
pub struct HdClient {
    http_client: HttpClient,
    config: HdConfig,
    credentials: HdCredentials,
}

impl HdClient {
    /// Create a new client with the given configuration and credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: HdConfig, credentials: HdCredentials) -> Result<Self> {
        let http_client = ClientBuilder::new()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http_client,
            config,
            credentials,
        })
    }

    /// Create a new client with default configuration.
    pub fn with_defaults(credentials: HdCredentials) -> Result<Self> {
        Self::new(HdConfig::default(), credentials)
    }

    /// Create a new client with default configuration and credentials read
    /// from the environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `HEDRA_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        Self::with_defaults(HdCredentials::from_env()?)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HdConfig {
        &self.config
    }

    /// Compose a full endpoint URL from an API path such as `/assets`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        let base = self.config.base_url().as_str().trim_end_matches('/');
        format!("{base}{path}")
    }

    /// Start an authenticated request against an API path.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http_client.request(method, self.endpoint(path));
        match &self.credentials {
            HdCredentials::ApiKey(key) => builder.header("x-api-key", key),
            HdCredentials::None => builder,
        }
    }

    /// Read the status and a truncated body from a failed response.
    pub(crate) async fn read_failure(response: Response) -> (u16, String) {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        (status, truncate_body(&body))
    }

    /// List the generation models the service advertises.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] on a non-success response; transport failures
    /// surface as [`Error::Http`].
    pub async fn list_models(&self) -> Result<Vec<RemoteModel>> {
        let response = self.request(Method::GET, "/models").send().await?;

        if !response.status().is_success() {
            let (status, body) = Self::read_failure(response).await;
            return Err(Error::api(status, body));
        }

        Ok(response.json().await?)
    }

    /// Determine the model id for generation submissions.
    ///
    /// The `/models` call doubles as a connectivity and credentials check;
    /// the configured model id is authoritative regardless of what the
    /// listing returns.
    pub async fn resolve_model_id(&self) -> Result<String> {
        let models = self.list_models().await?;

        if let Some(first) = models.first() {
            tracing::debug!(
                target: TRACING_TARGET,
                advertised = %first.id,
                configured = %self.config.model_id(),
                "resolved generation model"
            );
        } else {
            tracing::warn!(
                target: TRACING_TARGET,
                configured = %self.config.model_id(),
                "model listing is empty, using configured model id"
            );
        }

        Ok(self.config.model_id().to_owned())
    }
}

/// Truncate an error body for logging and error payloads.
pub(crate) fn truncate_body(body: &str) -> String {
    let mut end = body.len().min(BODY_PREVIEW_BYTES);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HdClient {
        HdClient::with_defaults(HdCredentials::api_key("test-key")).unwrap()
    }

    #[test]
    fn endpoint_composition() {
        let client = client();
        assert_eq!(
            client.endpoint("/assets"),
            "https://api.hedra.com/web-app/public/assets"
        );
        assert_eq!(
            client.endpoint("/generations/abc/status"),
            "https://api.hedra.com/web-app/public/generations/abc/status"
        );
    }

    #[test]
    fn endpoint_handles_trailing_slash() {
        let config = HdConfig::new("https://api.hedra.com/web-app/public/").unwrap();
        let client = HdClient::new(config, HdCredentials::none()).unwrap();
        assert_eq!(
            client.endpoint("/models"),
            "https://api.hedra.com/web-app/public/models"
        );
    }

    #[test]
    fn body_truncation_respects_char_boundaries() {
        let body = "é".repeat(BODY_PREVIEW_BYTES);
        let truncated = truncate_body(&body);
        assert!(truncated.len() <= BODY_PREVIEW_BYTES);
        assert!(truncated.chars().all(|c| c == 'é'));

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn remote_model_deserializes_without_name() {
        let model: RemoteModel = serde_json::from_str(r#"{"id":"m-1"}"#).unwrap();
        assert_eq!(model.id, "m-1");
        assert!(model.name.is_none());
    }
}
