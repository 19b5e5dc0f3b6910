//! Configuration for the Hedra HTTP client.

use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Public Hedra web-app API root.
pub const DEFAULT_BASE_URL: &str = "https://api.hedra.com/web-app/public";

/// Generation model used unless the caller overrides it.
///
/// The `/models` listing is advisory only; the service ties billing and
/// output characteristics to this specific model id.
pub const DEFAULT_MODEL_ID: &str = "d1dd37a3-e39a-4854-a298-6510289f9cf2";

/// Configuration for the Hedra HTTP client.
///
/// # Examples
///
/// ```ignore
/// use faceforge_hedra::HdConfig;
/// use std::time::Duration;
///
/// // Default configuration against the public API
/// let config = HdConfig::default();
///
/// // Advanced configuration
/// let config = HdConfig::builder()
///     .base_url("https://api.hedra.com/web-app/public")
///     .timeout(Duration::from_secs(60))
///     .poll_interval(Duration::from_secs(2))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HdConfig {
    /// Base URL of the Hedra API
    base_url: Url,

    /// Request timeout duration
    timeout: Duration,

    /// Connection timeout duration
    connect_timeout: Duration,

    /// User agent string for HTTP requests
    user_agent: String,

    /// Generation model id sent with every submission
    model_id: String,

    /// Delay between status polls in blocking mode
    poll_interval: Duration,

    /// Maximum total time to wait for a job in blocking mode
    max_poll_wait: Duration,
}

impl HdConfig {
    /// Create a new configuration with the given base URL and default settings.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref()).map_err(|e| {
            Error::config(format!("Invalid base URL '{}': {}", base_url.as_ref(), e))
        })?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("faceforge-hedra/{}", env!("CARGO_PKG_VERSION")),
            model_id: DEFAULT_MODEL_ID.to_owned(),
            poll_interval: Duration::from_secs(5),
            max_poll_wait: Duration::from_secs(15 * 60),
        })
    }

    /// Create a new configuration builder.
    pub fn builder() -> HdConfigBuilder {
        HdConfigBuilder::default()
    }

    /// Get the base URL of the Hedra API.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the connection timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Get the user agent string.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get the generation model id.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Get the delay between status polls.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Get the maximum total blocking wait.
    pub fn max_poll_wait(&self) -> Duration {
        self.max_poll_wait
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the generation model id.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the delay between status polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the maximum total blocking wait.
    pub fn with_max_poll_wait(mut self, wait: Duration) -> Self {
        self.max_poll_wait = wait;
        self
    }
}

impl Default for HdConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).expect("Default URL should be valid")
    }
}

/// Builder for [`HdConfig`].
#[derive(Debug, Default)]
pub struct HdConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    model_id: Option<String>,
    poll_interval: Option<Duration>,
    max_poll_wait: Option<Duration>,
}

impl HdConfigBuilder {
    /// Set the base URL of the Hedra API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the generation model id.
    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Set the delay between status polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set the maximum total blocking wait.
    pub fn max_poll_wait(mut self, wait: Duration) -> Self {
        self.max_poll_wait = Some(wait);
        self
    }

    /// Build the configuration.
    ///
    /// Falls back to [`DEFAULT_BASE_URL`] when no base URL is set.
    pub fn build(self) -> Result<HdConfig> {
        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        let mut config = HdConfig::new(base_url)?;

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        if let Some(connect_timeout) = self.connect_timeout {
            config = config.with_connect_timeout(connect_timeout);
        }

        if let Some(user_agent) = self.user_agent {
            config = config.with_user_agent(user_agent);
        }

        if let Some(model_id) = self.model_id {
            config = config.with_model_id(model_id);
        }

        if let Some(poll_interval) = self.poll_interval {
            config = config.with_poll_interval(poll_interval);
        }

        if let Some(max_poll_wait) = self.max_poll_wait {
            config = config.with_max_poll_wait(max_poll_wait);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HdConfig::default();
        assert_eq!(
            config.base_url().as_str(),
            "https://api.hedra.com/web-app/public"
        );
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.model_id(), DEFAULT_MODEL_ID);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.max_poll_wait(), Duration::from_secs(900));
    }

    #[test]
    fn test_invalid_url() {
        let result = HdConfig::new("not a valid url");
        assert!(result.is_err());
    }

    #[test]
    fn test_builder() {
        let config = HdConfig::builder()
            .base_url("https://staging.hedra.internal/api")
            .timeout(Duration::from_secs(60))
            .model_id("custom-model")
            .poll_interval(Duration::from_secs(2))
            .max_poll_wait(Duration::from_secs(120))
            .build()
            .unwrap();

        assert_eq!(config.base_url().scheme(), "https");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.model_id(), "custom-model");
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.max_poll_wait(), Duration::from_secs(120));
    }

    #[test]
    fn test_builder_defaults_base_url() {
        let config = HdConfig::builder().build().unwrap();
        assert_eq!(config.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_fluent_api() {
        let config = HdConfig::default()
            .with_timeout(Duration::from_secs(45))
            .with_model_id("other-model")
            .with_user_agent("faceforge-test/1.0");

        assert_eq!(config.timeout(), Duration::from_secs(45));
        assert_eq!(config.model_id(), "other-model");
        assert_eq!(config.user_agent(), "faceforge-test/1.0");
    }
}
