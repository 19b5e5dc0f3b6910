//! Authentication credentials
//!
//! The Hedra API authenticates requests with an `x-api-key` header.

use crate::{Error, Result};

/// Environment variable consulted by [`HdCredentials::from_env`].
pub const API_KEY_ENV: &str = "HEDRA_API_KEY";

/// Authentication credentials for the Hedra API.
#[derive(Debug, Clone)]
pub enum HdCredentials {
    /// API key authentication
    ApiKey(String),
    /// No authentication (for testing/development)
    None,
}

impl HdCredentials {
    /// Create API key credentials
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    /// Create credentials with no authentication
    pub fn none() -> Self {
        Self::None
    }

    /// Read the API key from the `HEDRA_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::ApiKey(key)),
            _ => Err(Error::config(format!("{API_KEY_ENV} is not set"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials() {
        let api_key = HdCredentials::api_key("test-key");
        let none = HdCredentials::none();

        match api_key {
            HdCredentials::ApiKey(key) => assert_eq!(key, "test-key"),
            _ => panic!("Expected API key credentials"),
        }

        match none {
            HdCredentials::None => {}
            _ => panic!("Expected no credentials"),
        }
    }
}
