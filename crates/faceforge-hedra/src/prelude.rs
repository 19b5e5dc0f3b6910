//! Commonly used types and traits.

pub use crate::client::{HdClient, HdConfig, HdConfigBuilder, HdCredentials};
pub use crate::error::{Error, Result};
pub use crate::service::{AvatarVideoService, JobSubmission, VideoRequest};
pub use crate::status::{GenerationJob, GenerationResult, JobStatus};
