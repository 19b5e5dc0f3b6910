#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod assets;
mod client;
mod error;
mod generation;
#[doc(hidden)]
pub mod prelude;
mod service;
mod status;

pub use crate::client::{HdClient, HdConfig, HdConfigBuilder, HdCredentials, RemoteModel};
pub use crate::error::{Error, Result};
pub use crate::generation::{GenerationInputs, GenerationRequest};
pub use crate::service::{AvatarVideoService, JobSubmission, VideoRequest};
pub use crate::status::{GenerationJob, GenerationResult, JobStatus, RemoteGenerationStatus};

/// Tracing target for client plumbing and asset uploads.
pub const TRACING_TARGET: &str = "faceforge_hedra";
/// Tracing target for generation submission and polling.
pub const TRACING_TARGET_GENERATION: &str = "faceforge_hedra::generation";
