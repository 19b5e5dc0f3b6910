//! HTTP client plumbing for the Hedra generation API.

mod credentials;
mod hd_client;
mod hd_config;

pub use credentials::HdCredentials;
pub use hd_client::{HdClient, RemoteModel};
pub use hd_config::{HdConfig, HdConfigBuilder};
