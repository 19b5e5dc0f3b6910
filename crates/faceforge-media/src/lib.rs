#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for download operations.
pub const TRACING_TARGET_FETCH: &str = "faceforge_media::fetch";

/// Tracing target for format detection.
pub const TRACING_TARGET_SNIFF: &str = "faceforge_media::sniff";

/// Tracing target for format conversion.
pub const TRACING_TARGET_CONVERT: &str = "faceforge_media::convert";

mod asset;
mod convert;
mod error;
mod fetch;
#[doc(hidden)]
pub mod prelude;
mod sniff;

pub use crate::asset::{AssetKind, MediaAsset};
pub use crate::convert::{FfmpegConverter, MediaConverter};
pub use crate::error::{Error, Result};
pub use crate::fetch::{FetchConfig, FetchedMedia, MediaFetcher, MIN_ASSET_BYTES};
pub use crate::sniff::{resolve_format, ResolvedFormat};
