//! Prelude for the faceforge-media crate
//!
//! This module re-exports the most commonly used types and traits from the crate
//! to provide a convenient single import for users.

pub use crate::asset::{AssetKind, MediaAsset};
pub use crate::convert::{FfmpegConverter, MediaConverter};
pub use crate::error::{Error, Result};
pub use crate::fetch::{FetchConfig, MediaFetcher};
pub use crate::sniff::{resolve_format, ResolvedFormat};
