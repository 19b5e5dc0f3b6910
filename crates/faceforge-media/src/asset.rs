//! Media asset classification and the in-flight asset value.
//!
//! This module provides [`AssetKind`] for classifying assets into the two
//! categories the remote generation service accepts, and [`MediaAsset`], the
//! ephemeral value that travels through the ingestion pipeline.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Logical kind of a media asset.
///
/// The serialized form matches the remote service's `type` field on asset
/// creation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, EnumIter)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Still image used as the start keyframe
    Image,
    /// Audio clip driving the avatar
    Audio,
}

impl AssetKind {
    /// Check if this kind represents an image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image)
    }

    /// Check if this kind represents audio.
    #[must_use]
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio)
    }

    /// Default content type assumed when detection yields nothing.
    #[must_use]
    pub fn default_content_type(&self) -> &'static str {
        match self {
            Self::Image => "image/jpeg",
            Self::Audio => "audio/mpeg",
        }
    }

    /// Default filename stem used when the source URL has no usable name.
    #[must_use]
    pub fn default_stem(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }

    /// `Accept` header sent when downloading an asset of this kind.
    #[must_use]
    pub fn accept_header(&self) -> &'static str {
        match self {
            Self::Image => "image/*, */*",
            Self::Audio => "audio/*, */*",
        }
    }

    /// Check whether a content type is one the remote service accepts
    /// for this kind without conversion.
    #[must_use]
    pub fn accepts(&self, content_type: &str) -> bool {
        match self {
            Self::Image => matches!(content_type, "image/jpeg" | "image/png"),
            Self::Audio => matches!(content_type, "audio/mpeg" | "audio/mp3"),
        }
    }
}

/// A media asset in flight through the ingestion pipeline.
///
/// Created after download and format resolution, consumed by the upload step,
/// and discarded once the remote service has acknowledged the bytes. Never
/// persisted. The `content_type` always reflects the resolved (magic-byte
/// verified) format and the filename extension is kept consistent with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    /// Logical kind of the asset
    pub kind: AssetKind,
    /// Filename reported to the remote service
    pub filename: String,
    /// Resolved MIME type of the payload
    pub content_type: String,
    /// Raw payload bytes
    pub bytes: Bytes,
}

impl MediaAsset {
    /// Create a new asset value.
    pub fn new(
        kind: AssetKind,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            kind,
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Check whether the asset is already in a format the remote service
    /// accepts for its kind.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.kind.accepts(&self.content_type)
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
