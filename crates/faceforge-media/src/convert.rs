//! Normalizing assets to the canonical wire formats.
//!
//! The remote generation service reliably accepts JPEG images and MP3 audio.
//! Anything else detected during ingestion is run through a converter before
//! upload. Conversion is best-effort by contract: a missing tool or a failed
//! conversion returns the original asset unchanged, and the upload step stays
//! the authoritative point of failure.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::process::Command;

use crate::asset::{AssetKind, MediaAsset};
use crate::TRACING_TARGET_CONVERT;

/// Converter capability for normalizing media to canonical formats.
///
/// Implementations must absorb their own failures: when conversion is not
/// possible (tool unavailable, conversion error), the input asset is returned
/// unchanged rather than an error being raised. Callers detect "conversion
/// not possible" by comparing the returned asset with the input.
#[async_trait]
pub trait MediaConverter: Send + Sync {
    /// Convert an asset to the canonical format for its kind
    /// (image → high-quality JPEG, audio → 128kbps MP3).
    async fn convert(&self, asset: MediaAsset) -> MediaAsset;
}

/// [`MediaConverter`] backed by an external `ffmpeg` binary.
///
/// Invokes ffmpeg with a fixed command template over temporary input/output
/// files; the temporary directory is removed on every exit path, including
/// conversion failure.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    binary: String,
}

impl FfmpegConverter {
    /// Create a converter using `ffmpeg` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: "ffmpeg".to_owned(),
        }
    }

    /// Create a converter using a specific binary path.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Canonical output filename and the fixed argument template per kind.
    fn target(kind: AssetKind) -> (&'static str, &'static str, &'static [&'static str]) {
        match kind {
            // high-quality JPEG
            AssetKind::Image => ("image/jpeg", "image.jpg", &["-q:v", "2"]),
            // 128kbps MP3
            AssetKind::Audio => ("audio/mpeg", "audio.mp3", &["-acodec", "libmp3lame", "-ab", "128k"]),
        }
    }

    async fn try_convert(&self, asset: &MediaAsset) -> std::io::Result<Option<MediaAsset>> {
        let (content_type, filename, codec_args) = Self::target(asset.kind);

        // TempDir removes the whole round-trip directory on drop, which
        // covers every exit path below.
        let workdir = tempfile::Builder::new()
            .prefix("faceforge-convert-")
            .tempdir()?;

        let input_ext = asset
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("bin");
        let input_path = workdir.path().join(format!("input.{input_ext}"));
        let output_path = workdir.path().join(filename);

        tokio::fs::write(&input_path, &asset.bytes).await?;

        let output = Command::new(&self.binary)
            .arg("-i")
            .arg(&input_path)
            .args(codec_args)
            .arg("-y")
            .arg(&output_path)
            .output()
            .await?;

        if !output.status.success() {
            tracing::warn!(
                target: TRACING_TARGET_CONVERT,
                kind = %asset.kind,
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "converter exited with failure"
            );
            return Ok(None);
        }

        let converted = match tokio::fs::read(&output_path).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            _ => {
                tracing::warn!(
                    target: TRACING_TARGET_CONVERT,
                    kind = %asset.kind,
                    "converter produced no output file"
                );
                return Ok(None);
            }
        };

        Ok(Some(MediaAsset {
            kind: asset.kind,
            filename: filename.to_owned(),
            content_type: content_type.to_owned(),
            bytes: Bytes::from(converted),
        }))
    }
}

impl Default for FfmpegConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaConverter for FfmpegConverter {
    async fn convert(&self, asset: MediaAsset) -> MediaAsset {
        tracing::debug!(
            target: TRACING_TARGET_CONVERT,
            kind = %asset.kind,
            from = %asset.content_type,
            size = asset.len(),
            "converting asset to canonical format"
        );

        match self.try_convert(&asset).await {
            Ok(Some(converted)) => {
                tracing::info!(
                    target: TRACING_TARGET_CONVERT,
                    kind = %converted.kind,
                    content_type = %converted.content_type,
                    original_size = asset.len(),
                    converted_size = converted.len(),
                    "converted asset"
                );
                converted
            }
            Ok(None) => asset,
            Err(e) => {
                // Typically the binary is not installed; conversion is
                // best-effort, the upload step reports the real failure.
                tracing::warn!(
                    target: TRACING_TARGET_CONVERT,
                    binary = %self.binary,
                    error = %e,
                    "converter unavailable, keeping original payload"
                );
                asset
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_asset() -> MediaAsset {
        let mut bytes = b"RIFF\x24\x08\x00\x00WAVEfmt ".to_vec();
        bytes.resize(256, 0);
        MediaAsset::new(AssetKind::Audio, "voice.wav", "audio/wav", bytes)
    }

    #[tokio::test]
    async fn missing_binary_returns_original() {
        let converter = FfmpegConverter::with_binary("faceforge-no-such-binary");
        let original = wav_asset();
        let result = converter.convert(original.clone()).await;
        assert_eq!(result, original);
    }

    #[test]
    fn target_templates_are_canonical() {
        let (ct, name, args) = FfmpegConverter::target(AssetKind::Image);
        assert_eq!(ct, "image/jpeg");
        assert_eq!(name, "image.jpg");
        assert_eq!(args, &["-q:v", "2"]);

        let (ct, name, args) = FfmpegConverter::target(AssetKind::Audio);
        assert_eq!(ct, "audio/mpeg");
        assert_eq!(name, "audio.mp3");
        assert!(args.contains(&"libmp3lame"));
        assert!(args.contains(&"128k"));
    }

    /// Deterministic converter used to exercise calling code without ffmpeg.
    struct FakeConverter;

    #[async_trait]
    impl MediaConverter for FakeConverter {
        async fn convert(&self, asset: MediaAsset) -> MediaAsset {
            let (content_type, filename, _) = FfmpegConverter::target(asset.kind);
            MediaAsset {
                kind: asset.kind,
                filename: filename.to_owned(),
                content_type: content_type.to_owned(),
                bytes: Bytes::from_static(b"converted"),
            }
        }
    }

    #[tokio::test]
    async fn converter_trait_is_object_safe() {
        let converter: Box<dyn MediaConverter> = Box::new(FakeConverter);
        let result = converter.convert(wav_asset()).await;
        assert_eq!(result.filename, "audio.mp3");
        assert_eq!(result.content_type, "audio/mpeg");
    }
}
