//! Format detection for downloaded media.
//!
//! Source servers routinely lie about what they serve: storage links hand out
//! `application/octet-stream`, recorder uploads label WebM blobs as MP3, and
//! extensionless URLs carry no hint at all. Resolution therefore runs an
//! ordered chain of classifiers, each consulted only when the previous one
//! has no answer:
//!
//! 1. magic-byte signatures (authoritative, overrides any declared type)
//! 2. the declared `Content-Type` header, unless generic
//! 3. an extension-derived guess from the URL path
//! 4. the per-kind default
//!
//! The resolved filename extension is rewritten to agree with the resolved
//! content type whenever they disagree.

use crate::asset::AssetKind;
use crate::TRACING_TARGET_SNIFF;

/// Outcome of format resolution for a downloaded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFormat {
    /// Resolved MIME type
    pub content_type: String,
    /// Filename consistent with the resolved type
    pub filename: String,
    /// Whether the payload must be converted before upload
    pub needs_transcode: bool,
}

/// Resolve the true format of a downloaded payload.
///
/// # Arguments
///
/// * `kind` - Logical kind the caller requested (image or audio)
/// * `bytes` - Raw downloaded payload
/// * `declared` - `Content-Type` header reported by the source server, if any
/// * `url_path` - Path component of the source URL, used for the filename and
///   the extension fallback
pub fn resolve_format(
    kind: AssetKind,
    bytes: &[u8],
    declared: Option<&str>,
    url_path: &str,
) -> ResolvedFormat {
    let mut content_type = sniff_magic(kind, bytes)
        .map(str::to_owned)
        .or_else(|| declared_content_type(declared))
        .or_else(|| extension_content_type(url_path).map(str::to_owned))
        .unwrap_or_else(|| kind.default_content_type().to_owned());

    // A video label on an audio asset is a misclassification of its audio
    // track. Magic-detected WebM keeps its label so conversion triggers;
    // non-video types (e.g. a WEBP payload) keep theirs too and are only
    // flagged for conversion below.
    if kind.is_audio()
        && content_type.starts_with("video/")
        && content_type != "video/webm"
    {
        tracing::warn!(
            target: TRACING_TARGET_SNIFF,
            content_type = %content_type,
            "video content type resolved for audio asset, coercing to audio/mpeg"
        );
        content_type = AssetKind::Audio.default_content_type().to_owned();
    }

    let filename = resolve_filename(kind, &content_type, url_path);
    let needs_transcode = !kind.accepts(&content_type);

    tracing::debug!(
        target: TRACING_TARGET_SNIFF,
        kind = %kind,
        declared = declared.unwrap_or("<none>"),
        content_type = %content_type,
        filename = %filename,
        needs_transcode,
        "resolved media format"
    );

    ResolvedFormat {
        content_type,
        filename,
        needs_transcode,
    }
}

/// Classify a payload by its leading magic bytes.
///
/// Only signatures relevant to the requested kind are considered; a match is
/// authoritative and overrides whatever the source server declared.
fn sniff_magic(kind: AssetKind, bytes: &[u8]) -> Option<&'static str> {
    match kind {
        AssetKind::Image => {
            if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
                Some("image/jpeg")
            } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
                Some("image/png")
            } else if is_riff_webp(bytes) {
                Some("image/webp")
            } else if bytes.starts_with(b"GIF8") {
                Some("image/gif")
            } else {
                None
            }
        }
        AssetKind::Audio => {
            if bytes.starts_with(b"ID3")
                || bytes.starts_with(&[0xFF, 0xFB])
                || bytes.starts_with(&[0xFF, 0xF3])
            {
                Some("audio/mpeg")
            } else if is_riff_webp(bytes) {
                // RIFF container holding WEBP, not audio at all
                Some("image/webp")
            } else if bytes.starts_with(b"RIFF") {
                Some("audio/wav")
            } else if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
                // EBML header: WebM container, audio-bearing but unsupported
                // by the remote service, so it must be flagged for conversion
                Some("video/webm")
            } else {
                None
            }
        }
    }
}

fn is_riff_webp(bytes: &[u8]) -> bool {
    bytes.starts_with(b"RIFF") && bytes.len() >= 12 && &bytes[8..12] == b"WEBP"
}

/// Accept the declared header only when it actually says something.
fn declared_content_type(declared: Option<&str>) -> Option<String> {
    let declared = declared?.split(';').next()?.trim().to_ascii_lowercase();
    if declared.is_empty() || declared == "application/octet-stream" {
        return None;
    }
    Some(declared)
}

/// Guess a content type from the URL path extension.
fn extension_content_type(url_path: &str) -> Option<&'static str> {
    let ext = path_extension(url_path)?;
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        _ => return None,
    };
    Some(mime)
}

/// Canonical filename extension for a resolved content type.
fn extension_for(kind: AssetKind, content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" => "wav",
        "audio/mp4" => "m4a",
        "audio/aac" => "aac",
        "audio/ogg" => "ogg",
        "video/webm" => "webm",
        _ => match kind {
            AssetKind::Image => "jpg",
            AssetKind::Audio => "mp3",
        },
    }
}

/// Build a filename consistent with the resolved content type.
///
/// The URL basename is kept when its extension already agrees with the
/// resolved type; otherwise the kind's default stem gets the canonical
/// extension.
fn resolve_filename(kind: AssetKind, content_type: &str, url_path: &str) -> String {
    let basename = url_path.rsplit('/').next().unwrap_or_default();

    if let Some(guessed) = extension_content_type(basename) {
        if content_types_agree(guessed, content_type) {
            return basename.to_owned();
        }
    }

    format!(
        "{}.{}",
        kind.default_stem(),
        extension_for(kind, content_type)
    )
}

fn content_types_agree(a: &str, b: &str) -> bool {
    normalize_content_type(a) == normalize_content_type(b)
}

fn normalize_content_type(ct: &str) -> &str {
    match ct {
        "audio/mp3" => "audio/mpeg",
        other => other,
    }
}

fn path_extension(path: &str) -> Option<String> {
    let basename = path.rsplit('/').next()?;
    let (stem, ext) = basename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const MP3_ID3: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00";
    const MP3_SYNC: &[u8] = &[0xFF, 0xFB, 0x90, 0x00];
    const WEBM: &[u8] = &[0x1A, 0x45, 0xDF, 0xA3, 0x01, 0x00];
    const WAV: &[u8] = b"RIFF\x24\x08\x00\x00WAVEfmt ";
    const WEBP: &[u8] = b"RIFF\x1a\x00\x00\x00WEBPVP8 ";

    #[test]
    fn jpeg_magic_overrides_declared_type() {
        let resolved = resolve_format(
            AssetKind::Image,
            JPEG,
            Some("application/octet-stream"),
            "/images/photo",
        );
        assert_eq!(resolved.content_type, "image/jpeg");
        assert!(!resolved.needs_transcode);

        let resolved = resolve_format(AssetKind::Image, JPEG, Some("image/png"), "/x.png");
        assert_eq!(resolved.content_type, "image/jpeg");
        assert_eq!(resolved.filename, "image.jpg");
    }

    #[test]
    fn riff_webp_is_webp_not_wav() {
        let resolved = resolve_format(AssetKind::Audio, WEBP, None, "/blob");
        assert_eq!(resolved.content_type, "image/webp");
        // not an accepted audio format, so conversion is required
        assert!(resolved.needs_transcode);

        let resolved = resolve_format(AssetKind::Image, WEBP, Some("audio/wav"), "/blob");
        assert_eq!(resolved.content_type, "image/webp");
        assert!(resolved.needs_transcode);
    }

    #[test]
    fn riff_without_webp_is_wav() {
        let resolved = resolve_format(AssetKind::Audio, WAV, None, "/voice.wav");
        assert_eq!(resolved.content_type, "audio/wav");
        assert_eq!(resolved.filename, "voice.wav");
        assert!(resolved.needs_transcode);
    }

    #[test]
    fn mp3_signatures() {
        for payload in [MP3_ID3, MP3_SYNC] {
            let resolved = resolve_format(AssetKind::Audio, payload, None, "/clip");
            assert_eq!(resolved.content_type, "audio/mpeg");
            assert!(!resolved.needs_transcode);
        }
    }

    #[test]
    fn octet_stream_mp3_without_extension() {
        let resolved = resolve_format(
            AssetKind::Audio,
            MP3_ID3,
            Some("application/octet-stream"),
            "/storage/3b2ab4b2-blob",
        );
        assert_eq!(resolved.content_type, "audio/mpeg");
        assert_eq!(resolved.filename, "audio.mp3");
        assert!(!resolved.needs_transcode);
    }

    #[test]
    fn webm_audio_flagged_for_transcoding() {
        let resolved = resolve_format(AssetKind::Audio, WEBM, Some("audio/mpeg"), "/rec.mp3");
        assert_eq!(resolved.content_type, "video/webm");
        assert!(resolved.needs_transcode);
        assert_eq!(resolved.filename, "audio.webm");
    }

    #[test]
    fn declared_header_used_when_magic_unknown() {
        let resolved = resolve_format(
            AssetKind::Audio,
            &[0u8; 16],
            Some("audio/ogg; codecs=opus"),
            "/clip",
        );
        assert_eq!(resolved.content_type, "audio/ogg");
        assert_eq!(resolved.filename, "audio.ogg");
        assert!(resolved.needs_transcode);
    }

    #[test]
    fn extension_fallback_when_no_magic_or_header() {
        let resolved = resolve_format(AssetKind::Image, &[0u8; 16], None, "/pics/avatar.png");
        assert_eq!(resolved.content_type, "image/png");
        assert_eq!(resolved.filename, "avatar.png");
        assert!(!resolved.needs_transcode);
    }

    #[test]
    fn kind_default_as_last_resort() {
        let resolved = resolve_format(AssetKind::Audio, &[0u8; 16], None, "/clip");
        assert_eq!(resolved.content_type, "audio/mpeg");
        assert_eq!(resolved.filename, "audio.mp3");

        let resolved = resolve_format(AssetKind::Image, &[0u8; 16], None, "/pic");
        assert_eq!(resolved.content_type, "image/jpeg");
        assert_eq!(resolved.filename, "image.jpg");
    }

    #[test]
    fn video_content_type_coerced_for_audio() {
        let resolved = resolve_format(
            AssetKind::Audio,
            &[0u8; 16],
            Some("video/mp4"),
            "/recording",
        );
        assert_eq!(resolved.content_type, "audio/mpeg");
        assert!(!resolved.needs_transcode);
    }

    #[test]
    fn coercion_limited_to_video_types() {
        // magic-detected WEBP keeps its type so the converter runs on it
        let resolved = resolve_format(AssetKind::Audio, WEBP, Some("audio/mpeg"), "/blob");
        assert_eq!(resolved.content_type, "image/webp");
        assert!(resolved.needs_transcode);

        // a declared non-video type is flagged for conversion, not relabeled
        let resolved = resolve_format(AssetKind::Audio, &[0u8; 16], Some("image/png"), "/clip");
        assert_eq!(resolved.content_type, "image/png");
        assert!(resolved.needs_transcode);
    }

    #[test]
    fn filename_kept_when_extension_matches() {
        let resolved = resolve_format(AssetKind::Audio, MP3_ID3, None, "/a/b/sam_voice.mp3");
        assert_eq!(resolved.filename, "sam_voice.mp3");

        let resolved = resolve_format(AssetKind::Image, PNG, None, "/a/portrait.png");
        assert_eq!(resolved.filename, "portrait.png");
    }

    #[test]
    fn filename_rewritten_when_extension_disagrees() {
        // WAV bytes behind a .mp3 name: extension must follow the real format
        let resolved = resolve_format(AssetKind::Audio, WAV, None, "/a/voice.mp3");
        assert_eq!(resolved.content_type, "audio/wav");
        assert_eq!(resolved.filename, "audio.wav");
    }
}
