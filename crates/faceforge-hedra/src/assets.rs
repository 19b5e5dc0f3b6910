//! Asset registration and upload.
//!
//! Uploading is a two-phase protocol: first an asset record is created with a
//! name and kind, then the bytes are posted to the record as a multipart form.
//! When the service rejects the bytes for their format, the payload is run
//! through the converter once and the upload is retried against the same
//! asset record.

use faceforge_media::{AssetKind, MediaAsset, MediaConverter};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::client::HdClient;
use crate::{Error, Result, TRACING_TARGET};

#[derive(Debug, Serialize)]
struct CreateAssetRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: AssetKind,
}

#[derive(Debug, Deserialize)]
struct CreateAssetResponse {
    id: String,
}

impl HdClient {
    /// Create an asset record and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetCreation`] on a non-success response.
    pub async fn create_asset(&self, name: &str, kind: AssetKind) -> Result<String> {
        let response = self
            .request(Method::POST, "/assets")
            .json(&CreateAssetRequest { name, kind })
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = Self::read_failure(response).await;
            tracing::error!(
                target: TRACING_TARGET,
                kind = %kind,
                status,
                "asset creation failed"
            );
            return Err(Error::asset_creation(status, body));
        }

        let created: CreateAssetResponse = response.json().await?;
        tracing::debug!(
            target: TRACING_TARGET,
            kind = %kind,
            asset_id = %created.id,
            "created asset record"
        );
        Ok(created.id)
    }

    /// Upload asset bytes to an existing asset record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upload`] on a non-success response.
    pub async fn upload_asset_bytes(&self, asset_id: &str, asset: &MediaAsset) -> Result<()> {
        let part = Part::bytes(asset.bytes.to_vec())
            .file_name(asset.filename.clone())
            .mime_str(&asset.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .request(Method::POST, &format!("/assets/{asset_id}/upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = Self::read_failure(response).await;
            return Err(Error::upload(status, body));
        }

        tracing::info!(
            target: TRACING_TARGET,
            asset_id = %asset_id,
            kind = %asset.kind,
            content_type = %asset.content_type,
            size = asset.len(),
            "uploaded asset bytes"
        );
        Ok(())
    }

    /// Register and upload a media asset, returning the remote asset id.
    ///
    /// On a format rejection the payload is converted to the canonical format
    /// for its kind and the upload is retried once. When the converter cannot
    /// change the payload the original rejection is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetCreation`] or [`Error::Upload`] when either
    /// phase is rejected.
    pub async fn upload_media(
        &self,
        asset: MediaAsset,
        converter: &dyn MediaConverter,
    ) -> Result<String> {
        let asset_id = self.create_asset(&asset.filename, asset.kind).await?;

        match self.upload_asset_bytes(&asset_id, &asset).await {
            Ok(()) => Ok(asset_id),
            Err(Error::Upload { status, body }) if is_format_rejection(status, &body) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    asset_id = %asset_id,
                    status,
                    content_type = %asset.content_type,
                    "upload rejected for format, converting and retrying"
                );

                let converted = converter.convert(asset.clone()).await;
                if converted == asset {
                    return Err(Error::upload(status, body));
                }

                self.upload_asset_bytes(&asset_id, &converted).await?;
                Ok(asset_id)
            }
            Err(e) => Err(e),
        }
    }
}

/// Whether an upload rejection looks like a media format complaint rather
/// than an auth or quota problem.
fn is_format_rejection(status: u16, body: &str) -> bool {
    if status == 415 {
        return true;
    }
    if !(400..500).contains(&status) || matches!(status, 401 | 403 | 404) {
        return false;
    }

    let body = body.to_ascii_lowercase();
    ["format", "unsupported", "media type", "invalid file"]
        .iter()
        .any(|marker| body.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_rejection_predicate() {
        assert!(is_format_rejection(415, ""));
        assert!(is_format_rejection(400, "Unsupported audio format"));
        assert!(is_format_rejection(422, r#"{"detail":"invalid file contents"}"#));
        assert!(is_format_rejection(400, "unrecognized media type"));

        assert!(!is_format_rejection(401, "invalid api key format"));
        assert!(!is_format_rejection(403, "forbidden"));
        assert!(!is_format_rejection(404, "asset not found"));
        assert!(!is_format_rejection(500, "internal format error"));
        assert!(!is_format_rejection(400, "name is required"));
    }

    #[test]
    fn create_asset_wire_shape() {
        let request = CreateAssetRequest {
            name: "image.jpg",
            kind: AssetKind::Image,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["name"], "image.jpg");
        assert_eq!(json["type"], "image");

        let request = CreateAssetRequest {
            name: "audio.mp3",
            kind: AssetKind::Audio,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "audio");
    }

    #[test]
    fn create_asset_response_parses() {
        let response: CreateAssetResponse =
            serde_json::from_str(r#"{"id":"asset-1","name":"image.jpg"}"#).unwrap();
        assert_eq!(response.id, "asset-1");
    }
}
