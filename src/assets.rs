//! Image upload to the external asset host (Cloudinary-compatible signed upload).

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{0}")]
    Rejected(String),
    #[error("asset host unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait AssetHost: Send + Sync {
    /// Uploads `image` (a data URI or remote URL) and returns its public HTTPS URL.
    async fn upload(&self, image: &str) -> Result<String, AssetError>;
}

#[derive(Clone, Debug)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

pub struct CloudinaryHost {
    client: Client,
    credentials: CloudinaryCredentials,
    upload_preset: String,
    base_url: String,
}

#[derive(Deserialize)]
struct UploadResponse { secure_url: String }

#[derive(Deserialize)]
struct ErrorBody { error: ErrorDetail }

#[derive(Deserialize)]
struct ErrorDetail { message: String }

impl CloudinaryHost {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.cloudinary.com";
    pub const DEFAULT_UPLOAD_PRESET: &'static str = "ml_default";

    pub fn new(credentials: CloudinaryCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
            upload_preset: Self::DEFAULT_UPLOAD_PRESET.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Signature over the signed parameters, sorted by name, followed by the API secret.
    fn sign(&self, timestamp: i64) -> String {
        let payload = format!("timestamp={}&upload_preset={}{}", timestamp, self.upload_preset, self.credentials.api_secret);
        hex::encode(Sha256::digest(payload.as_bytes()))
    }
}

#[async_trait]
impl AssetHost for CloudinaryHost {
    async fn upload(&self, image: &str) -> Result<String, AssetError> {
        let timestamp = Utc::now().timestamp();
        let url = format!("{}/v1_1/{}/image/upload", self.base_url, self.credentials.cloud_name);
        let response = self.client
            .post(url)
            .form(&[
                ("file", image.to_string()),
                ("upload_preset", self.upload_preset.clone()),
                ("api_key", self.credentials.api_key.clone()),
                ("timestamp", timestamp.to_string()),
                ("signature", self.sign(timestamp)),
                ("signature_algorithm", "sha256".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: UploadResponse = response.json().await?;
            debug!(url = %body.secure_url, "image uploaded");
            return Ok(body.secure_url);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.error.message)
            .unwrap_or_else(|_| format!("asset host returned {status}"));
        warn!(%status, %message, "image upload rejected");
        Err(AssetError::Rejected(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn host(base: String) -> CloudinaryHost {
        CloudinaryHost::new(CloudinaryCredentials {
            cloud_name: "demo".into(), api_key: "key123".into(), api_secret: "shh".into(),
        })
        .with_base_url(base)
    }

    #[test]
    fn test_signature_is_deterministic_hex() {
        let h = host("http://unused".into());
        let sig = h.sign(1_700_000_000);
        assert_eq!(sig.len(), 64);
        assert_eq!(sig, h.sign(1_700_000_000));
        assert_ne!(sig, h.sign(1_700_000_001));
    }

    #[tokio::test]
    async fn test_upload_returns_secure_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/upload"))
            .and(body_string_contains("api_key=key123"))
            .and(body_string_contains("upload_preset=ml_default"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/mug.png"
            })))
            .mount(&server)
            .await;

        let url = host(server.uri()).upload("data:image/png;base64,AAAA").await.unwrap();
        assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/v1/mug.png");
    }

    #[tokio::test]
    async fn test_upload_error_message_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Invalid image file" }
            })))
            .mount(&server)
            .await;

        let err = host(server.uri()).upload("not-an-image").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid image file");
    }
}
