use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;

use super::{OcrProvider, mime_type_for};
use crate::config::DocumentAiConfig;
use crate::error::ScanError;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Google Document AI OCR processor over the REST API.
pub struct DocumentAiClient {
    client: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct ProcessResponse {
    document: Option<Document>,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl DocumentAiClient {
    pub fn new(config: &DocumentAiConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("Failed to build Document AI client: {e}"))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            access_token: config.access_token.clone(),
        })
    }

    async fn bearer_token(&self) -> Result<String, ScanError> {
        if let Some(token) = &self.access_token {
            return Ok(token.clone());
        }

        let resp = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| ScanError::OcrService(format!("Failed to obtain access token: {e}")))?;

        if !resp.status().is_success() {
            return Err(ScanError::OcrService(format!(
                "Metadata server returned {}",
                resp.status()
            )));
        }

        let token: MetadataToken = resp
            .json()
            .await
            .map_err(|e| ScanError::OcrService(format!("Invalid token response: {e}")))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl OcrProvider for DocumentAiClient {
    async fn extract(&self, image: &Path) -> Result<String, ScanError> {
        let content = tokio::fs::read(image).await.map_err(|e| {
            ScanError::OcrService(format!("Cannot read image {}: {e}", image.display()))
        })?;

        let body = json!({
            "rawDocument": {
                "content": STANDARD.encode(&content),
                "mimeType": mime_type_for(image),
            },
            "fieldMask": "text,entities",
        });

        let token = self.bearer_token().await?;

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScanError::OcrService(format!("Document AI request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(1024)
                .collect::<String>();
            return Err(ScanError::OcrService(format!(
                "Document AI returned {status}: {detail}"
            )));
        }

        let parsed: ProcessResponse = resp
            .json()
            .await
            .map_err(|e| ScanError::OcrService(format!("Invalid Document AI response: {e}")))?;

        let text = parsed.document.map(|d| d.text).unwrap_or_default();
        tracing::debug!("Document AI extracted {} chars from {}", text.len(), image.display());
        Ok(text)
    }
}
