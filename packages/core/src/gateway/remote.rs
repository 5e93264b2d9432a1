//! Remote classification backend: multipart upload to `POST {endpoint}`.

use super::ClassifierBackend;
use super::upload::{Upload, prepare_upload};
use crate::error::{GatewayError, GatewayResult};
use crate::settings::EndpointSettings;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use xray_lens_types::{ImageInput, Prediction, PredictionResponse};

/// Talks to a classification server such as the reference `/predict` service
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    settings: EndpointSettings,
    connect_timeout: Duration,
    max_upload_edge: Option<u32>,
}

/// Loaded state of the remote backend
pub struct RemoteSession {
    client: reqwest::Client,
}

impl RemoteBackend {
    pub fn new(settings: EndpointSettings, connect_timeout: Duration) -> Self {
        Self {
            settings,
            connect_timeout,
            max_upload_edge: None,
        }
    }

    pub fn with_max_upload_edge(mut self, max_edge: Option<u32>) -> Self {
        self.max_upload_edge = max_edge;
        self
    }

    pub fn settings(&self) -> &EndpointSettings {
        &self.settings
    }

    fn map_send_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout {
                duration_ms: self.connect_timeout.as_millis() as u64,
            }
        } else {
            GatewayError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl ClassifierBackend for RemoteBackend {
    type Session = RemoteSession;
    type Prepared = Upload;

    fn name(&self) -> &str {
        "remote"
    }

    async fn load(&self) -> GatewayResult<RemoteSession> {
        let client = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(concat!("xray-lens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                GatewayError::ModelInitialization(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(RemoteSession { client })
    }

    async fn prepare(&self, image: &ImageInput) -> GatewayResult<Upload> {
        prepare_upload(image, self.max_upload_edge).await
    }

    async fn infer(
        &self,
        session: &RemoteSession,
        upload: &Upload,
    ) -> GatewayResult<Vec<Prediction>> {
        let endpoint = self.settings.get();

        tracing::info!(
            endpoint = %endpoint,
            file = %upload.file_name,
            mime = upload.mime,
            bytes = upload.bytes.len(),
            "Uploading image for classification"
        );

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(upload.mime)
            .map_err(|e| GatewayError::Decode(format!("Invalid MIME type: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = session
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            tracing::warn!(endpoint = %endpoint, status = status.as_u16(), body = %body, "Classification request failed");
            return Err(GatewayError::server(status.as_u16(), &body));
        }

        let parsed: PredictionResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::InvalidResponse(format!("Failed to parse predictions: {}", e))
        })?;

        for (rank, p) in parsed.predictions.iter().take(5).enumerate() {
            tracing::debug!(rank = rank + 1, label = %p.label, confidence = p.confidence, "Prediction");
        }

        Ok(parsed.predictions)
    }
}
