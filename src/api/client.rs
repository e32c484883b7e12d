use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};

use crate::error::{ClientError, EncodingError, EncodingErrorKind};
use crate::http::{HttpClient, RetryPolicy, with_retry};
use crate::image::{ImageSource, encode_image, load_image};
use crate::runtime::Runtime;

use super::types::{HealthReport, PredictRequest, PredictionResult, ServiceStatus};

pub const PREDICT_BASE64_PATH: &str = "/predict-base64";
pub const PREDICT_UPLOAD_PATH: &str = "/predict";
pub const HEALTH_PATH: &str = "/health";

/// Operations offered by the cataract-detection service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Encodes the image and sends a single prediction request.
    async fn predict(&self, source: &ImageSource) -> Result<PredictionResult, ClientError>;

    /// Like [`Predictor::predict`], retrying failed requests with exponential backoff.
    /// `max_attempts` overrides the configured attempt count.
    async fn predict_with_retry(
        &self,
        source: &ImageSource,
        max_attempts: Option<usize>,
    ) -> Result<PredictionResult, ClientError>;

    /// Uploads the raw image as a multipart form instead of base64 JSON.
    async fn predict_upload(&self, source: &ImageSource)
    -> Result<PredictionResult, ClientError>;

    /// `true` when `/health` answers with a success status. Never fails.
    async fn health_check(&self) -> bool;

    async fn health_report(&self) -> Result<HealthReport, ClientError>;

    async fn service_status(&self) -> Result<ServiceStatus, ClientError>;

    fn base_url(&self) -> &str;
}

/// HTTP client for the inference server.
pub struct InferenceClient<R: Runtime> {
    runtime: R,
    http: HttpClient,
    base_url: String,
    retry: RetryPolicy,
}

impl<R: Runtime> InferenceClient<R> {
    #[tracing::instrument(skip(runtime, http))]
    pub fn new(runtime: R, http: HttpClient, base_url: &str, retry: RetryPolicy) -> Self {
        Self {
            runtime,
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Posts an already encoded payload to `/predict-base64`.
    ///
    /// The parsed result is returned exactly as the server sent it.
    #[tracing::instrument(skip(self, image_base64), fields(payload_len = image_base64.len()))]
    pub async fn send_prediction(
        &self,
        image_base64: &str,
    ) -> Result<PredictionResult, ClientError> {
        let url = self.endpoint(PREDICT_BASE64_PATH);
        let result: PredictionResult = self
            .http
            .post_json(
                &url,
                &PredictRequest {
                    image: image_base64,
                },
            )
            .await?;

        info!(
            "Prediction: {} (confidence: {:.4})",
            result.prediction, result.confidence
        );
        Ok(result)
    }

    async fn encode(&self, source: &ImageSource) -> Result<String, ClientError> {
        let payload = encode_image(&self.runtime, self.http.inner(), source).await?;
        debug!(
            "Encoded {} into {} base64 characters",
            source.describe(),
            payload.len()
        );
        Ok(payload)
    }
}

#[async_trait]
impl<R: Runtime> Predictor for InferenceClient<R> {
    #[tracing::instrument(skip(self, source))]
    async fn predict(&self, source: &ImageSource) -> Result<PredictionResult, ClientError> {
        let payload = self.encode(source).await?;
        self.send_prediction(&payload).await
    }

    #[tracing::instrument(skip(self, source))]
    async fn predict_with_retry(
        &self,
        source: &ImageSource,
        max_attempts: Option<usize>,
    ) -> Result<PredictionResult, ClientError> {
        // Re-reading the same reference cannot fix an encoding failure, so
        // only the request itself is retried.
        let payload = self.encode(source).await?;

        let policy = match max_attempts {
            Some(n) => self.retry.with_max_attempts(n),
            None => self.retry,
        };

        with_retry(&policy, "Prediction request", || {
            self.send_prediction(&payload)
        })
        .await
    }

    #[tracing::instrument(skip(self, source))]
    async fn predict_upload(
        &self,
        source: &ImageSource,
    ) -> Result<PredictionResult, ClientError> {
        let bytes = load_image(&self.runtime, self.http.inner(), source).await?;

        let part = Part::bytes(bytes)
            .file_name(source.file_name())
            .mime_str(&source.mime_type())
            .map_err(|e| {
                EncodingError::new(source.describe(), EncodingErrorKind::InvalidMediaType(e))
            })?;
        let form = Form::new().part("file", part);

        let result: PredictionResult = self
            .http
            .post_multipart(&self.endpoint(PREDICT_UPLOAD_PATH), form)
            .await?;

        info!(
            "Prediction (upload): {} (confidence: {:.4})",
            result.prediction, result.confidence
        );
        Ok(result)
    }

    #[tracing::instrument(skip(self))]
    async fn health_check(&self) -> bool {
        match self.http.probe(&self.endpoint(HEALTH_PATH)).await {
            Ok(status) => {
                debug!("Health check answered {}", status);
                status.is_success()
            }
            Err(e) => {
                warn!("Health check failed: {}", e);
                false
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn health_report(&self) -> Result<HealthReport, ClientError> {
        self.http.get_json(&self.endpoint(HEALTH_PATH)).await
    }

    #[tracing::instrument(skip(self))]
    async fn service_status(&self) -> Result<ServiceStatus, ClientError> {
        self.http.get_json(&self.endpoint("/")).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
