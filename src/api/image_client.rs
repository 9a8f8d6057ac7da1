use crate::{
    config::ImageConfig,
    error::{PipelineError, Result},
    models::{ImageGenerationRequest, ImageGenerationResponse},
    observer::RequestObserver,
    retry::{RequestSpec, RetryPolicy, RetryingRequester},
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

const STAGE_LABEL: &str = "Image API";

/// Stage 2: renders a prompt into an image via the configured
/// image-generation endpoint.
#[derive(Clone)]
pub struct ImageClient {
    requester: RetryingRequester,
    http: Client,
    observer: Arc<dyn RequestObserver>,
    api_url: String,
    api_key: String,
    model: String,
}

impl ImageClient {
    pub fn new(
        http: Client,
        config: ImageConfig,
        observer: Arc<dyn RequestObserver>,
    ) -> Result<Self> {
        let api_url = require(config.api_url, "Image API URL is not configured")?;
        let api_key = require(config.api_key, "Image API key is not configured")?;
        let model = require(config.model, "Image model is not configured")?;

        Ok(Self {
            requester: RetryingRequester::with_client(http.clone()),
            http,
            observer,
            api_url,
            api_key,
            model,
        })
    }

    /// Longer timeout than stage 1; rendering is the slow half.
    pub fn retry_policy() -> RetryPolicy {
        RetryPolicy::new()
            .with_max_retries(3)
            .with_base_delay(Duration::from_millis(1000))
            .with_timeout(Duration::from_secs(180))
    }

    /// Well-known style values, as (value, label) pairs.
    pub fn style_presets() -> &'static [(&'static str, &'static str)] {
        &[
            ("realistic", "Realistic"),
            ("anime", "Anime"),
            ("watercolor", "Watercolor"),
            ("oil painting", "Oil painting"),
            ("pixel art", "Pixel art"),
            ("flat illustration", "Flat illustration"),
            ("cyberpunk", "Cyberpunk"),
            ("minimalist", "Minimalist"),
        ]
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ImageGenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| PipelineError::SerializationError(e.to_string()))?;

        log::info!("Generating image with model: {}", self.model);
        self.observer.on_request(STAGE_LABEL, &self.api_url, &body);

        let spec = RequestSpec::post(&self.api_url)
            .with_bearer_auth(&self.api_key)?
            .with_json_body(&body)?;

        let response = match self.requester.send(&spec, &Self::retry_policy()).await {
            Ok(response) => response,
            Err(err) => {
                self.observer.on_error(STAGE_LABEL, err.message());
                return Err(PipelineError::ImageGeneration(err.message().to_string()));
            }
        };

        self.observer
            .on_response(STAGE_LABEL, response.status, &response.body);

        let parsed: ImageGenerationResponse =
            serde_json::from_value(response.body).map_err(|_| self.malformed())?;
        let url = parsed
            .images
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or_else(|| self.malformed())?;

        Ok(url)
    }

    /// Fetches the rendered image's bytes. Single attempt; a failed
    /// download does not disturb the completed pipeline run.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::RequestError(format!("image download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PipelineError::RequestError(format!(
                "image download failed: HTTP {}",
                response.status().as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::RequestError(format!("image download failed: {}", e)))?;
        Ok(bytes.to_vec())
    }

    fn malformed(&self) -> PipelineError {
        self.observer.on_error(STAGE_LABEL, "malformed response shape");
        PipelineError::ImageGeneration("malformed response shape".to_string())
    }
}

fn require(value: Option<String>, message: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PipelineError::ConfigError(message.to_string()))
}
