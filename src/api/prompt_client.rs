use crate::{
    config::LlmConfig,
    error::{PipelineError, Result},
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage},
    observer::RequestObserver,
    retry::{RequestSpec, RetryPolicy, RetryingRequester},
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Used when the configuration carries no system prompt of its own.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional cover designer. \
    Turn the user's input into the text prompt for a polished cover image and \
    reply with the prompt only: the image ...";

/// Token cap on the generated prompt.
pub const MAX_PROMPT_TOKENS: u32 = 512;

const STAGE_LABEL: &str = "LLM API";

/// Stage 1: turns the user's text into an image-generation prompt via the
/// configured chat-completions endpoint.
#[derive(Clone)]
pub struct PromptClient {
    requester: RetryingRequester,
    observer: Arc<dyn RequestObserver>,
    api_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
}

impl PromptClient {
    /// Validates the LLM configuration once; fields are plain strings from
    /// here on. Fails before any network activity.
    pub fn new(
        http: Client,
        config: LlmConfig,
        observer: Arc<dyn RequestObserver>,
    ) -> Result<Self> {
        let api_url = require(config.api_url, "LLM API URL is not configured")?;
        let api_key = require(config.api_key, "LLM API key is not configured")?;
        let model = require(config.model, "LLM model is not configured")?;
        let system_prompt = config
            .system_prompt
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Ok(Self {
            requester: RetryingRequester::with_client(http),
            observer,
            api_url,
            api_key,
            model,
            system_prompt,
        })
    }

    pub fn retry_policy() -> RetryPolicy {
        RetryPolicy::new()
            .with_max_retries(3)
            .with_base_delay(Duration::from_millis(1000))
            .with_timeout(Duration::from_secs(120))
    }

    pub async fn generate(&self, input: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(input),
            ],
            stream: false,
            max_tokens: MAX_PROMPT_TOKENS,
            enable_thinking: false,
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| PipelineError::SerializationError(e.to_string()))?;

        log::info!("Generating prompt with model: {}", self.model);
        self.observer.on_request(STAGE_LABEL, &self.api_url, &body);

        let spec = RequestSpec::post(&self.api_url)
            .with_bearer_auth(&self.api_key)?
            .with_json_body(&body)?;

        let response = match self.requester.send(&spec, &Self::retry_policy()).await {
            Ok(response) => response,
            Err(err) => {
                self.observer.on_error(STAGE_LABEL, err.message());
                return Err(PipelineError::PromptGeneration(err.message().to_string()));
            }
        };

        self.observer
            .on_response(STAGE_LABEL, response.status, &response.body);

        let parsed: ChatCompletionResponse =
            serde_json::from_value(response.body).map_err(|_| self.malformed())?;
        let prompt = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| self.malformed())?;

        Ok(prompt)
    }

    fn malformed(&self) -> PipelineError {
        self.observer.on_error(STAGE_LABEL, "malformed response shape");
        PipelineError::PromptGeneration("malformed response shape".to_string())
    }
}

fn require(value: Option<String>, message: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PipelineError::ConfigError(message.to_string()))
}
