pub mod image_client;
pub mod prompt_client;

use crate::{
    config::Config,
    error::Result,
    logger,
    models::{GenerationRequest, GenerationResponse, PipelineState},
    observer::{DebugObserver, RequestObserver},
};
use reqwest::Client;
use std::sync::Arc;

pub use image_client::ImageClient;
pub use prompt_client::PromptClient;

/// Two-stage pipeline: the user's text becomes an image prompt (stage 1),
/// the prompt becomes an image URL (stage 2). Stage 2 never starts before
/// stage 1 resolves; a run owns its state and several runs may be driven
/// concurrently.
pub struct CoverClient {
    http: Client,
    config: Config,
    observer: Arc<dyn RequestObserver>,
}

impl CoverClient {
    /// Configuration is held as-is; each stage validates its own slice when
    /// that stage's client is built. The default observer writes through
    /// the logger when `config.debug` is set.
    pub fn new(config: Config) -> Self {
        let observer = Arc::new(DebugObserver::new(config.debug));
        Self {
            http: Client::new(),
            config,
            observer,
        }
    }

    pub fn with_observer(config: Config, observer: Arc<dyn RequestObserver>) -> Self {
        Self {
            http: Client::new(),
            config,
            observer,
        }
    }

    /// Stage-1 client over this client's LLM configuration.
    pub fn prompt(&self) -> Result<PromptClient> {
        PromptClient::new(
            self.http.clone(),
            self.config.llm.clone(),
            self.observer.clone(),
        )
    }

    /// Stage-2 client over this client's image configuration.
    pub fn image(&self) -> Result<ImageClient> {
        ImageClient::new(
            self.http.clone(),
            self.config.image.clone(),
            self.observer.clone(),
        )
    }

    /// Runs the full pipeline. Failures are terminal for the run and carry
    /// the stage they belong to; a stage-1 failure never reaches stage 2,
    /// and a stage-2 failure does not redo stage 1.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let _timer = logger::timer("pipeline");
        match self.run(&request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                self.observer.on_state(PipelineState::Failed);
                Err(err)
            }
        }
    }

    async fn run(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.observer.on_state(PipelineState::GeneratingPrompt);
        let prompt_client = self.prompt()?;
        let prompt = prompt_client.generate(&request.text).await?;

        // The image configuration is only validated here, so stage 1 can
        // succeed while the image settings are still broken.
        self.observer.on_state(PipelineState::GeneratingImage);
        let image_client = self.image()?;
        let styled = apply_style(&prompt, request.style.as_deref());
        let image_url = image_client.generate(&styled).await?;

        self.observer.on_state(PipelineState::Completed);
        Ok(GenerationResponse { prompt, image_url })
    }
}

/// Style suffix: `"<prompt>, <style> style"` when a style is set, the
/// prompt unchanged otherwise. An empty style counts as unset.
pub fn apply_style(prompt: &str, style: Option<&str>) -> String {
    match style {
        Some(style) if !style.is_empty() => format!("{}, {} style", prompt, style),
        _ => prompt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_style_appends_suffix() {
        assert_eq!(apply_style("X", Some("anime")), "X, anime style");
        assert_eq!(
            apply_style("a vibrant promo banner", Some("oil painting")),
            "a vibrant promo banner, oil painting style"
        );
    }

    #[test]
    fn test_apply_style_leaves_prompt_unchanged_without_style() {
        assert_eq!(apply_style("X", None), "X");
        assert_eq!(apply_style("X", Some("")), "X");
    }
}
