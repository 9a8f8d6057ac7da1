use serde::{Deserialize, Serialize};
use std::fmt;

/// Input to one pipeline run. `style` is appended to the generated prompt
/// as a suffix when present and non-empty.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub text: String,
    pub style: Option<String>,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// Result of a completed run: the generated prompt (without the style
/// suffix) and the rendered image's URL.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResponse {
    pub prompt: String,
    pub image_url: String,
}

/// Progress of a pipeline run, reported through the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineState {
    Input,
    GeneratingPrompt,
    GeneratingImage,
    Completed,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Input => "input",
            PipelineState::GeneratingPrompt => "generating-prompt",
            PipelineState::GeneratingImage => "generating-image",
            PipelineState::Completed => "completed",
            PipelineState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
