use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Prompt generation failed: {0}")]
    PromptGeneration(String),
    #[error("Image generation failed: {0}")]
    ImageGeneration(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Which part of a pipeline run a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    ConfigMissing,
    PromptGeneration,
    ImageGeneration,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ConfigMissing => "config-missing",
            Stage::PromptGeneration => "prompt-generation",
            Stage::ImageGeneration => "image-generation",
        }
    }
}

impl PipelineError {
    /// Stage tag for errors that terminate a pipeline run. Lower-level
    /// variants carry no stage until the pipeline maps them.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::ConfigError(_) => Some(Stage::ConfigMissing),
            PipelineError::PromptGeneration(_) => Some(Stage::PromptGeneration),
            PipelineError::ImageGeneration(_) => Some(Stage::ImageGeneration),
            _ => None,
        }
    }

    /// The bare message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            PipelineError::ConfigError(msg)
            | PipelineError::RequestError(msg)
            | PipelineError::ResponseError(msg)
            | PipelineError::SerializationError(msg)
            | PipelineError::PromptGeneration(msg)
            | PipelineError::ImageGeneration(msg)
            | PipelineError::InternalError(msg) => msg,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
