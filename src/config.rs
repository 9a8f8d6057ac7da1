use serde::Deserialize;
use std::env;

/// Settings for the prompt-generation (chat completions) endpoint.
/// Deserializes the flat `llmSettings` document as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "apiUrl")]
    pub api_url: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "systemPrompt")]
    pub system_prompt: Option<String>,
}

/// Settings for the image-generation endpoint.
/// Deserializes the flat `imageSettings` document as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    #[serde(rename = "apiUrl")]
    pub api_url: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub image: ImageConfig,
    pub debug: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            api_url: None,
            api_key: None,
            model: None,
            system_prompt: None,
        }
    }
}

impl LlmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_url = env::var("LLM_API_URL").ok();
        let api_key = env::var("LLM_API_KEY").ok();
        let model = env::var("LLM_MODEL").ok();
        let system_prompt = env::var("LLM_SYSTEM_PROMPT").ok();

        LlmConfig {
            api_url,
            api_key,
            model,
            system_prompt,
        }
    }

    pub fn with_endpoint(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            api_url: None,
            api_key: None,
            model: None,
        }
    }
}

impl ImageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_url = env::var("IMAGE_API_URL").ok();
        let api_key = env::var("IMAGE_API_KEY").ok();
        let model = env::var("IMAGE_MODEL").ok();

        ImageConfig {
            api_url,
            api_key,
            model,
        }
    }

    pub fn with_endpoint(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            llm: LlmConfig::default(),
            image: ImageConfig::default(),
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let debug = env::var("DEBUG").ok().map_or(false, |val| val == "true");

        Config {
            llm: LlmConfig::from_env(),
            image: ImageConfig::from_env(),
            debug,
        }
    }

    pub fn with_llm(mut self, config: LlmConfig) -> Self {
        self.llm = config;
        self
    }

    pub fn with_image(mut self, config: ImageConfig) -> Self {
        self.image = config;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_settings_document_round_trip() {
        let doc = r#"{
            "apiUrl": "https://api.example.com/v1/chat/completions",
            "apiKey": "sk-test",
            "model": "Qwen/Qwen3-8B",
            "systemPrompt": "You design covers."
        }"#;

        let config: LlmConfig = serde_json::from_str(doc).unwrap();
        assert_eq!(
            config.api_url.as_deref(),
            Some("https://api.example.com/v1/chat/completions")
        );
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model.as_deref(), Some("Qwen/Qwen3-8B"));
        assert_eq!(config.system_prompt.as_deref(), Some("You design covers."));
    }

    #[test]
    fn test_image_settings_document_allows_missing_fields() {
        let doc = r#"{"apiUrl": "https://api.example.com/v1/images/generations"}"#;

        let config: ImageConfig = serde_json::from_str(doc).unwrap();
        assert!(config.api_url.is_some());
        assert!(config.api_key.is_none());
        assert!(config.model.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = Config::new()
            .with_llm(
                LlmConfig::new()
                    .with_endpoint("https://llm.local")
                    .with_credentials("key-a")
                    .with_model("m1"),
            )
            .with_image(
                ImageConfig::new()
                    .with_endpoint("https://img.local")
                    .with_credentials("key-b")
                    .with_model("m2"),
            )
            .with_debug(true);

        assert_eq!(config.llm.api_url.as_deref(), Some("https://llm.local"));
        assert_eq!(config.image.model.as_deref(), Some("m2"));
        assert!(config.debug);
    }
}
