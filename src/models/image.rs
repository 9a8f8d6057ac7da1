use serde::{Deserialize, Serialize};

/// Wire body for the image-generation endpoint.
#[derive(Debug, Serialize)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageGenerationResponse {
    pub images: Vec<GeneratedImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
}
