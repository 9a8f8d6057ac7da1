use covergen::{Config, CoverClient, GenerationRequest, ImageConfig, LlmConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    covergen::logger::init()?;

    let llm_key = env::var("LLM_API_KEY")?;
    let image_key = env::var("IMAGE_API_KEY")?;

    let config = Config::new()
        .with_llm(
            LlmConfig::new()
                .with_endpoint("https://api.siliconflow.cn/v1/chat/completions")
                .with_credentials(llm_key)
                .with_model("Qwen/Qwen3-8B"),
        )
        .with_image(
            ImageConfig::new()
                .with_endpoint("https://api.siliconflow.cn/v1/images/generations")
                .with_credentials(image_key)
                .with_model("Kwai-Kolors/Kolors"),
        )
        .with_debug(true);

    let client = CoverClient::new(config);
    let request = GenerationRequest::new("A cozy coffee shop announcing its grand opening")
        .with_style("watercolor");

    let response = client.generate(request).await?;
    println!("prompt: {}", response.prompt);
    println!("image:  {}", response.image_url);

    Ok(())
}
