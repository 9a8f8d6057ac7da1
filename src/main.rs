use covergen::{Config, CoverClient, GenerationRequest, ImageClient};
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    covergen::logger::init_with_config(
        covergen::logger::LoggerConfig::development()
            .with_level(covergen::logger::LogLevel::Debug),
    )?;

    covergen::logger::log_startup_info("covergen", env!("CARGO_PKG_VERSION"));

    log::info!("🔍 Checking endpoint environment...");

    match (env::var("LLM_API_KEY"), env::var("IMAGE_API_KEY")) {
        (Ok(llm_key), Ok(image_key)) => {
            log::info!("✅ API keys found in environment");
            log::debug!(
                "LLM key starts with: {}...",
                &llm_key[..10.min(llm_key.len())]
            );
            log::debug!("Image key length: {}", image_key.len());
        }
        _ => {
            log::warn!("⚠️  Missing API keys in environment variables");
            log::error!("❌ This will cause precondition failures before any request is sent");
        }
    }

    let config = Config::from_env();
    covergen::logger::log_config_info(&config);

    log::info!("🎨 Available style presets:");
    for (value, label) in ImageClient::style_presets() {
        log::info!("  {} - {}", value, label);
    }

    let client = CoverClient::new(config);

    let request = GenerationRequest::new(
        "Weekend 50% off sale, balloons, shopping bags, upbeat and colorful",
    )
    .with_style("flat illustration");

    log::info!("🧪 Running the prompt → image pipeline...");

    match client.generate(request).await {
        Ok(response) => {
            log::info!("✅ Pipeline completed!");
            log::info!("📝 Generated prompt: {}", response.prompt);
            log::info!("🖼️  Image URL: {}", response.image_url);

            let filename = format!("cover-{}.png", chrono::Utc::now().timestamp());
            match client.image() {
                Ok(image_client) => match image_client.download(&response.image_url).await {
                    Ok(bytes) => match fs::write(&filename, bytes) {
                        Ok(_) => log::info!("💾 Image saved to: {}", filename),
                        Err(e) => log::error!("❌ Failed to save image: {}", e),
                    },
                    Err(e) => log::error!("❌ Failed to download image: {}", e),
                },
                Err(e) => log::error!("❌ Image client unavailable: {}", e),
            }
        }
        Err(e) => {
            log::error!("❌ Pipeline failed: {}", e);
            if let Some(stage) = e.stage() {
                log::warn!("💡 Failed stage: {}", stage.as_str());
            }
        }
    }

    log::info!("🎉 Done!");

    Ok(())
}
