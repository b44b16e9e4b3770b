use nichegen::{
    logger, BatchSpec, Credentials, MinerTarget, NicheClient, PipelineType, SeedPolicy,
    StudioConfig,
};
use std::env;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::development().with_target("nichegen"))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = StudioConfig::from_env();
    logger::log_config_info(&config);

    let client = NicheClient::new(config)?;
    log::info!("🖼️  Available models: {}", client.models().join(", "));

    if env::var("NICHE_SHOW_STATS").map_or(false, |v| v == "true") {
        match client.stats().await {
            Ok(info) => {
                for (model, miners) in info.model_distribution() {
                    log::info!("📊 {}: {} miners", model, miners);
                    if let Some(board) = info.leaderboard(&model) {
                        for entry in board.iter().take(3) {
                            log::info!("     uid {} mean score {:.4}", entry.uid, entry.mean_score);
                        }
                    }
                }
            }
            Err(e) => log::error!("❌ {}", e),
        }
    }

    let pipeline = match env_or("NICHE_PIPELINE", "txt2img").as_str() {
        "img2img" => PipelineType::ImageToImage,
        "controlnet_txt2img" => PipelineType::ControlToImage,
        _ => PipelineType::TextToImage,
    };

    let mut spec = BatchSpec::new(
        env_or("NICHE_MODEL", "RealisticVision"),
        env_or(
            "NICHE_PROMPT",
            "3d render of cat in the style of Louis Wain, add detail, very colorful",
        ),
    )
    .with_aspect_ratio(env_or("NICHE_RATIO", "square"))
    .with_pipeline(pipeline)
    .with_miner(MinerTarget::parse(&env_or("NICHE_UID", "-1")))
    .with_seed(SeedPolicy::parse(&env_or("NICHE_SEED", "-1")))
    .with_num_images(env_or("NICHE_NUM_IMAGES", "4").parse().unwrap_or(4));

    if let Ok(path) = env::var("NICHE_CONDITIONING_IMAGE") {
        let image = image::open(&path)?;
        spec = spec.with_conditioning_image(nichegen::niche::codec::encode_png_base64(&image)?);
    }

    let credentials = Credentials::new(env_or("NICHE_SECRET_KEY", ""));

    log::info!("🎨 Whipping up your words into art...");
    match client.generate(&spec, &credentials).await {
        Ok(result) => {
            log::info!(
                "✅ Images generated in {:.3} seconds ({} of {} succeeded)",
                result.duration.as_secs_f64(),
                result.generated_count(),
                spec.num_images
            );
            for (i, slot) in result.images.iter().enumerate() {
                let (width, height) = slot.dimensions();
                let kind = if slot.is_placeholder() { "placeholder" } else { "generated" };
                log::info!("   Image {}: {}x{} {}", i + 1, width, height, kind);
            }
        }
        Err(e) => {
            log::error!("❌ {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
