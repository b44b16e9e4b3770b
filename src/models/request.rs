use serde::{Deserialize, Serialize};

pub const DEFAULT_NEGATIVE_PROMPT: &str = "low quality, blurry, pixelated, noisy, low resolution, defocused, out of focus, overexposed, bad image, nsfw";

/// Upper bound (exclusive) for randomly drawn seeds.
pub const RANDOM_SEED_BOUND: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineType {
    #[serde(rename = "txt2img")]
    TextToImage,
    #[serde(rename = "img2img")]
    ImageToImage,
    #[serde(rename = "controlnet_txt2img")]
    ControlToImage,
}

impl PipelineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineType::TextToImage => "txt2img",
            PipelineType::ImageToImage => "img2img",
            PipelineType::ControlToImage => "controlnet_txt2img",
        }
    }
}

/// Which miner should serve the request. Goes over the wire as an integer, -1 meaning any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum MinerTarget {
    /// The caller asked for any miner with the exact `-1` sentinel.
    Any,
    Uid(u32),
    /// Input that names no miner. Sent as -1, but unlike `Any` it still needs the secret.
    Unresolved,
}

impl MinerTarget {
    /// Only the literal `-1` selects any miner without authentication.
    pub fn parse(input: &str) -> Self {
        if input == "-1" {
            return MinerTarget::Any;
        }
        match input.trim().parse::<i64>() {
            Ok(-1) | Err(_) => MinerTarget::Unresolved,
            Ok(uid) => MinerTarget::from(uid),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, MinerTarget::Any)
    }
}

impl From<i64> for MinerTarget {
    fn from(uid: i64) -> Self {
        if uid == -1 {
            return MinerTarget::Any;
        }
        u32::try_from(uid)
            .map(MinerTarget::Uid)
            .unwrap_or(MinerTarget::Unresolved)
    }
}

impl From<MinerTarget> for i64 {
    fn from(target: MinerTarget) -> Self {
        match target {
            MinerTarget::Any | MinerTarget::Unresolved => -1,
            MinerTarget::Uid(uid) => i64::from(uid),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Request `i` gets `base + i`. A negative base behaves like `Random`.
    Explicit(i64),
    Random,
}

impl SeedPolicy {
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(base) if base >= 0 => SeedPolicy::Explicit(base),
            _ => SeedPolicy::Random,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub negative_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controlnet_conditioning_scale: Option<Vec<f32>>,
}

/// One fully resolved call to the inference proxy. Serializes to the proxy's JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub key: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub model_name: String,
    pub pipeline_type: PipelineType,
    pub seed: u64,
    pub miner_uid: MinerTarget,
    pub conditional_image: Option<String>,
    pub pipeline_params: PipelineParams,
}

/// Parameters shared by every image of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSpec {
    pub model_name: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub aspect_ratio: String,
    pub pipeline_type: PipelineType,
    pub miner: MinerTarget,
    pub num_images: usize,
    pub seed: SeedPolicy,
    pub conditional_image: Option<String>,
    pub controlnet_conditioning_scale: Option<Vec<f32>>,
}

impl BatchSpec {
    pub fn new(model_name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            prompt: prompt.into(),
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            aspect_ratio: "square".to_string(),
            pipeline_type: PipelineType::TextToImage,
            miner: MinerTarget::Any,
            num_images: 4,
            seed: SeedPolicy::Random,
            conditional_image: None,
            controlnet_conditioning_scale: None,
        }
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = aspect_ratio.into();
        self
    }

    pub fn with_pipeline(mut self, pipeline_type: PipelineType) -> Self {
        self.pipeline_type = pipeline_type;
        self
    }

    pub fn with_miner(mut self, miner: MinerTarget) -> Self {
        self.miner = miner;
        self
    }

    pub fn with_num_images(mut self, num_images: usize) -> Self {
        self.num_images = num_images;
        self
    }

    pub fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    /// `image_b64` is a base64 PNG, see [`crate::niche::codec::encode_png_base64`].
    pub fn with_conditioning_image(mut self, image_b64: impl Into<String>) -> Self {
        self.conditional_image = Some(image_b64.into());
        self
    }

    /// Strengths are clamped to [0, 1].
    pub fn with_controlnet_scales(mut self, scales: Vec<f32>) -> Self {
        self.controlnet_conditioning_scale =
            Some(scales.into_iter().map(|s| s.clamp(0.0, 1.0)).collect());
        self
    }
}

/// Caller-supplied secret checked against the configured API token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub secret_key: String,
}

impl Credentials {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
        }
    }
}
