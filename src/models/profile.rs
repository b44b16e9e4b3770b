use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    Square,
    Tall,
    Wide,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "square",
            AspectRatio::Tall => "tall",
            AspectRatio::Wide => "wide",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    /// Case-insensitive, so the UI labels "Square"/"Tall"/"Wide" parse too.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "square" => Ok(AspectRatio::Square),
            "tall" => Ok(AspectRatio::Tall),
            "wide" => Ok(AspectRatio::Wide),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    pub name: String,
    pub resolutions: HashMap<AspectRatio, (u32, u32)>,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
}

impl ModelProfile {
    pub fn new(name: impl Into<String>, num_inference_steps: u32, guidance_scale: f32) -> Self {
        Self {
            name: name.into(),
            resolutions: HashMap::new(),
            num_inference_steps,
            guidance_scale,
        }
    }

    pub fn with_resolution(mut self, ratio: AspectRatio, width: u32, height: u32) -> Self {
        self.resolutions.insert(ratio, (width, height));
        self
    }

    /// 512x512, 512x768, 768x512.
    fn sd15_family(self) -> Self {
        self.with_resolution(AspectRatio::Square, 512, 512)
            .with_resolution(AspectRatio::Tall, 512, 768)
            .with_resolution(AspectRatio::Wide, 768, 512)
    }

    fn sdxl_family(self) -> Self {
        self.with_resolution(AspectRatio::Square, 1024, 1024)
            .with_resolution(AspectRatio::Tall, 672, 1024)
            .with_resolution(AspectRatio::Wide, 1024, 672)
    }

    pub fn resolution(&self, ratio: AspectRatio) -> Option<(u32, u32)> {
        self.resolutions.get(&ratio).copied()
    }
}

static BUILTIN_PROFILES: Lazy<Vec<ModelProfile>> = Lazy::new(|| {
    vec![
        ModelProfile::new("RealisticVision", 30, 7.0).sd15_family(),
        ModelProfile::new("AnimeV3", 25, 7.0).sdxl_family(),
        ModelProfile::new("DreamShaper", 30, 7.0).sd15_family(),
        ModelProfile::new("RealitiesEdgeXL", 7, 2.5).sdxl_family(),
    ]
});

/// Read-only lookup of the models the network serves.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    profiles: HashMap<String, ModelProfile>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        BUILTIN_PROFILES
            .iter()
            .cloned()
            .fold(Self::new(), |registry, profile| registry.with_profile(profile))
    }

    pub fn with_profile(mut self, profile: ModelProfile) -> Self {
        self.profiles.insert(profile.name.clone(), profile);
        self
    }

    pub fn get(&self, model_name: &str) -> Option<&ModelProfile> {
        self.profiles.get(model_name)
    }

    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
