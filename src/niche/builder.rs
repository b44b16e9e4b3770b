use crate::{
    error::ValidationError,
    models::{
        AspectRatio, BatchSpec, GenerationRequest, ModelRegistry, PipelineParams, SeedPolicy,
        RANDOM_SEED_BOUND,
    },
};
use rand::Rng;
use std::sync::Arc;

/// Generation settings of a registered model at one aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedModel {
    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
}

/// Expands a [`BatchSpec`] into one request per image, differing only by seed.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    registry: Arc<ModelRegistry>,
    api_token: String,
}

impl RequestBuilder {
    pub fn new(registry: Arc<ModelRegistry>, api_token: impl Into<String>) -> Self {
        Self {
            registry,
            api_token: api_token.into(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Looks up the model profile and the resolution for the requested aspect ratio.
    pub fn resolve(&self, spec: &BatchSpec) -> Result<ResolvedModel, ValidationError> {
        let profile = self
            .registry
            .get(&spec.model_name)
            .ok_or_else(|| ValidationError::UnknownModel(spec.model_name.clone()))?;

        let unknown_ratio = || ValidationError::UnknownAspectRatio {
            model: spec.model_name.clone(),
            ratio: spec.aspect_ratio.clone(),
        };
        let ratio: AspectRatio = spec.aspect_ratio.parse().map_err(|_| unknown_ratio())?;
        let (width, height) = profile.resolution(ratio).ok_or_else(unknown_ratio)?;

        Ok(ResolvedModel {
            width,
            height,
            num_inference_steps: profile.num_inference_steps,
            guidance_scale: profile.guidance_scale,
        })
    }

    pub fn build(&self, spec: &BatchSpec) -> Result<Vec<GenerationRequest>, ValidationError> {
        let resolved = self.resolve(spec)?;
        Ok(self.build_resolved(spec, &resolved))
    }

    /// Builds the batch for an already resolved model; cannot fail.
    pub fn build_resolved(
        &self,
        spec: &BatchSpec,
        resolved: &ResolvedModel,
    ) -> Vec<GenerationRequest> {
        let pipeline_params = PipelineParams {
            width: resolved.width,
            height: resolved.height,
            num_inference_steps: resolved.num_inference_steps,
            guidance_scale: resolved.guidance_scale,
            negative_prompt: spec.negative_prompt.clone(),
            controlnet_conditioning_scale: spec.controlnet_conditioning_scale.clone(),
        };

        resolve_seeds(spec.seed, spec.num_images)
            .into_iter()
            .map(|seed| GenerationRequest {
                key: self.api_token.clone(),
                prompt: spec.prompt.clone(),
                negative_prompt: spec.negative_prompt.clone(),
                model_name: spec.model_name.clone(),
                pipeline_type: spec.pipeline_type,
                seed,
                miner_uid: spec.miner,
                conditional_image: spec.conditional_image.clone(),
                pipeline_params: pipeline_params.clone(),
            })
            .collect()
    }
}

/// `Explicit(base)` with `base >= 0` yields `base..base + count`; anything else draws
/// each seed independently from `[0, 10^9)`.
pub fn resolve_seeds(policy: SeedPolicy, count: usize) -> Vec<u64> {
    match policy {
        SeedPolicy::Explicit(base) if base >= 0 => {
            let base = base as u64;
            (0..count as u64).map(|i| base + i).collect()
        }
        _ => {
            let mut rng = rand::thread_rng();
            (0..count)
                .map(|_| rng.gen_range(0..RANDOM_SEED_BOUND))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MinerTarget, PipelineType};

    fn builder() -> RequestBuilder {
        RequestBuilder::new(Arc::new(ModelRegistry::builtin()), "token")
    }

    #[test]
    fn explicit_seeds_are_consecutive() {
        for count in 1..=4 {
            for base in [0_i64, 10, 999_999_999] {
                let spec = BatchSpec::new("RealisticVision", "a cat")
                    .with_num_images(count)
                    .with_seed(SeedPolicy::Explicit(base));
                let seeds: Vec<u64> = builder()
                    .build(&spec)
                    .unwrap()
                    .iter()
                    .map(|r| r.seed)
                    .collect();
                let expected: Vec<u64> = (0..count as u64).map(|i| base as u64 + i).collect();
                assert_eq!(seeds, expected);
            }
        }
    }

    #[test]
    fn random_seeds_stay_in_range() {
        let spec = BatchSpec::new("AnimeV3", "a fox").with_seed(SeedPolicy::Random);
        let first: Vec<u64> = builder().build(&spec).unwrap().iter().map(|r| r.seed).collect();
        let second: Vec<u64> = builder().build(&spec).unwrap().iter().map(|r| r.seed).collect();

        assert_eq!(first.len(), 4);
        assert!(first.iter().chain(&second).all(|&s| s < RANDOM_SEED_BOUND));
        assert_ne!(first, second);
    }

    #[test]
    fn negative_base_falls_back_to_random() {
        let seeds = resolve_seeds(SeedPolicy::Explicit(-1), 3);
        assert_eq!(seeds.len(), 3);
        assert!(seeds.iter().all(|&s| s < RANDOM_SEED_BOUND));
    }

    #[test]
    fn requests_share_everything_but_seed() {
        let spec = BatchSpec::new("RealisticVision", "a lighthouse")
            .with_aspect_ratio("Tall")
            .with_pipeline(PipelineType::ImageToImage)
            .with_miner(MinerTarget::Uid(3))
            .with_conditioning_image("aGVsbG8=")
            .with_seed(SeedPolicy::Explicit(5));
        let requests = builder().build(&spec).unwrap();

        assert_eq!(requests.len(), 4);
        for request in &requests {
            assert_eq!(request.key, "token");
            assert_eq!(request.model_name, "RealisticVision");
            assert_eq!(request.pipeline_type, PipelineType::ImageToImage);
            assert_eq!(request.miner_uid, MinerTarget::Uid(3));
            assert_eq!(request.conditional_image.as_deref(), Some("aGVsbG8="));
            assert_eq!(request.pipeline_params, requests[0].pipeline_params);
        }
        assert_eq!(requests[0].pipeline_params.width, 512);
        assert_eq!(requests[0].pipeline_params.height, 768);
    }

    #[test]
    fn unknown_model_builds_nothing() {
        let spec = BatchSpec::new("StableDiffusion9", "a cat");
        assert_eq!(
            builder().build(&spec),
            Err(ValidationError::UnknownModel("StableDiffusion9".to_string()))
        );
    }

    #[test]
    fn unknown_ratio_is_rejected() {
        let spec = BatchSpec::new("DreamShaper", "a cat").with_aspect_ratio("panorama");
        assert!(matches!(
            builder().build(&spec),
            Err(ValidationError::UnknownAspectRatio { .. })
        ));
    }

    #[test]
    fn registered_model_without_ratio_is_rejected() {
        use crate::models::ModelProfile;

        let registry = ModelRegistry::new().with_profile(
            ModelProfile::new("SquareOnly", 4, 1.0).with_resolution(AspectRatio::Square, 256, 256),
        );
        let builder = RequestBuilder::new(Arc::new(registry), "token");
        let spec = BatchSpec::new("SquareOnly", "a cat").with_aspect_ratio("wide");
        assert_eq!(
            builder.build(&spec),
            Err(ValidationError::UnknownAspectRatio {
                model: "SquareOnly".to_string(),
                ratio: "wide".to_string(),
            })
        );
    }
}
