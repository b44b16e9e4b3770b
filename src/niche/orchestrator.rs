use crate::{
    config::StudioConfig,
    error::ValidationError,
    logger::Timer,
    models::{BatchResult, BatchSpec, Credentials, ModelRegistry},
    niche::{
        aggregator::ResultAggregator,
        builder::{RequestBuilder, ResolvedModel},
        dispatcher::Dispatcher,
        transport::ImageTransport,
    },
};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Validating,
    Rejected,
    Building,
    Dispatching,
    Aggregating,
    Complete,
}

impl BatchPhase {
    pub fn can_advance_to(self, next: BatchPhase) -> bool {
        use BatchPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Rejected)
                | (Validating, Building)
                | (Building, Dispatching)
                | (Dispatching, Aggregating)
                | (Aggregating, Complete)
        )
    }
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

struct PhaseTracker<'a> {
    batch_id: &'a str,
    phase: BatchPhase,
}

impl<'a> PhaseTracker<'a> {
    fn new(batch_id: &'a str) -> Self {
        Self {
            batch_id,
            phase: BatchPhase::Idle,
        }
    }

    fn advance(&mut self, next: BatchPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal transition {} -> {}",
            self.phase,
            next
        );
        log::debug!("Batch {}: {} -> {}", self.batch_id, self.phase, next);
        self.phase = next;
    }
}

/// Validate, build, dispatch, aggregate. Validation failures return before
/// any request is built or sent.
#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<StudioConfig>,
    builder: RequestBuilder,
    dispatcher: Dispatcher,
    aggregator: ResultAggregator,
}

impl Orchestrator {
    pub fn new(
        config: StudioConfig,
        registry: ModelRegistry,
        transport: Arc<dyn ImageTransport>,
    ) -> Self {
        let builder = RequestBuilder::new(Arc::new(registry), config.api_token.clone());
        let mut dispatcher = Dispatcher::new(transport, config.request_timeout);
        if let Some(limit) = config.max_in_flight {
            dispatcher = dispatcher.with_max_in_flight(limit);
        }
        let aggregator = ResultAggregator::new(config.slot_count, config.placeholder_color);

        Self {
            config: Arc::new(config),
            builder,
            dispatcher,
            aggregator,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Pre-flight checks: secret, batch size, then model and aspect ratio.
    pub fn validate(
        &self,
        spec: &BatchSpec,
        credentials: &Credentials,
    ) -> Result<ResolvedModel, ValidationError> {
        if credentials.secret_key != self.config.api_token && !spec.miner.is_any() {
            return Err(ValidationError::AuthMismatch);
        }

        let max = self.aggregator.slot_count();
        if spec.num_images == 0 || spec.num_images > max {
            return Err(ValidationError::InvalidImageCount {
                requested: spec.num_images,
                max,
            });
        }

        self.builder.resolve(spec)
    }

    pub async fn execute(
        &self,
        spec: &BatchSpec,
        credentials: &Credentials,
    ) -> Result<BatchResult, ValidationError> {
        let batch_id = Uuid::new_v4().to_string();
        let mut tracker = PhaseTracker::new(&batch_id);

        tracker.advance(BatchPhase::Validating);
        let resolved = match self.validate(spec, credentials) {
            Ok(resolved) => resolved,
            Err(e) => {
                log::warn!("Batch {} rejected: {}", batch_id, e);
                tracker.advance(BatchPhase::Rejected);
                return Err(e);
            }
        };

        tracker.advance(BatchPhase::Building);
        let requests = self.builder.build_resolved(spec, &resolved);
        let (width, height) = (resolved.width, resolved.height);
        let seeds: Vec<u64> = requests.iter().map(|r| r.seed).collect();

        log::info!(
            "Batch {}: {} x {} {}x{} via {} (seeds {:?})",
            batch_id,
            requests.len(),
            spec.model_name,
            width,
            height,
            spec.pipeline_type.as_str(),
            seeds
        );

        let timer = Timer::new(&format!("batch {}", batch_id));
        tracker.advance(BatchPhase::Dispatching);
        let outcomes = self.dispatcher.run(&requests).await;

        for (index, outcome) in outcomes.iter().enumerate() {
            if let Some(reason) = outcome.failure() {
                log::warn!(
                    "Batch {} slot {} (seed {}) failed: {}",
                    batch_id,
                    index,
                    seeds[index],
                    reason
                );
            }
        }

        tracker.advance(BatchPhase::Aggregating);
        let images = self.aggregator.normalize(outcomes, width, height);
        let duration = timer.elapsed();
        tracker.advance(BatchPhase::Complete);

        let result = BatchResult {
            batch_id,
            seeds,
            images,
            duration,
        };
        log::info!(
            "Batch {} complete: {}/{} generated in {:.3}s",
            result.batch_id,
            result.generated_count(),
            spec.num_images,
            result.duration.as_secs_f64()
        );
        Ok(result)
    }
}
