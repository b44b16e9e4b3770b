pub mod aggregator;
pub mod builder;
pub mod codec;
pub mod dispatcher;
pub mod orchestrator;
pub mod stats_client;
#[cfg(test)]
pub(crate) mod testing;
pub mod transport;

use crate::{
    config::StudioConfig,
    error::{NicheError, Result, ValidationError},
    models::{BatchResult, BatchSpec, Credentials, ModelRegistry, UidInfoResponse},
};
use reqwest::Client;
use std::sync::Arc;

pub use aggregator::ResultAggregator;
pub use builder::{RequestBuilder, ResolvedModel};
pub use dispatcher::Dispatcher;
pub use orchestrator::{BatchPhase, Orchestrator};
pub use stats_client::StatsClient;
pub use transport::{HttpTransport, ImageTransport};

/// Entry point bundling batch generation and network statistics over one HTTP client.
#[derive(Clone)]
pub struct NicheClient {
    orchestrator: Orchestrator,
    stats: StatsClient,
}

impl NicheClient {
    pub fn new(config: StudioConfig) -> Result<Self> {
        Self::with_registry(config, ModelRegistry::builtin())
    }

    pub fn with_registry(config: StudioConfig, registry: ModelRegistry) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .build()
            .map_err(|e| NicheError::ConfigError(format!("HTTP client: {}", e)))?;

        let transport = HttpTransport::with_client(client.clone(), config.generate_url.clone());
        let stats = StatsClient::new(client, config.stats_url.clone());
        let orchestrator = Orchestrator::new(config, registry, Arc::new(transport));

        log::info!(
            "NicheImage client ready for {}",
            orchestrator.config().generate_url
        );

        Ok(Self {
            orchestrator,
            stats,
        })
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn models(&self) -> Vec<&str> {
        self.orchestrator.builder().registry().model_names()
    }

    pub async fn generate(
        &self,
        spec: &BatchSpec,
        credentials: &Credentials,
    ) -> std::result::Result<BatchResult, ValidationError> {
        self.orchestrator.execute(spec, credentials).await
    }

    pub async fn stats(&self) -> Result<UidInfoResponse> {
        self.stats.fetch().await
    }
}
