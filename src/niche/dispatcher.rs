use crate::{
    error::GenerationFailure,
    models::{GenerationOutcome, GenerationRequest},
    niche::transport::ImageTransport,
};
use futures::{future, stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Fans a batch out to the transport and joins on every call.
///
/// Outcome `i` always belongs to request `i`; completion order never matters.
/// Each call is bounded by `timeout`, so one stalled miner cannot hold the
/// whole batch. Without a concurrency cap every call starts immediately.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn ImageTransport>,
    timeout: Duration,
    max_in_flight: Option<usize>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn ImageTransport>, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            max_in_flight: None,
        }
    }

    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit.max(1));
        self
    }

    pub async fn run(&self, requests: &[GenerationRequest]) -> Vec<GenerationOutcome> {
        let units = requests
            .iter()
            .enumerate()
            .map(|(index, request)| self.dispatch_one(index, request));

        match self.max_in_flight {
            None => future::join_all(units).await,
            // `buffered` yields in submission order, not completion order.
            Some(limit) => stream::iter(units).buffered(limit).collect::<Vec<_>>().await,
        }
    }

    async fn dispatch_one(&self, index: usize, request: &GenerationRequest) -> GenerationOutcome {
        match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                log::warn!(
                    "Slot {} (seed {}) timed out after {:?}",
                    index,
                    request.seed,
                    self.timeout
                );
                GenerationOutcome::Failed(GenerationFailure::Timeout(self.timeout))
            }
        }
    }
}
