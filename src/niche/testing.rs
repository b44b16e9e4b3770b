//! Scriptable in-memory transport for dispatcher and orchestrator tests.

use crate::{
    error::GenerationFailure,
    models::{GenerationOutcome, GenerationRequest},
    niche::transport::ImageTransport,
};
use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Answers every request with a solid image whose red channel is `seed % 256`.
#[derive(Default)]
pub struct MockTransport {
    failing_seeds: HashSet<u64>,
    delays: HashMap<u64, Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    seen_seeds: Mutex<Vec<u64>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, seed: u64) -> Self {
        self.failing_seeds.insert(seed);
        self
    }

    pub fn delayed(mut self, seed: u64, delay: Duration) -> Self {
        self.delays.insert(seed, delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn seen_seeds(&self) -> Vec<u64> {
        self.seen_seeds.lock().unwrap().clone()
    }

    pub fn marker(seed: u64) -> Rgb<u8> {
        Rgb([(seed % 256) as u8, 0, 0])
    }
}

#[async_trait]
impl ImageTransport for MockTransport {
    async fn send(&self, request: &GenerationRequest) -> GenerationOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_seeds.lock().unwrap().push(request.seed);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .get(&request.seed)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_seeds.contains(&request.seed) {
            return GenerationOutcome::Failed(GenerationFailure::Transport(format!(
                "connection reset for seed {}",
                request.seed
            )));
        }

        let params = &request.pipeline_params;
        GenerationOutcome::Image(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            params.width,
            params.height,
            Self::marker(request.seed),
        )))
    }
}
