use crate::{
    config::{BLACK, DEFAULT_SLOT_COUNT},
    models::{DisplayImage, GenerationOutcome},
};
use image::{Rgb, RgbImage};

/// Turns dispatcher outcomes into a fixed display grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultAggregator {
    slot_count: usize,
    fill: Rgb<u8>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_COUNT, BLACK)
    }
}

impl ResultAggregator {
    pub fn new(slot_count: usize, fill: Rgb<u8>) -> Self {
        Self { slot_count, fill }
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Keeps input order, swaps failures for `width x height` placeholders and
    /// pads the tail with placeholders up to the slot count. Never drops outcomes.
    pub fn normalize(
        &self,
        outcomes: Vec<GenerationOutcome>,
        width: u32,
        height: u32,
    ) -> Vec<DisplayImage> {
        let missing = self.slot_count.saturating_sub(outcomes.len());

        outcomes
            .into_iter()
            .map(Some)
            .chain(std::iter::repeat_with(|| None).take(missing))
            .map(|slot| match slot {
                Some(GenerationOutcome::Image(image)) => DisplayImage::Generated(image),
                Some(GenerationOutcome::Failed(_)) | None => self.placeholder(width, height),
            })
            .collect()
    }

    pub fn placeholder(&self, width: u32, height: u32) -> DisplayImage {
        DisplayImage::Placeholder(RgbImage::from_pixel(width, height, self.fill))
    }
}
