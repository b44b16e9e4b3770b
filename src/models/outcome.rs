use crate::error::GenerationFailure;
use image::{DynamicImage, GenericImageView, RgbImage};
use std::time::Duration;

/// Result of one generation call. Failures stay local to their slot.
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Image(DynamicImage),
    Failed(GenerationFailure),
}

impl GenerationOutcome {
    pub fn is_image(&self) -> bool {
        matches!(self, GenerationOutcome::Image(_))
    }

    pub fn failure(&self) -> Option<&GenerationFailure> {
        match self {
            GenerationOutcome::Failed(reason) => Some(reason),
            GenerationOutcome::Image(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DisplayImage {
    Generated(DynamicImage),
    Placeholder(RgbImage),
}

impl DisplayImage {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, DisplayImage::Placeholder(_))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            DisplayImage::Generated(image) => image.dimensions(),
            DisplayImage::Placeholder(image) => image.dimensions(),
        }
    }
}

/// Slot `i` always belongs to request `i`.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub batch_id: String,
    pub seeds: Vec<u64>,
    pub images: Vec<DisplayImage>,
    pub duration: Duration,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn generated_count(&self) -> usize {
        self.images.iter().filter(|img| !img.is_placeholder()).count()
    }

    pub fn placeholder_indices(&self) -> Vec<usize> {
        self.images
            .iter()
            .enumerate()
            .filter(|(_, img)| img.is_placeholder())
            .map(|(i, _)| i)
            .collect()
    }
}
