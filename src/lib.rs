//! Client for the NicheImage inference network.
//!
//! A [`BatchSpec`] is expanded into one seeded request per image, the requests
//! are sent concurrently, and the outcomes are assembled into a fixed grid of
//! [`DisplayImage`]s where failed or missing slots become solid placeholders.

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod niche;

pub use config::StudioConfig;
pub use error::{GenerationFailure, NicheError, Result, ValidationError};
pub use models::*;
pub use niche::{
    BatchPhase, Dispatcher, HttpTransport, ImageTransport, NicheClient, Orchestrator,
    RequestBuilder, ResultAggregator, StatsClient,
};
