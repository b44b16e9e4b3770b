use crate::error::{NicheError, Result};
use image::Rgb;
use std::env;
use std::time::Duration;

pub const DEFAULT_GENERATE_URL: &str =
    "http://proxy_client_nicheimage.nichetensor.com:10003/generate";
pub const DEFAULT_STATS_URL: &str =
    "http://proxy_client_nicheimage.nichetensor.com:10003/get_uid_info";
pub const DEFAULT_SLOT_COUNT: usize = 4;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    pub api_token: String,
    pub generate_url: String,
    pub stats_url: String,
    pub request_timeout: Duration,
    pub slot_count: usize,
    pub placeholder_color: Rgb<u8>,
    pub max_in_flight: Option<usize>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            api_token: String::new(),
            generate_url: DEFAULT_GENERATE_URL.to_string(),
            stats_url: DEFAULT_STATS_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            slot_count: DEFAULT_SLOT_COUNT,
            placeholder_color: BLACK,
            max_in_flight: None,
        }
    }
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `NICHE_*` variables; anything missing or unparsable keeps its default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_token = env::var("NICHE_API_TOKEN").unwrap_or(defaults.api_token);
        let generate_url = env::var("NICHE_GENERATE_URL").unwrap_or(defaults.generate_url);
        let stats_url = env::var("NICHE_STATS_URL").unwrap_or(defaults.stats_url);
        let request_timeout = env::var("NICHE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let slot_count = env::var("NICHE_SLOT_COUNT")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.slot_count);
        let placeholder_color = env::var("NICHE_PLACEHOLDER_COLOR")
            .ok()
            .and_then(|s| parse_color(&s).ok())
            .unwrap_or(defaults.placeholder_color);
        let max_in_flight = env::var("NICHE_MAX_IN_FLIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n: &usize| n > 0);

        StudioConfig {
            api_token,
            generate_url,
            stats_url,
            request_timeout,
            slot_count,
            placeholder_color,
            max_in_flight,
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = token.into();
        self
    }

    pub fn with_generate_url(mut self, url: impl Into<String>) -> Self {
        self.generate_url = url.into();
        self
    }

    pub fn with_stats_url(mut self, url: impl Into<String>) -> Self {
        self.stats_url = url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_slot_count(mut self, slot_count: usize) -> Self {
        self.slot_count = slot_count;
        self
    }

    pub fn with_placeholder_color(mut self, color: Rgb<u8>) -> Self {
        self.placeholder_color = color;
        self
    }

    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.slot_count == 0 {
            return Err(NicheError::ConfigError(
                "slot count must be at least 1".into(),
            ));
        }
        if self.max_in_flight == Some(0) {
            return Err(NicheError::ConfigError(
                "max in-flight requests must be at least 1".into(),
            ));
        }
        if self.generate_url.is_empty() {
            return Err(NicheError::ConfigError("generate URL is required".into()));
        }
        Ok(())
    }
}

/// Accepts `black`, `white` or `#rrggbb`.
pub fn parse_color(input: &str) -> Result<Rgb<u8>> {
    let value = input.trim().to_lowercase();
    match value.as_str() {
        "black" => return Ok(BLACK),
        "white" => return Ok(WHITE),
        _ => {}
    }

    let hex = value
        .strip_prefix('#')
        .filter(|h| h.len() == 6)
        .ok_or_else(|| NicheError::ConfigError(format!("Invalid colour: {}", input)))?;

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| NicheError::ConfigError(format!("Invalid colour: {}", input)))
    };
    Ok(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}
