use crate::config::StudioConfig;
use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::RwLock;
use std::time::{Duration, Instant};

static CONSOLE_LOGGER: Lazy<ConsoleLogger> = Lazy::new(ConsoleLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level;
    CONSOLE_LOGGER.update_config(config);

    log::set_logger(&*CONSOLE_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(max_level);
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LevelFilter,
    pub show_colors: bool,
    pub show_file_location: bool,
    pub include_timestamp: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    /// Only records whose target starts with one of these are shown; empty shows all.
    pub targets: Vec<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::Info,
            show_colors: true,
            show_file_location: false,
            include_timestamp: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            targets: Vec::new(),
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LevelFilter::Info,
            show_colors: false,
            output_json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LevelFilter::Debug,
            show_colors: true,
            show_file_location: true,
            ..Default::default()
        }
    }

    fn accepts(&self, target: &str) -> bool {
        self.targets.is_empty() || self.targets.iter().any(|t| target.starts_with(t.as_str()))
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Trace => Color::Cyan,
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
    }
}

pub struct ConsoleLogger {
    config: RwLock<LoggerConfig>,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(LoggerConfig::default()),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) {
        if let Ok(mut config) = self.config.write() {
            *config = new_config;
        }
    }

    fn entry(record: &Record, config: &LoggerConfig) -> LogEntry {
        let location = if config.show_file_location {
            record
                .file()
                .map(|file| format!("{}:{}", file, record.line().unwrap_or(0)))
        } else {
            None
        };

        LogEntry {
            timestamp: Utc::now(),
            level: record.level().to_string(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            location,
        }
    }

    fn format_line(entry: &LogEntry, level: Level, config: &LoggerConfig) -> String {
        let mut line = String::new();

        if config.include_timestamp {
            let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
            if config.show_colors {
                line.push_str(&format!("{} ", timestamp.bright_black()));
            } else {
                line.push_str(&format!("{} ", timestamp));
            }
        }

        if config.show_colors {
            line.push_str(&format!(
                "[{}] {} ",
                format!("{:5}", entry.level).color(level_color(level)).bold(),
                entry.target.bright_blue()
            ));
        } else {
            line.push_str(&format!("[{:5}] {} ", entry.level, entry.target));
        }

        line.push_str(&entry.message);

        if let Some(location) = &entry.location {
            if config.show_colors {
                line.push_str(&format!(" ({})", location.bright_black()));
            } else {
                line.push_str(&format!(" ({})", location));
            }
        }

        line
    }

    fn render(record: &Record, config: &LoggerConfig) -> String {
        let entry = Self::entry(record, config);
        if config.output_json {
            serde_json::to_string(&entry).unwrap_or_default()
        } else {
            Self::format_line(&entry, record.level(), config)
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.read() {
            Ok(config) => metadata.level() <= config.min_level && config.accepts(metadata.target()),
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(config) = self.config.read() {
            let line = Self::render(record, &config);
            if record.level() <= Level::Warn {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}

/// Wall-clock timer; logs its total on drop.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("Starting timer: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::debug!(
            "Timer '{}' finished after {}ms",
            self.name,
            self.elapsed().as_millis()
        );
    }
}

/// Startup banner. Never prints the token itself.
pub fn log_config_info(config: &StudioConfig) {
    log::info!("Configuration loaded:");
    log::info!("   Generate endpoint: {}", config.generate_url);
    log::info!("   Stats endpoint: {}", config.stats_url);
    log::info!(
        "   API token: {}",
        if config.api_token.is_empty() { "not set" } else { "set" }
    );
    log::info!("   Per-request timeout: {:?}", config.request_timeout);
    log::info!("   Display slots: {}", config.slot_count);
    match config.max_in_flight {
        Some(limit) => log::info!("   Max in-flight requests: {}", limit),
        None => log::info!("   Max in-flight requests: unbounded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_line(config: &LoggerConfig, level: Level, message: &str) -> String {
        ConsoleLogger::render(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target("nichegen::niche")
                .file(Some("src/niche/mod.rs"))
                .line(Some(42))
                .build(),
            config,
        )
    }

    #[test]
    fn test_logger_config() {
        let config = LoggerConfig::development();
        assert_eq!(config.min_level, LevelFilter::Debug);
        assert!(config.show_colors);

        let prod_config = LoggerConfig::production();
        assert!(!prod_config.show_colors);
        assert!(prod_config.output_json);
    }

    #[test]
    fn plain_line_has_level_target_and_location() {
        let mut config = LoggerConfig::development()
            .with_colors(false)
            .with_level(LevelFilter::Trace);
        config.include_timestamp = false;

        let line = record_line(&config, Level::Warn, "slot 1 failed");
        assert_eq!(line, "[WARN ] nichegen::niche slot 1 failed (src/niche/mod.rs:42)");
    }

    #[test]
    fn json_output_is_structured() {
        let line = record_line(&LoggerConfig::production(), Level::Info, "batch complete");
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "batch complete");
        assert!(value.get("location").is_none());
    }

    #[test]
    fn target_filter() {
        let config = LoggerConfig::new().with_target("nichegen");
        assert!(config.accepts("nichegen::niche::dispatcher"));
        assert!(!config.accepts("reqwest::connect"));
        assert!(LoggerConfig::new().accepts("hyper"));
    }

    #[test]
    fn test_logger_initialization() {
        let config = LoggerConfig::development();
        assert!(init_with_config(config).is_ok());
    }
}
