//! Simulator configuration loading from file and environment variables.

use serde::Deserialize;
use thiserror::Error;
use voltnav_types::Position;
use voltnav_voice::VoiceConfig;

/// Top-level simulator configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Voice output settings.
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Route to drive.
    #[serde(default)]
    pub route: RouteConfig,

    /// Vehicle movement settings.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Route source.
///
/// A route file takes precedence; without one, a straight line from `start`
/// to `end` is used.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    /// Starting point as `[lng, lat]`.
    #[serde(default = "default_start")]
    pub start: Position,

    /// End point as `[lng, lat]`.
    #[serde(default = "default_end")]
    pub end: Position,

    /// Destination name used in the arrival prompt.
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Optional path to a JSON route file.
    #[serde(default)]
    pub file: Option<String>,
}

/// Simulated vehicle movement.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Initial vehicle speed in km/h.
    #[serde(default = "default_speed_kmh")]
    pub speed_kmh: f64,

    /// Maximum random speed change per tick in km/h. 0 disables jitter.
    #[serde(default = "default_speed_jitter_kmh")]
    pub speed_jitter_kmh: f64,

    /// Interval between position samples in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Simulated seconds per real second.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,

    /// Seed for the speed jitter. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "voltnav_voice=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_start() -> Position {
    // Ferry Building, San Francisco
    Position::new(-122.3937, 37.7955)
}

fn default_end() -> Position {
    // Union Square, San Francisco
    Position::new(-122.4075, 37.7880)
}

fn default_destination() -> String {
    "Union Square".to_string()
}

fn default_speed_kmh() -> f64 {
    45.0
}

fn default_speed_jitter_kmh() -> f64 {
    5.0
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            destination: default_destination(),
            file: None,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed_kmh: default_speed_kmh(),
            speed_jitter_kmh: default_speed_jitter_kmh(),
            tick_ms: default_tick_ms(),
            time_scale: default_time_scale(),
            seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The voice section holds unusable values.
    #[error(transparent)]
    Voice(#[from] voltnav_voice::VoiceError),

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.voice.validate()?;

        let sim = &self.simulation;
        if !(sim.speed_kmh.is_finite() && sim.speed_kmh > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "simulation.speed_kmh must be positive, got {}",
                sim.speed_kmh
            )));
        }
        if !(sim.speed_jitter_kmh.is_finite() && sim.speed_jitter_kmh >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "simulation.speed_jitter_kmh must not be negative, got {}",
                sim.speed_jitter_kmh
            )));
        }
        if sim.tick_ms == 0 {
            return Err(ConfigError::Invalid(
                "simulation.tick_ms must be at least 1".to_string(),
            ));
        }
        if !(sim.time_scale.is_finite() && sim.time_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "simulation.time_scale must be positive, got {}",
                sim.time_scale
            )));
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `VOLTNAV_LOG_LEVEL` overrides `logging.level`
/// - `VOLTNAV_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `VOLTNAV_VOICE_ENABLED` overrides `voice.enabled`
/// - `VOLTNAV_VOICE_BACKEND` overrides `voice.backend` ("espeak" or "log")
/// - `VOLTNAV_SPEED_KMH` overrides `simulation.speed_kmh`
/// - `VOLTNAV_ROUTE_FILE` overrides `route.file`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed, or
/// if the resulting configuration is invalid.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;

    Ok(config)
}

/// Applies overrides from `lookup`, which maps variable names to values.
fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(level) = lookup("VOLTNAV_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("VOLTNAV_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(enabled) = lookup("VOLTNAV_VOICE_ENABLED") {
        config.voice.enabled = enabled == "true" || enabled == "1";
    }
    if let Some(backend) = lookup("VOLTNAV_VOICE_BACKEND") {
        config.voice.backend = backend.parse()?;
    }
    if let Some(speed) = lookup("VOLTNAV_SPEED_KMH") {
        if let Ok(parsed) = speed.parse() {
            config.simulation.speed_kmh = parsed;
        }
    }
    if let Some(file) = lookup("VOLTNAV_ROUTE_FILE") {
        if !file.trim().is_empty() {
            config.route.file = Some(file);
        }
    }
    Ok(())
}
