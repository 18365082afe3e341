//! Voice output configuration and backend selection.

use crate::error::VoiceError;
use crate::espeak::EspeakSink;
use crate::sink::{LogSink, SpeechSink};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use voltnav_types::VoiceSettings;

fn default_enabled() -> bool {
    true
}

fn default_rate() -> f32 {
    1.0
}

fn default_pitch() -> f32 {
    1.0
}

fn default_volume() -> f32 {
    0.8
}

fn default_language() -> String {
    "en".to_string()
}

fn default_espeak_binary() -> String {
    "espeak-ng".to_string()
}

/// Where spoken text goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechBackend {
    /// The `espeak-ng` synthesizer.
    #[default]
    Espeak,
    /// Log lines only, no audio.
    Log,
}

impl fmt::Display for SpeechBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Espeak => f.write_str("espeak"),
            Self::Log => f.write_str("log"),
        }
    }
}

impl FromStr for SpeechBackend {
    type Err = VoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "espeak" | "espeak-ng" => Ok(Self::Espeak),
            "log" => Ok(Self::Log),
            other => Err(VoiceError::Config(format!(
                "unknown speech backend: {other} (expected \"espeak\" or \"log\")"
            ))),
        }
    }
}

/// Voice output configuration, as read from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_rate")]
    pub rate: f32,
    #[serde(default = "default_pitch")]
    pub pitch: f32,
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Preferred voice language tag. Default: `en`.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub backend: SpeechBackend,
    /// Path or name of the espeak-ng binary. Default: `espeak-ng` from `PATH`.
    #[serde(default = "default_espeak_binary")]
    pub espeak_binary: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            rate: default_rate(),
            pitch: default_pitch(),
            volume: default_volume(),
            language: default_language(),
            backend: SpeechBackend::default(),
            espeak_binary: default_espeak_binary(),
        }
    }
}

impl VoiceConfig {
    /// Initial announcer settings. No voice is selected yet; that happens
    /// when the announcer is initialized against its sink.
    pub fn settings(&self) -> VoiceSettings {
        VoiceSettings {
            enabled: self.enabled,
            rate: self.rate,
            pitch: self.pitch,
            volume: self.volume,
            voice: None,
        }
    }

    pub fn validate(&self) -> Result<(), VoiceError> {
        self.settings()
            .validate()
            .map_err(|e| VoiceError::Config(e.to_string()))?;
        if self.backend == SpeechBackend::Espeak && self.espeak_binary.trim().is_empty() {
            return Err(VoiceError::Config(
                "espeak_binary must not be empty when backend is espeak".to_string(),
            ));
        }
        Ok(())
    }

    /// Constructs the configured speech backend.
    pub fn build_sink(&self) -> Box<dyn SpeechSink + Send> {
        match self.backend {
            SpeechBackend::Espeak => Box::new(EspeakSink::new(&self.espeak_binary)),
            SpeechBackend::Log => Box::new(LogSink),
        }
    }
}
