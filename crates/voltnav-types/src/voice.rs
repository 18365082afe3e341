//! Voice settings and synthesis voice descriptors.
//!
//! `VoiceSettings` is the configuration surface of the announcer. It is
//! applied to every utterance at the moment it is spoken, so updates take
//! effect on the next announcement.

use serde::{Deserialize, Deserializer, Serialize};
use std::ops::RangeInclusive;

/// Accepted speech rate multipliers (1.0 is normal speed).
pub const RATE_RANGE: RangeInclusive<f32> = 0.1..=10.0;
/// Accepted pitch multipliers (1.0 is the voice's natural pitch).
pub const PITCH_RANGE: RangeInclusive<f32> = 0.0..=2.0;
/// Accepted volume levels (1.0 is full volume).
pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// A synthesis voice offered by a speech backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Backend-specific voice name, passed back to the backend when speaking.
    pub name: String,
    /// Language tag, e.g. `en`, `en-us`, `de`.
    pub language: String,
    /// Whether the backend considers this its default voice.
    #[serde(default)]
    pub is_default: bool,
}

impl VoiceInfo {
    pub fn new(name: impl Into<String>, language: impl Into<String>, is_default: bool) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            is_default,
        }
    }
}

/// Voice output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// When false, nothing is spoken and in-flight speech is cancelled.
    pub enabled: bool,
    /// Speech rate multiplier.
    pub rate: f32,
    /// Pitch multiplier.
    pub pitch: f32,
    /// Output volume.
    pub volume: f32,
    /// Selected voice. `None` uses the backend default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceInfo>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 1.0,
            pitch: 1.0,
            volume: 0.8,
            voice: None,
        }
    }
}

/// A partial settings change. Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettingsUpdate {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub rate: Option<f32>,
    #[serde(default)]
    pub pitch: Option<f32>,
    #[serde(default)]
    pub volume: Option<f32>,
    /// `Some(None)` clears the selected voice. On the wire, an absent field
    /// leaves the voice alone and an explicit `null` clears it.
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub voice: Option<Option<VoiceInfo>>,
}

/// Maps a present field to `Some`, so `null` becomes `Some(None)`. Absent
/// fields never reach this and fall back to `default`.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A settings value outside its accepted range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} must be between {min} and {max}, got {value}")]
pub struct SettingsError {
    pub field: &'static str,
    pub min: f32,
    pub max: f32,
    pub value: f32,
}

fn check_range(
    field: &'static str,
    range: &RangeInclusive<f32>,
    value: f32,
) -> Result<(), SettingsError> {
    // NaN fails `contains`, so it is rejected here too.
    if range.contains(&value) {
        Ok(())
    } else {
        Err(SettingsError {
            field,
            min: *range.start(),
            max: *range.end(),
            value,
        })
    }
}

impl VoiceSettings {
    /// Checks that rate, pitch and volume are within their accepted ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_range("rate", &RATE_RANGE, self.rate)?;
        check_range("pitch", &PITCH_RANGE, self.pitch)?;
        check_range("volume", &VOLUME_RANGE, self.volume)?;
        Ok(())
    }

    /// Returns a copy of these settings with `update` merged in.
    ///
    /// The merged result is validated as a whole; on error `self` is left
    /// as it was.
    pub fn merged(&self, update: VoiceSettingsUpdate) -> Result<Self, SettingsError> {
        let merged = Self {
            enabled: update.enabled.unwrap_or(self.enabled),
            rate: update.rate.unwrap_or(self.rate),
            pitch: update.pitch.unwrap_or(self.pitch),
            volume: update.volume.unwrap_or(self.volume),
            voice: match update.voice {
                Some(voice) => voice,
                None => self.voice.clone(),
            },
        };
        merged.validate()?;
        Ok(merged)
    }
}
