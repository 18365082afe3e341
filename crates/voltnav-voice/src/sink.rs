//! The speech output capability.
//!
//! The announcer only ever needs to say one thing at a time, so a sink is a
//! single `speak` plus `cancel`. Backends own whatever process or device
//! state sits behind that.

use crate::error::VoiceError;
use tracing::info;
use voltnav_types::{VoiceInfo, VoiceSettings};

/// Text plus the voice parameters to render it with.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voice: Option<VoiceInfo>,
}

impl Utterance {
    /// Builds an utterance carrying the current voice settings.
    pub fn new(text: impl Into<String>, settings: &VoiceSettings) -> Self {
        Self {
            text: text.into(),
            rate: settings.rate,
            pitch: settings.pitch,
            volume: settings.volume,
            voice: settings.voice.clone(),
        }
    }
}

/// A text-to-speech output.
pub trait SpeechSink {
    /// Starts speaking `utterance`. Callers cancel any previous utterance
    /// first; a sink may assume nothing else is in flight.
    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError>;

    /// Stops the in-flight utterance, if any. Never fails.
    fn cancel(&mut self);

    /// Voices this sink can speak with.
    fn voices(&self) -> Result<Vec<VoiceInfo>, VoiceError> {
        Ok(Vec::new())
    }

    /// Blocks until the in-flight utterance, if any, has finished.
    fn wait_until_idle(&mut self) -> Result<(), VoiceError> {
        Ok(())
    }
}

impl<S: SpeechSink + ?Sized> SpeechSink for Box<S> {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError> {
        (**self).speak(utterance)
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn voices(&self) -> Result<Vec<VoiceInfo>, VoiceError> {
        (**self).voices()
    }

    fn wait_until_idle(&mut self) -> Result<(), VoiceError> {
        (**self).wait_until_idle()
    }
}

/// Writes utterances to the log instead of producing audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SpeechSink for LogSink {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError> {
        info!(
            text = %utterance.text,
            rate = utterance.rate,
            pitch = utterance.pitch,
            volume = utterance.volume,
            voice = utterance.voice.as_ref().map(|v| v.name.as_str()),
            "speak"
        );
        Ok(())
    }

    fn cancel(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utterance_copies_settings() {
        let settings = VoiceSettings {
            rate: 1.25,
            pitch: 0.5,
            volume: 0.3,
            voice: Some(VoiceInfo::new("en-us", "en-us", false)),
            ..Default::default()
        };
        let utterance = Utterance::new("Turn left", &settings);
        assert_eq!(utterance.text, "Turn left");
        assert_eq!(utterance.rate, 1.25);
        assert_eq!(utterance.pitch, 0.5);
        assert_eq!(utterance.volume, 0.3);
        assert_eq!(utterance.voice, settings.voice);
    }

    #[test]
    fn boxed_log_sink_speaks() {
        let mut sink: Box<dyn SpeechSink + Send> = Box::new(LogSink);
        let utterance = Utterance::new("Continue north", &VoiceSettings::default());
        assert!(sink.speak(&utterance).is_ok());
        sink.cancel();
        assert!(sink.voices().unwrap().is_empty());
        assert!(sink.wait_until_idle().is_ok());
    }
}
