//! Proximity-triggered instruction announcements.
//!
//! The announcer holds the active instruction list for one route and the set
//! of instruction ids it has already spoken. Each position sample is checked
//! against every instruction; an instruction inside its kind's threshold is
//! spoken once and then remembered until the next route is loaded.

use crate::error::VoiceError;
use crate::sink::{SpeechSink, Utterance};
use crate::voices::select_default_voice;
use std::collections::HashSet;
use tracing::{debug, info, trace, warn};
use voltnav_geo::distance_meters;
use voltnav_types::{
    Instruction, InstructionKind, Position, VoiceInfo, VoiceSettings, VoiceSettingsUpdate,
};

/// Turn prompts closer than this are spoken without a distance phrase.
const TURN_DISTANCE_PHRASE_MIN_M: f64 = 50.0;
/// Beyond this, the distance phrase is rounded to the nearest 100 m.
const TURN_DISTANCE_ROUNDING_M: f64 = 100.0;

/// How close the traveller must be, in meters, before an instruction of
/// `kind` is spoken. `None` for kinds that are never announced by proximity.
pub fn threshold_meters(kind: InstructionKind) -> Option<f64> {
    match kind {
        InstructionKind::Turn => Some(200.0),
        InstructionKind::Continue => Some(500.0),
        InstructionKind::Warning => Some(300.0),
        InstructionKind::Arrive => Some(100.0),
        InstructionKind::Start => None,
    }
}

/// Whether an instruction of `kind` at `distance` meters is due.
pub fn is_due(kind: InstructionKind, distance: f64) -> bool {
    threshold_meters(kind).is_some_and(|threshold| distance <= threshold)
}

/// The sentence spoken for `instruction` when it is `distance` meters away.
///
/// Turns further than 50 m get a lead-in: "In 300 meters, turn left". Past
/// 100 m the figure is rounded to the nearest hundred, otherwise to the
/// nearest meter. Everything else is spoken as written.
pub fn announcement_text(instruction: &Instruction, distance: f64) -> String {
    if instruction.kind != InstructionKind::Turn || distance <= TURN_DISTANCE_PHRASE_MIN_M {
        return instruction.text.clone();
    }

    let meters = if distance > TURN_DISTANCE_ROUNDING_M {
        (distance / 100.0).round() * 100.0
    } else {
        distance.round()
    };
    format!(
        "In {} meters, {}",
        meters as u64,
        instruction.text.to_lowercase()
    )
}

/// A spoken instruction, as reported back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub id: String,
    pub text: String,
    /// Distance to the instruction when it was spoken.
    pub distance_m: f64,
}

/// Speaks navigation instructions as the traveller approaches them.
///
/// One instance serves one traveller. It is owned by whoever receives
/// position updates and is driven synchronously: every method runs to
/// completion before returning.
#[derive(Debug)]
pub struct InstructionAnnouncer<S> {
    sink: S,
    settings: VoiceSettings,
    instructions: Vec<Instruction>,
    announced: HashSet<String>,
}

impl<S: SpeechSink> InstructionAnnouncer<S> {
    /// Creates an announcer with default voice settings.
    pub fn new(sink: S) -> Self {
        Self::with_settings(sink, VoiceSettings::default())
    }

    /// Creates an announcer with the given settings.
    ///
    /// Settings are taken as-is; validate them first if they come from
    /// user input.
    pub fn with_settings(sink: S, settings: VoiceSettings) -> Self {
        Self {
            sink,
            settings,
            instructions: Vec::new(),
            announced: HashSet::new(),
        }
    }

    /// Selects a default voice for `language` from the sink's voices.
    ///
    /// Keeps the current voice when nothing matches or the sink cannot list
    /// its voices.
    pub fn initialize(&mut self, language: &str) {
        let voices = match self.sink.voices() {
            Ok(voices) => voices,
            Err(e) => {
                warn!(error = %e, "could not list voices, using backend default");
                return;
            }
        };

        match select_default_voice(&voices, language) {
            Some(voice) => {
                info!(voice = %voice.name, language = %voice.language, "selected voice");
                self.settings.voice = Some(voice);
            }
            None => {
                debug!(
                    language,
                    available = voices.len(),
                    "no matching voice, using backend default"
                );
            }
        }
    }

    /// Replaces the active instruction list and forgets what was announced.
    ///
    /// Always clears the history, even if `instructions` is the list already
    /// loaded.
    pub fn set_instructions(&mut self, instructions: Vec<Instruction>) {
        let mut seen = HashSet::with_capacity(instructions.len());
        for instruction in &instructions {
            if !seen.insert(instruction.id.as_str()) {
                warn!(id = %instruction.id, "duplicate instruction id; it will be announced once");
            }
        }

        info!(count = instructions.len(), "loaded navigation instructions");
        self.instructions = instructions;
        self.announced.clear();
    }

    /// The active instruction list.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Whether `id` has been announced since the list was loaded.
    pub fn is_announced(&self, id: &str) -> bool {
        self.announced.contains(id)
    }

    pub fn announced_count(&self) -> usize {
        self.announced.len()
    }

    /// Speaks every instruction that has become due at `position`.
    ///
    /// The whole list is scanned on each call, so several instructions can
    /// be spoken by one update; they are spoken in list order and each
    /// replaces the previous one on the sink. `heading` is informational.
    ///
    /// Does nothing while disabled or with no instructions loaded.
    pub fn check_and_announce(
        &mut self,
        position: Position,
        heading: Option<f64>,
    ) -> Vec<Announcement> {
        if !self.settings.enabled || self.instructions.is_empty() {
            return Vec::new();
        }

        trace!(%position, heading, "checking instructions");

        let due: Vec<Announcement> = self
            .instructions
            .iter()
            .filter(|instruction| !self.announced.contains(&instruction.id))
            .filter_map(|instruction| {
                let distance = distance_meters(position, instruction.position);
                is_due(instruction.kind, distance).then(|| Announcement {
                    id: instruction.id.clone(),
                    text: announcement_text(instruction, distance),
                    distance_m: distance,
                })
            })
            .collect();

        let mut spoken = Vec::with_capacity(due.len());
        for announcement in due {
            // A duplicate id later in the list is already covered.
            if !self.announced.insert(announcement.id.clone()) {
                continue;
            }
            debug!(
                id = %announcement.id,
                distance_m = announcement.distance_m,
                "instruction due"
            );
            self.speak(&announcement.text);
            spoken.push(announcement);
        }
        spoken
    }

    /// Speaks `instruction` as if it were `distance` meters away.
    ///
    /// Does not mark it as announced.
    pub fn announce(&mut self, instruction: &Instruction, distance: f64) {
        let text = announcement_text(instruction, distance);
        self.speak(&text);
    }

    /// Speaks `text` with the current settings, replacing anything in flight.
    ///
    /// A no-op while disabled. Sink failures are logged and dropped; voice
    /// output is best-effort.
    pub fn speak(&mut self, text: &str) {
        if !self.settings.enabled {
            return;
        }

        self.sink.cancel();

        info!(text, "voice navigation");
        let utterance = Utterance::new(text, &self.settings);
        if let Err(e) = self.sink.speak(&utterance) {
            warn!(error = %e, text, "speech output failed");
        }
    }

    /// Merges a partial settings update.
    ///
    /// Rejects out-of-range values and leaves the settings untouched in that
    /// case. Disabling through an update also cancels in-flight speech.
    pub fn update_settings(&mut self, update: VoiceSettingsUpdate) -> Result<(), VoiceError> {
        let merged = self
            .settings
            .merged(update)
            .map_err(|e| VoiceError::Config(e.to_string()))?;
        let disabling = self.settings.enabled && !merged.enabled;
        self.settings = merged;
        if disabling {
            self.sink.cancel();
        }
        Ok(())
    }

    /// Turns voice output on or off. Turning it off silences the sink
    /// immediately.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
        if !enabled {
            self.sink.cancel();
        }
        info!(enabled, "voice navigation toggled");
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Stops whatever is being spoken. Settings are unchanged.
    pub fn stop(&mut self) {
        self.sink.cancel();
    }

    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    /// Voices the sink offers. An enumeration failure is reported as an
    /// empty list.
    pub fn available_voices(&self) -> Vec<VoiceInfo> {
        self.sink.voices().unwrap_or_else(|e| {
            warn!(error = %e, "could not list voices");
            Vec::new()
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
