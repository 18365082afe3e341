//! Voice guidance for voltnav.
//!
//! Decides when a turn-by-turn instruction should be spoken, words it, and
//! hands it to a speech backend. The decision logic lives in
//! [`InstructionAnnouncer`] and never touches audio directly: it talks to a
//! [`SpeechSink`], which is either the `espeak-ng` synthesizer, a log-only
//! sink, or a test double.
//!
//! ```rust,ignore
//! use voltnav_voice::{generate_instructions, InstructionAnnouncer, LogSink};
//!
//! let mut announcer = InstructionAnnouncer::new(LogSink);
//! announcer.set_instructions(generate_instructions(&route, "Depot"));
//! for sample in positions {
//!     announcer.check_and_announce(sample, None);
//! }
//! ```

pub mod announcer;
pub mod config;
pub mod error;
pub mod espeak;
pub mod instructions;
pub mod sink;
pub mod voices;

pub use announcer::{
    announcement_text, is_due, threshold_meters, Announcement, InstructionAnnouncer,
};
pub use config::{SpeechBackend, VoiceConfig};
pub use error::VoiceError;
pub use espeak::EspeakSink;
pub use instructions::{generate_instructions, START_TEXT};
pub use sink::{LogSink, SpeechSink, Utterance};
pub use voices::select_default_voice;
