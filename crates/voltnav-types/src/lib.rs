//! Shared types for the voltnav navigation workspace.
//!
//! This crate provides the data model used across all voltnav crates:
//! geographic positions, turn-by-turn navigation instructions, and the voice
//! settings consumed by speech output.
//!
//! Nothing here performs I/O. Other crates depend on `voltnav-types` for
//! cross-cutting definitions so the dependency graph stays acyclic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod voice;
pub use voice::{SettingsError, VoiceInfo, VoiceSettings, VoiceSettingsUpdate};

/// A geographic point in degrees.
///
/// Serialized as a two-element `[longitude, latitude]` array, the same order
/// map and routing services use for GeoJSON coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    /// Longitude in degrees, positive east.
    pub lng: f64,
    /// Latitude in degrees, positive north.
    pub lat: f64,
}

impl Position {
    /// Creates a position from longitude and latitude (in that order).
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for Position {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.lng, p.lat]
    }
}

impl From<(f64, f64)> for Position {
    fn from((lng, lat): (f64, f64)) -> Self {
        Self { lng, lat }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}]", self.lng, self.lat)
    }
}

/// Navigation instruction categories.
///
/// The kind decides how close the traveller must be before an instruction is
/// spoken, and whether a distance phrase is prepended to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionKind {
    /// A maneuver at an intersection.
    Turn,
    /// Keep following the current road.
    Continue,
    /// The destination is near.
    Arrive,
    /// A hazard or advisory.
    Warning,
    /// Route start marker. Never announced by proximity.
    Start,
}

impl InstructionKind {
    /// Returns the lower-case label used on the wire.
    pub fn label(self) -> &'static str {
        match self {
            Self::Turn => "turn",
            Self::Continue => "continue",
            Self::Arrive => "arrive",
            Self::Warning => "warning",
            Self::Start => "start",
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown instruction kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown instruction kind: {0}")]
pub struct ParseInstructionKindError(pub String);

impl FromStr for InstructionKind {
    type Err = ParseInstructionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "turn" => Ok(Self::Turn),
            "continue" => Ok(Self::Continue),
            "arrive" => Ok(Self::Arrive),
            "warning" => Ok(Self::Warning),
            "start" => Ok(Self::Start),
            other => Err(ParseInstructionKindError(other.to_string())),
        }
    }
}

/// A single turn-by-turn navigation cue tied to a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Identifier, unique within one loaded instruction set.
    pub id: String,
    /// Text spoken to the driver.
    pub text: String,
    /// Distance in meters. Informational only; proximity is evaluated live.
    #[serde(default)]
    pub distance: f64,
    /// Where the instruction applies.
    pub position: Position,
    /// Instruction category.
    #[serde(rename = "type")]
    pub kind: InstructionKind,
    /// Optional maneuver hint from the route planner (e.g. "turn-left").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maneuver: Option<String>,
}

impl Instruction {
    /// Creates an instruction with zero distance and no maneuver hint.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        position: Position,
        kind: InstructionKind,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            distance: 0.0,
            position,
            kind,
            maneuver: None,
        }
    }

    /// Attaches a maneuver hint.
    pub fn with_maneuver(mut self, maneuver: impl Into<String>) -> Self {
        self.maneuver = Some(maneuver.into());
        self
    }
}
