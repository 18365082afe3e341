//! The navigation task: sole owner of the instruction announcer.
//!
//! Everything that touches the announcer (position samples, route loads,
//! settings changes) arrives as a [`NavigationCommand`] on one channel and is
//! applied in arrival order. Announcements are published on a broadcast
//! channel for any number of observers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use voltnav_types::{Instruction, Position, VoiceSettingsUpdate};
use voltnav_voice::{InstructionAnnouncer, SpeechSink};

/// Default capacity for the navigation event broadcast channel.
pub const DEFAULT_EVENT_BROADCAST_CAPACITY: usize = 64;

/// A location fix from the tracking source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSample {
    pub position: Position,
    /// Direction of travel in degrees, if known.
    pub heading: Option<f64>,
}

/// A request to the navigation task.
#[derive(Debug, Clone)]
pub enum NavigationCommand {
    /// Check for due instructions at a new position.
    Position(PositionSample),
    /// Replace the active route's instructions.
    LoadInstructions(Vec<Instruction>),
    /// Turn voice output on or off.
    SetEnabled(bool),
    /// Change voice settings.
    UpdateSettings(VoiceSettingsUpdate),
    /// Speak arbitrary text now.
    Speak(String),
    /// Silence the current utterance.
    Stop,
}

/// Something observers may want to know about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationEvent {
    /// An instruction was spoken.
    Announced {
        id: String,
        text: String,
        distance_m: f64,
        position: Position,
        at: DateTime<Utc>,
    },
    /// A settings update was refused.
    SettingsRejected { reason: String },
}

/// Applies commands to `announcer` until every sender is dropped, then hands
/// the announcer back.
pub async fn run_navigation_task<S: SpeechSink>(
    mut announcer: InstructionAnnouncer<S>,
    mut commands: mpsc::Receiver<NavigationCommand>,
    events: broadcast::Sender<NavigationEvent>,
) -> InstructionAnnouncer<S> {
    info!("navigation task started");

    while let Some(command) = commands.recv().await {
        match command {
            NavigationCommand::Position(sample) => {
                let spoken = announcer.check_and_announce(sample.position, sample.heading);
                for announcement in spoken {
                    // No subscribers is fine.
                    let _ = events.send(NavigationEvent::Announced {
                        id: announcement.id,
                        text: announcement.text,
                        distance_m: announcement.distance_m,
                        position: sample.position,
                        at: Utc::now(),
                    });
                }
            }
            NavigationCommand::LoadInstructions(instructions) => {
                announcer.set_instructions(instructions);
            }
            NavigationCommand::SetEnabled(enabled) => announcer.set_enabled(enabled),
            NavigationCommand::UpdateSettings(update) => {
                if let Err(e) = announcer.update_settings(update) {
                    warn!(error = %e, "rejected voice settings update");
                    let _ = events.send(NavigationEvent::SettingsRejected {
                        reason: e.to_string(),
                    });
                }
            }
            NavigationCommand::Speak(text) => announcer.speak(&text),
            NavigationCommand::Stop => {
                debug!("stopping speech");
                announcer.stop();
            }
        }
    }

    info!(
        announced = announcer.announced_count(),
        "navigation task finished"
    );
    announcer
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltnav_types::InstructionKind;
    use voltnav_voice::LogSink;

    #[tokio::test]
    async fn announces_and_publishes_events() {
        let (tx, rx) = mpsc::channel(8);
        let (events_tx, mut events_rx) = broadcast::channel(DEFAULT_EVENT_BROADCAST_CAPACITY);
        let task = tokio::spawn(run_navigation_task(
            InstructionAnnouncer::new(LogSink),
            rx,
            events_tx,
        ));

        let destination = Position::new(0.0, 0.0);
        tx.send(NavigationCommand::LoadInstructions(vec![Instruction::new(
            "arrive",
            "Arriving at Depot",
            destination,
            InstructionKind::Arrive,
        )]))
        .await
        .unwrap();
        let sample = PositionSample {
            position: Position::new(0.0, 0.0005),
            heading: Some(180.0),
        };
        tx.send(NavigationCommand::Position(sample)).await.unwrap();
        tx.send(NavigationCommand::Position(sample)).await.unwrap();
        drop(tx);

        let announcer = task.await.unwrap();
        assert!(announcer.is_announced("arrive"));

        match events_rx.recv().await.unwrap() {
            NavigationEvent::Announced {
                id,
                text,
                distance_m,
                position,
                ..
            } => {
                assert_eq!(id, "arrive");
                assert_eq!(text, "Arriving at Depot");
                assert!((distance_m - 55.6).abs() < 0.1, "got {distance_m}");
                assert_eq!(position, sample.position);
            }
            other => panic!("unexpected event {:?}", other),
        }
        // The second sample announced nothing.
        assert!(events_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn rejected_settings_are_reported() {
        let (tx, rx) = mpsc::channel(8);
        let (events_tx, mut events_rx) = broadcast::channel(DEFAULT_EVENT_BROADCAST_CAPACITY);
        let task = tokio::spawn(run_navigation_task(
            InstructionAnnouncer::new(LogSink),
            rx,
            events_tx,
        ));

        tx.send(NavigationCommand::UpdateSettings(VoiceSettingsUpdate {
            volume: Some(7.0),
            ..Default::default()
        }))
        .await
        .unwrap();
        tx.send(NavigationCommand::SetEnabled(false)).await.unwrap();
        drop(tx);

        let announcer = task.await.unwrap();
        assert!(!announcer.is_enabled());
        assert_eq!(announcer.settings().volume, 0.8);

        let event = events_rx.recv().await.unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "settings_rejected");
        assert!(json["reason"].as_str().unwrap().contains("volume"));
    }
}
