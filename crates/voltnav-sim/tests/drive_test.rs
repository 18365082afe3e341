//! End-to-end: a simulated drive feeding the navigation task.

use tokio::sync::{broadcast, mpsc};
use voltnav_geo::straight_line_route;
use voltnav_sim::{
    run_navigation_task, simulate_drive, NavigationCommand, NavigationEvent, SimulationConfig,
    DEFAULT_EVENT_BROADCAST_CAPACITY,
};
use voltnav_types::Position;
use voltnav_voice::{generate_instructions, InstructionAnnouncer, SpeechSink, Utterance, VoiceError};

#[derive(Debug, Default)]
struct RecordingSink {
    spoken: Vec<String>,
    cancels: usize,
}

impl SpeechSink for RecordingSink {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), VoiceError> {
        self.spoken.push(utterance.text.clone());
        Ok(())
    }

    fn cancel(&mut self) {
        self.cancels += 1;
    }
}

fn fast_steady_drive() -> SimulationConfig {
    // 36 km/h at 10x: 100 m per tick.
    SimulationConfig {
        speed_kmh: 36.0,
        speed_jitter_kmh: 0.0,
        tick_ms: 1000,
        time_scale: 10.0,
        seed: Some(3),
    }
}

#[tokio::test(start_paused = true)]
async fn drive_announces_every_instruction_once_in_route_order() {
    // ~3 km due north, split into five ~600 m segments.
    let route = straight_line_route(Position::new(0.0, 0.0), Position::new(0.0, 0.027));
    assert_eq!(route.len(), 6);
    let instructions = generate_instructions(&route, "Harbor");

    let mut announcer = InstructionAnnouncer::new(RecordingSink::default());
    announcer.set_instructions(instructions);

    let (tx, rx) = mpsc::channel(16);
    let (events_tx, mut events_rx) = broadcast::channel(DEFAULT_EVENT_BROADCAST_CAPACITY);
    let navigation = tokio::spawn(run_navigation_task(announcer, rx, events_tx));

    let summary = simulate_drive(route, fast_steady_drive(), tx).await;
    assert!(summary.completed);

    let announcer = navigation.await.unwrap();
    let sink = announcer.sink();
    assert_eq!(
        sink.spoken,
        [
            "Navigation started. Proceed to the highlighted route.",
            "Continue north",
            "Continue north",
            "Continue north",
            "Continue north",
            "Arriving at Harbor",
        ]
    );
    // Every utterance interrupts whatever came before it.
    assert_eq!(sink.cancels, sink.spoken.len());

    let mut ids = Vec::new();
    while let Ok(event) = events_rx.try_recv() {
        if let NavigationEvent::Announced { id, .. } = event {
            ids.push(id);
        }
    }
    assert_eq!(
        ids,
        ["start", "waypoint-1", "waypoint-2", "waypoint-3", "waypoint-4", "arrive"]
    );
}

#[tokio::test(start_paused = true)]
async fn muted_drive_speaks_nothing_until_reenabled() {
    let route = straight_line_route(Position::new(0.0, 0.0), Position::new(0.0, 0.027));
    let mut announcer = InstructionAnnouncer::new(RecordingSink::default());
    announcer.set_instructions(generate_instructions(&route, "Harbor"));
    announcer.set_enabled(false);

    let (tx, rx) = mpsc::channel(16);
    let (events_tx, _events_rx) = broadcast::channel(DEFAULT_EVENT_BROADCAST_CAPACITY);
    let navigation = tokio::spawn(run_navigation_task(announcer, rx, events_tx));

    simulate_drive(route.clone(), fast_steady_drive(), tx.clone()).await;

    // Re-enabled at the destination: only the arrival prompt is still in range.
    tx.send(NavigationCommand::SetEnabled(true)).await.unwrap();
    tx.send(NavigationCommand::Position(voltnav_sim::PositionSample {
        position: route[5],
        heading: None,
    }))
    .await
    .unwrap();
    drop(tx);

    let announcer = navigation.await.unwrap();
    assert_eq!(announcer.sink().spoken, ["Arriving at Harbor"]);
}
