//! A simulated vehicle driving a route and reporting its position.

use crate::config::SimulationConfig;
use crate::navigation::{NavigationCommand, PositionSample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, trace};
use voltnav_geo::RouteFollower;
use voltnav_types::Position;

/// Speed bounds applied while jitter is active, in km/h.
const MIN_JITTER_SPEED_KMH: f64 = 10.0;
const MAX_JITTER_SPEED_KMH: f64 = 70.0;

/// Outcome of a simulated drive.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveSummary {
    /// Position samples delivered.
    pub samples: usize,
    /// Distance covered in meters.
    pub travelled_m: f64,
    /// Whether the end of the route was reached. False if the receiver went
    /// away first.
    pub completed: bool,
}

/// Drives `route`, sending one position sample per tick.
///
/// The first sample is the route start and is sent immediately; the last is
/// the route end. Between ticks the vehicle moves `speed × tick × time_scale`
/// meters. With jitter enabled the speed drifts randomly by up to
/// `speed_jitter_kmh` per tick and is kept within 10 to 70 km/h.
///
/// Returns early if the command receiver is dropped.
pub async fn simulate_drive(
    route: Vec<Position>,
    config: SimulationConfig,
    commands: mpsc::Sender<NavigationCommand>,
) -> DriveSummary {
    let mut follower = RouteFollower::new(route);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let tick = Duration::from_millis(config.tick_ms);
    let simulated_secs_per_tick = tick.as_secs_f64() * config.time_scale;
    let mut speed_kmh = config.speed_kmh;

    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        route_m = follower.total_meters(),
        speed_kmh,
        tick_ms = config.tick_ms,
        "starting simulated drive"
    );

    let mut samples = 0;
    let completed = loop {
        ticker.tick().await;

        let Some(position) = follower.position() else {
            break true;
        };
        let sample = PositionSample {
            position,
            heading: follower.heading(),
        };
        trace!(%position, speed_kmh, remaining_m = follower.remaining_meters(), "position sample");

        if commands
            .send(NavigationCommand::Position(sample))
            .await
            .is_err()
        {
            break false;
        }
        samples += 1;

        if follower.is_finished() {
            break true;
        }

        if config.speed_jitter_kmh > 0.0 {
            let delta = rng.gen_range(-config.speed_jitter_kmh..=config.speed_jitter_kmh);
            speed_kmh = (speed_kmh + delta).clamp(MIN_JITTER_SPEED_KMH, MAX_JITTER_SPEED_KMH);
        }
        follower.advance(speed_kmh / 3.6 * simulated_secs_per_tick);
    };

    let summary = DriveSummary {
        samples,
        travelled_m: follower.travelled_meters(),
        completed,
    };
    info!(
        samples = summary.samples,
        travelled_m = summary.travelled_m,
        completed = summary.completed,
        "simulated drive ended"
    );
    summary
}
