//! voltnav simulator binary.
//!
//! Drives a simulated vehicle along the configured route and speaks
//! navigation prompts as it approaches them. Stops early on SIGTERM/SIGINT.

use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;
use voltnav_sim::{
    build_route, load_config, run_navigation_task, simulate_drive, NavigationCommand,
    NavigationEvent, DEFAULT_EVENT_BROADCAST_CAPACITY,
};
use voltnav_voice::{generate_instructions, InstructionAnnouncer};

/// Position samples buffered between the simulator and the navigation task.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("VOLTNAV_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("voltnav.toml"));

    let config = load_config(selected_config_path)
        .expect("failed to load configuration; check the config file and VOLTNAV_* variables");

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let route = build_route(&config.route).expect("failed to load route; check route.file");
    let instructions = generate_instructions(&route, &config.route.destination);
    tracing::info!(
        instructions = instructions.len(),
        destination = %config.route.destination,
        "generated route instructions"
    );

    let mut announcer =
        InstructionAnnouncer::with_settings(config.voice.build_sink(), config.voice.settings());
    // Voice enumeration runs the speech backend; keep it off the runtime.
    let language = config.voice.language.clone();
    let mut announcer = tokio::task::spawn_blocking(move || {
        announcer.initialize(&language);
        announcer
    })
    .await
    .expect("voice initialization task panicked");
    announcer.set_instructions(instructions);

    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = broadcast::channel(DEFAULT_EVENT_BROADCAST_CAPACITY);

    let navigation = tokio::spawn(run_navigation_task(announcer, command_rx, event_tx));
    let event_log = tokio::spawn(log_events(event_rx));

    let drive = simulate_drive(route, config.simulation.clone(), command_tx.clone());
    let interrupted = tokio::select! {
        summary = drive => {
            tracing::info!(
                samples = summary.samples,
                travelled_m = summary.travelled_m,
                "drive finished"
            );
            false
        }
        () = shutdown_signal() => true,
    };

    if interrupted {
        // Ignored if the task already exited.
        let _ = command_tx.send(NavigationCommand::Stop).await;
    }
    drop(command_tx);

    let announcer = navigation.await.expect("navigation task panicked");
    let announced = announcer.announced_count();

    if !interrupted {
        // Let the arrival prompt finish before exiting.
        let mut sink = announcer.into_sink();
        match tokio::task::spawn_blocking(move || sink.wait_until_idle()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "final utterance failed"),
            Err(e) => tracing::warn!(error = %e, "speech wait task failed"),
        }
    }

    // The event channel closes once the navigation task drops its sender.
    let _ = event_log.await;

    tracing::info!(announced, interrupted, "voltnav simulator shut down");
}

/// Logs every navigation event until the channel closes.
async fn log_events(mut events: broadcast::Receiver<NavigationEvent>) {
    loop {
        match events.recv().await {
            Ok(NavigationEvent::Announced {
                id,
                text,
                distance_m,
                ..
            }) => {
                tracing::info!(%id, distance_m = distance_m.round(), "{text}");
            }
            Ok(NavigationEvent::SettingsRejected { reason }) => {
                tracing::warn!(%reason, "voice settings rejected");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event logger lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, stopping navigation"); }
        () = terminate => { tracing::info!("received SIGTERM, stopping navigation"); }
    }
}
