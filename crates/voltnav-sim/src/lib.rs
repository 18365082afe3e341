//! Drive simulator for the voltnav voice announcer.
//!
//! Moves a simulated vehicle along a route and feeds its positions to an
//! [`voltnav_voice::InstructionAnnouncer`] running in its own task.

pub mod config;
pub mod navigation;
pub mod route;
pub mod simulate;

pub use config::{load_config, Config, ConfigError, LoggingConfig, RouteConfig, SimulationConfig};
pub use navigation::{
    run_navigation_task, NavigationCommand, NavigationEvent, PositionSample,
    DEFAULT_EVENT_BROADCAST_CAPACITY,
};
pub use route::{build_route, load_route, parse_route, RouteError};
pub use simulate::{simulate_drive, DriveSummary};
