pub mod config;
pub mod controller;
pub mod launcher;
mod logging;
pub mod observer;
pub mod record;
pub mod segment;

pub use config::{CombatConfig, ConfigError};
pub use controller::{Controller, ControllerError, ControllerFactory};
pub use launcher::{LauncherError, generate_replay};
pub use logging::init_tracing;
pub use observer::{ObserverError, discover_files, observe_all, observe_replay, parsed_path_for};
pub use record::{
    Battle, Observation, Outcome, RecordError, Simulation, read_simulation, write_simulation,
};
pub use segment::{Poll, PollEvents, RoundSegmenter, SegmentError};
