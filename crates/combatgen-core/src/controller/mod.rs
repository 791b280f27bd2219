//! Seam to the external game client.
//!
//! The engine itself is not part of this repository. Everything that talks to
//! it goes through [`Controller`], one instance per game or replay session.

mod bridge;
pub mod error;
mod request;
mod scripted;

pub use bridge::{BridgeController, BridgeFactory};
pub use error::ControllerError;
pub use request::{
    CreateGame, Difficulty, GameResult, InterfaceOptions, JoinGame, PlayerResult, PlayerSetup,
    Race, ResponseObservation, Size2D, SpatialCameraSetup, StartReplay,
};
pub use scripted::{RecordedRequest, ScriptedController, ScriptedFactory};

/// Synchronous request/response access to one running game client.
pub trait Controller {
    fn create_game(&mut self, request: &CreateGame) -> Result<(), ControllerError>;

    fn join_game(&mut self, request: &JoinGame) -> Result<(), ControllerError>;

    fn start_replay(&mut self, request: &StartReplay) -> Result<(), ControllerError>;

    /// Fetch the observation for the current game loop.
    fn observe(&mut self) -> Result<ResponseObservation, ControllerError>;

    /// Advance the simulation by `count` game loops.
    fn step(&mut self, count: u32) -> Result<(), ControllerError>;

    /// Return the replay of the game played so far.
    fn save_replay(&mut self) -> Result<Vec<u8>, ControllerError>;

    /// Shut the client down. Further calls fail.
    fn quit(&mut self) -> Result<(), ControllerError>;
}

/// Starts fresh game clients.
pub trait ControllerFactory {
    type Controller: Controller;

    fn start(&mut self) -> Result<Self::Controller, ControllerError>;
}

#[cfg(test)]
mod tests;
