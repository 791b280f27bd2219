use thiserror::Error;

use crate::record::frame::FrameError;

#[derive(Debug, Error)]
/// Error type for talking to the game client.
pub enum ControllerError {
    #[error("failed to start controller bridge '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("controller bridge command is empty")]
    EmptyCommand,

    #[error("controller io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("controller framing error: {0}")]
    Frame(#[from] FrameError),

    #[error("controller message is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("game client reported an error: {0}")]
    Remote(String),

    #[error("expected '{expected}' response to '{request}', got '{got}'")]
    UnexpectedResponse {
        request: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    #[error("controller was already shut down")]
    Closed,

    #[error("scripted controller ran out of observations")]
    ScriptExhausted,
}
