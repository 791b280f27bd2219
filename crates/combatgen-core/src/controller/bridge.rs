use std::{
    io::{BufReader, BufWriter},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    controller::{
        Controller, ControllerError, ControllerFactory, CreateGame, JoinGame, ResponseObservation,
        StartReplay,
    },
    record::frame::{read_frame, write_frame},
};

/// Request half of the bridge protocol: one JSON object per frame.
#[derive(Debug, Serialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub(crate) enum BridgeRequest<'a> {
    CreateGame(&'a CreateGame),
    JoinGame(&'a JoinGame),
    StartReplay(&'a StartReplay),
    Observe,
    Step { count: u32 },
    SaveReplay,
    Quit,
}

impl BridgeRequest<'_> {
    fn name(&self) -> &'static str {
        match self {
            BridgeRequest::CreateGame(_) => "create_game",
            BridgeRequest::JoinGame(_) => "join_game",
            BridgeRequest::StartReplay(_) => "start_replay",
            BridgeRequest::Observe => "observe",
            BridgeRequest::Step { .. } => "step",
            BridgeRequest::SaveReplay => "save_replay",
            BridgeRequest::Quit => "quit",
        }
    }
}

/// Response half of the bridge protocol.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum BridgeResponse {
    Ok,
    Observation(ResponseObservation),
    Replay { data: Vec<u8> },
    Error { message: String },
}

impl BridgeResponse {
    fn kind(&self) -> &'static str {
        match self {
            BridgeResponse::Ok => "ok",
            BridgeResponse::Observation(_) => "observation",
            BridgeResponse::Replay { .. } => "replay",
            BridgeResponse::Error { .. } => "error",
        }
    }
}

/// Controller backed by a child process speaking the bridge protocol on stdio.
///
/// The child owns the actual game client (for example a thin wrapper around
/// the official client library). Each request gets exactly one response.
pub struct BridgeController {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    closed: bool,
}

impl BridgeController {
    /// Spawn `command[0]` with the remaining entries as arguments.
    pub fn spawn(command: &[String]) -> Result<Self, ControllerError> {
        let (program, args) = command.split_first().ok_or(ControllerError::EmptyCommand)?;
        debug!(program = %program, ?args, "starting controller bridge");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ControllerError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| ControllerError::Spawn {
            program: program.clone(),
            source: std::io::Error::other("child stdin was not captured"),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| ControllerError::Spawn {
            program: program.clone(),
            source: std::io::Error::other("child stdout was not captured"),
        })?;

        Ok(BridgeController {
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            closed: false,
        })
    }

    fn call(&mut self, request: BridgeRequest<'_>) -> Result<BridgeResponse, ControllerError> {
        if self.closed {
            return Err(ControllerError::Closed);
        }
        let payload = serde_json::to_vec(&request)?;
        write_frame(&mut self.stdin, &payload)?;
        let reply = read_frame(&mut self.stdout)?;
        match serde_json::from_slice(&reply)? {
            BridgeResponse::Error { message } => Err(ControllerError::Remote(message)),
            response => Ok(response),
        }
    }

    fn call_ok(&mut self, request: BridgeRequest<'_>) -> Result<(), ControllerError> {
        let name = request.name();
        match self.call(request)? {
            BridgeResponse::Ok => Ok(()),
            other => Err(ControllerError::UnexpectedResponse {
                request: name,
                expected: "ok",
                got: other.kind(),
            }),
        }
    }
}

impl Controller for BridgeController {
    fn create_game(&mut self, request: &CreateGame) -> Result<(), ControllerError> {
        self.call_ok(BridgeRequest::CreateGame(request))
    }

    fn join_game(&mut self, request: &JoinGame) -> Result<(), ControllerError> {
        self.call_ok(BridgeRequest::JoinGame(request))
    }

    fn start_replay(&mut self, request: &StartReplay) -> Result<(), ControllerError> {
        self.call_ok(BridgeRequest::StartReplay(request))
    }

    fn observe(&mut self) -> Result<ResponseObservation, ControllerError> {
        match self.call(BridgeRequest::Observe)? {
            BridgeResponse::Observation(observation) => Ok(observation),
            other => Err(ControllerError::UnexpectedResponse {
                request: "observe",
                expected: "observation",
                got: other.kind(),
            }),
        }
    }

    fn step(&mut self, count: u32) -> Result<(), ControllerError> {
        self.call_ok(BridgeRequest::Step { count })
    }

    fn save_replay(&mut self) -> Result<Vec<u8>, ControllerError> {
        match self.call(BridgeRequest::SaveReplay)? {
            BridgeResponse::Replay { data } => Ok(data),
            other => Err(ControllerError::UnexpectedResponse {
                request: "save_replay",
                expected: "replay",
                got: other.kind(),
            }),
        }
    }

    fn quit(&mut self) -> Result<(), ControllerError> {
        let result = self.call_ok(BridgeRequest::Quit);
        self.closed = true;
        self.child.wait()?;
        result
    }
}

impl Drop for BridgeController {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.quit();
        }
    }
}

/// Spawns one bridge process per game or replay.
#[derive(Debug, Clone)]
pub struct BridgeFactory {
    command: Vec<String>,
}

impl BridgeFactory {
    pub fn new(command: Vec<String>) -> Self {
        BridgeFactory { command }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }
}

impl ControllerFactory for BridgeFactory {
    type Controller = BridgeController;

    fn start(&mut self) -> Result<BridgeController, ControllerError> {
        BridgeController::spawn(&self.command)
    }
}
