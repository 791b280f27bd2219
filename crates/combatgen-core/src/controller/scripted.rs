use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::controller::{
    Controller, ControllerError, ControllerFactory, CreateGame, JoinGame, ResponseObservation,
    StartReplay,
};

/// A request seen by a [`ScriptedController`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    CreateGame(CreateGame),
    JoinGame(JoinGame),
    StartReplay(StartReplay),
    Observe,
    Step(u32),
    SaveReplay,
    Quit,
}

type RequestLog = Rc<RefCell<Vec<RecordedRequest>>>;

/// Controller that plays back a fixed list of observations.
///
/// Every `observe` pops the next observation; running out is an error.
#[derive(Debug)]
pub struct ScriptedController {
    observations: VecDeque<ResponseObservation>,
    replay_data: Vec<u8>,
    log: RequestLog,
    closed: bool,
}

impl ScriptedController {
    pub fn new(observations: impl IntoIterator<Item = ResponseObservation>) -> Self {
        ScriptedController {
            observations: observations.into_iter().collect(),
            replay_data: Vec::new(),
            log: RequestLog::default(),
            closed: false,
        }
    }

    /// Bytes returned by `save_replay`.
    pub fn with_replay_data(mut self, data: Vec<u8>) -> Self {
        self.replay_data = data;
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.borrow().clone()
    }

    /// Observations not consumed yet.
    pub fn remaining(&self) -> usize {
        self.observations.len()
    }

    fn record(&mut self, request: RecordedRequest) -> Result<(), ControllerError> {
        if self.closed {
            return Err(ControllerError::Closed);
        }
        self.log.borrow_mut().push(request);
        Ok(())
    }
}

impl Controller for ScriptedController {
    fn create_game(&mut self, request: &CreateGame) -> Result<(), ControllerError> {
        self.record(RecordedRequest::CreateGame(request.clone()))
    }

    fn join_game(&mut self, request: &JoinGame) -> Result<(), ControllerError> {
        self.record(RecordedRequest::JoinGame(request.clone()))
    }

    fn start_replay(&mut self, request: &StartReplay) -> Result<(), ControllerError> {
        self.record(RecordedRequest::StartReplay(request.clone()))
    }

    fn observe(&mut self) -> Result<ResponseObservation, ControllerError> {
        self.record(RecordedRequest::Observe)?;
        self.observations
            .pop_front()
            .ok_or(ControllerError::ScriptExhausted)
    }

    fn step(&mut self, count: u32) -> Result<(), ControllerError> {
        self.record(RecordedRequest::Step(count))
    }

    fn save_replay(&mut self) -> Result<Vec<u8>, ControllerError> {
        self.record(RecordedRequest::SaveReplay)?;
        Ok(self.replay_data.clone())
    }

    fn quit(&mut self) -> Result<(), ControllerError> {
        self.record(RecordedRequest::Quit)?;
        self.closed = true;
        Ok(())
    }
}

/// Hands out one scripted controller per `start`, sharing a request log.
#[derive(Debug, Default)]
pub struct ScriptedFactory {
    scripts: VecDeque<ScriptedController>,
    log: RequestLog,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a controller; its requests are recorded in this factory's log.
    pub fn push(&mut self, mut controller: ScriptedController) -> &mut Self {
        controller.log = Rc::clone(&self.log);
        self.scripts.push_back(controller);
        self
    }

    /// Requests received by every controller started so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.borrow().clone()
    }

    /// Controllers queued but never started.
    pub fn pending(&self) -> usize {
        self.scripts.len()
    }
}

impl ControllerFactory for ScriptedFactory {
    type Controller = ScriptedController;

    fn start(&mut self) -> Result<ScriptedController, ControllerError> {
        self.scripts
            .pop_front()
            .ok_or(ControllerError::ScriptExhausted)
    }
}
