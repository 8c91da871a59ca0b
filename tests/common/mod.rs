//! Scripted in-memory transports for driving the orchestrator without
//! sockets or processes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sc2_arena::channel::{AgentGate, EngineLink};
use sc2_arena::proto::{Request, Response};

#[derive(Default)]
struct GateState {
    incoming: VecDeque<Request>,
    delivered: Vec<Response>,
    connected: bool,
}

/// Bot-side endpoint fed from a script. Clones share state so a test can keep
/// a handle while the relay owns the other.
#[derive(Clone)]
pub struct ScriptedGate(Arc<Mutex<GateState>>);

impl ScriptedGate {
    pub fn new(incoming: Vec<Request>) -> ScriptedGate {
        ScriptedGate(Arc::new(Mutex::new(GateState {
            incoming: incoming.into(),
            delivered: vec![],
            connected: true,
        })))
    }

    /// Responses the relay forwarded back to the bot.
    pub fn delivered(&self) -> Vec<Response> {
        self.0.lock().unwrap().delivered.clone()
    }

    /// Simulate the bot dropping its connection.
    pub fn disconnect(&self) {
        self.0.lock().unwrap().connected = false;
    }
}

impl AgentGate for ScriptedGate {
    fn has_pending_request(&mut self) -> bool {
        !self.0.lock().unwrap().incoming.is_empty()
    }

    fn take_request(&mut self) -> Option<Request> {
        self.0.lock().unwrap().incoming.pop_front()
    }

    fn send_response(&mut self, response: &Response) -> anyhow::Result<()> {
        let mut state = self.0.lock().unwrap();
        if !state.connected {
            anyhow::bail!("bot gone");
        }
        state.delivered.push(response.clone());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.0.lock().unwrap().connected
    }
}

#[derive(Default)]
struct EngineState {
    responses: VecDeque<Response>,
    received: Vec<Request>,
    connected: bool,
}

/// Engine session answering from a canned response queue.
#[derive(Clone)]
pub struct ScriptedEngine(Arc<Mutex<EngineState>>);

impl ScriptedEngine {
    pub fn new(responses: Vec<Response>) -> ScriptedEngine {
        ScriptedEngine(Arc::new(Mutex::new(EngineState {
            responses: responses.into(),
            received: vec![],
            connected: true,
        })))
    }

    /// Requests that actually reached the engine.
    pub fn received(&self) -> Vec<Request> {
        self.0.lock().unwrap().received.clone()
    }

    /// True while the session has not been torn down.
    pub fn session_alive(&self) -> bool {
        self.0.lock().unwrap().connected
    }
}

impl EngineLink for ScriptedEngine {
    fn send(&mut self, request: &Request) -> anyhow::Result<()> {
        let mut state = self.0.lock().unwrap();
        if !state.connected {
            anyhow::bail!("engine gone");
        }
        state.received.push(request.clone());
        Ok(())
    }

    fn receive(&mut self, _timeout: Duration) -> anyhow::Result<Option<Response>> {
        Ok(self.0.lock().unwrap().responses.pop_front())
    }

    fn is_connected(&self) -> bool {
        self.0.lock().unwrap().connected
    }
}
