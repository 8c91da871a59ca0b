//! The per-slot protocol pump between one bot and its engine instance.

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::channel::{AgentGate, EngineLink};
use crate::proto::Request;

/// Pause between pump iterations. A scheduling courtesy, not load-bearing.
const POLL_INTERVAL: Duration = Duration::from_micros(500);

/// State of one relay. `Running` is the only non-terminal value; the pump
/// returns exactly one of the other four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    /// Pump still going.
    Running,
    /// Engine reported the match over.
    GameEnd,
    /// Match ran past the game-loop ceiling.
    GameTimeout,
    /// Bot went silent, disconnected, or its engine session died.
    ClientTimeout,
    /// Bot asked to leave; the request was intercepted.
    Quit,
}

/// Knobs the pump runs under, derived from
/// [`Configuration`](crate::configuration::Configuration).
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Bound on waiting for one engine response.
    pub engine_timeout: Duration,
    /// Bot inactivity window before the slot is written off.
    pub idle_timeout: Duration,
    /// Match duration ceiling in game loops.
    pub max_game_loops: u32,
}

/// Pump requests and responses between one bot and its engine until a
/// terminal status is reached.
///
/// Leave/quit requests are intercepted and never forwarded: the engine must
/// outlive the bot so it can finish writing its replay. The gate is dropped
/// (closed) on return, whatever the exit path; the engine link is handed back
/// to the caller for the final-outcome query and teardown.
#[instrument(skip(gate, link, settings))]
pub fn relay<G: AgentGate, L: EngineLink>(
    slot: usize,
    mut gate: G,
    mut link: L,
    settings: &RelaySettings,
) -> (ClientStatus, L) {
    let mut status = ClientStatus::Running;
    let mut last_activity = Instant::now();

    while status == ClientStatus::Running {
        if let Some(request) = gate.take_request() {
            if request.quit {
                info!("intercepted leave request");
                status = ClientStatus::Quit;
                break;
            }
            status = exchange(&mut gate, &mut link, request, settings);
            last_activity = Instant::now();
        } else if last_activity.elapsed() > settings.idle_timeout {
            info!("bot went silent");
            status = ClientStatus::ClientTimeout;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    (status, link)
}

/// One forwarded request/response pair. Returns the pump's next status.
fn exchange<G: AgentGate, L: EngineLink>(
    gate: &mut G,
    link: &mut L,
    request: Request,
    settings: &RelaySettings,
) -> ClientStatus {
    if !link.is_connected() {
        warn!("engine session gone");
        return ClientStatus::ClientTimeout;
    }
    if let Err(error) = link.send(&request) {
        warn!(error = %format!("{error:#}"), "forward to engine failed");
        return ClientStatus::ClientTimeout;
    }

    let response = match link.receive(settings.engine_timeout) {
        Ok(Some(response)) => response,
        Ok(None) => {
            debug!("engine response missed its deadline");
            return ClientStatus::Running;
        }
        Err(error) => {
            // Transient as far as this tick is concerned; a dead session is
            // caught on the next request.
            warn!(error = %format!("{error:#}"), "garbled engine response");
            return ClientStatus::Running;
        }
    };

    let mut status = ClientStatus::Running;
    if response.status.is_match_over() {
        status = ClientStatus::GameEnd;
    }
    if let Some(observation) = &response.observation {
        if observation.game_loop > settings.max_game_loops {
            status = ClientStatus::GameTimeout;
        }
    }

    // The final response still goes out before the pump stops.
    if !gate.is_connected() {
        return ClientStatus::ClientTimeout;
    }
    if let Err(error) = gate.send_response(&response) {
        warn!(error = %format!("{error:#}"), "bot unreachable");
        return ClientStatus::ClientTimeout;
    }
    status
}
