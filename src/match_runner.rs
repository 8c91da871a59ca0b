//! Per-match supervision: one relay task per slot, folded into a verdict.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::channel::{AgentGate, EngineLink, RelayChannel};
use crate::proto::{GameResult, Request};
use crate::relay::{relay, ClientStatus, RelaySettings};
use crate::verdict::{MatchVerdict, MAX_PLAYERS};

/// How long the supervisor blocks on the result channel per poll.
const POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Run every slot's relay to termination and aggregate the composite verdict.
///
/// Each relay runs on its own thread and reports exactly one terminal
/// [`ClientStatus`]; the supervisor is the only writer of the verdict. Wins
/// are not decided here: once every relay is terminal, the host connection is
/// asked for the engine's own end-of-match report.
pub fn run_match<G, L>(
    channels: Vec<RelayChannel<G, L>>,
    settings: &RelaySettings,
    engine_timeout: Duration,
) -> MatchVerdict
where
    G: AgentGate + 'static,
    L: EngineLink + 'static,
{
    let slots = channels.len();
    let (result_tx, result_rx) = mpsc::channel();

    for channel in channels {
        let tx = result_tx.clone();
        let settings = settings.clone();
        thread::spawn(move || {
            let RelayChannel { slot, gate, link } = channel;
            let (status, link) = relay(slot, gate, link, &settings);
            // The receiver only disappears if the supervisor bailed first.
            let _ = tx.send((slot, status, link));
        });
    }
    drop(result_tx);

    let mut verdict = MatchVerdict::NONE;
    let mut links: Vec<Option<L>> = (0..slots).map(|_| None).collect();
    let mut remaining = slots;
    while remaining > 0 {
        match result_rx.recv_timeout(POLL_TIMEOUT) {
            Ok((slot, status, link)) => {
                info!(slot, ?status, "relay finished");
                verdict |= status_bit(slot, status);
                links[slot] = Some(link);
                remaining -= 1;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                warn!(remaining, "relay task vanished without reporting");
                break;
            }
        }
    }

    if let Some(host) = links.first_mut().and_then(Option::as_mut) {
        apply_host_outcome(&mut verdict, host, engine_timeout);
    }
    verdict
}

/// One status, one bit. `GameEnd` maps to nothing here: win assignment comes
/// from the engine's own report.
fn status_bit(slot: usize, status: ClientStatus) -> MatchVerdict {
    match status {
        ClientStatus::ClientTimeout => MatchVerdict::crash(slot),
        ClientStatus::Quit => MatchVerdict::forfeit(slot),
        ClientStatus::GameTimeout => MatchVerdict::TIMEOUT,
        ClientStatus::GameEnd | ClientStatus::Running => MatchVerdict::NONE,
    }
}

/// Ask the host who won and OR the win bits in. A slot already classified as
/// crashed or forfeited keeps its single classification.
fn apply_host_outcome<L: EngineLink>(
    verdict: &mut MatchVerdict,
    host: &mut L,
    timeout: Duration,
) {
    if !host.is_connected() {
        warn!("host session gone before the outcome query");
        return;
    }
    if let Err(error) = host.send(&Request::observation()) {
        warn!(error = %format!("{error:#}"), "outcome query failed");
        return;
    }
    let response = match host.receive(timeout) {
        Ok(Some(response)) => response,
        Ok(None) => {
            warn!("host never reported an outcome");
            return;
        }
        Err(error) => {
            warn!(error = %format!("{error:#}"), "outcome query failed");
            return;
        }
    };

    for player in &response.player_results {
        if player.result != GameResult::Victory {
            continue;
        }
        let slot = player.player_id.saturating_sub(1) as usize;
        if slot >= MAX_PLAYERS {
            warn!(player_id = player.player_id, "player id out of range");
            continue;
        }
        if verdict.contains(MatchVerdict::crash(slot))
            || verdict.contains(MatchVerdict::forfeit(slot))
        {
            continue;
        }
        *verdict |= MatchVerdict::win(slot);
    }
}
