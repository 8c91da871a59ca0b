//! Engine fleet and bot process launching.

use std::thread;

use anyhow::Context;
use tracing::{info, warn};

use crate::bot::{Bot, PlayerKind};
use crate::channel::TcpAgentGate;
use crate::configuration::Configuration;
use crate::process::{self, ProcessHandle};

/// Address engines and bots are reached at.
pub(crate) const BOT_HOST: &str = "127.0.0.1";

/// Bot-facing gates and engine ports for one match, in slot order.
pub(crate) struct EngineFleet {
    pub gates: Vec<TcpAgentGate>,
    pub engine_ports: Vec<u16>,
}

/// Bind one bot-facing gate per slot, then start one engine per slot told to
/// listen on its own port, then give the fleet its startup grace period.
///
/// All gates are bound before the first spawn so a port clash surfaces before
/// any process exists. A bind or spawn failure here is fatal to the match.
pub(crate) fn launch_engines(
    slots: usize,
    config: &Configuration,
    processes: &mut Vec<ProcessHandle>,
) -> anyhow::Result<EngineFleet> {
    let mut gates = Vec::with_capacity(slots);
    for slot in 0..slots {
        let port = config.port_base + slot as u16;
        info!(slot, port, "binding bot endpoint");
        gates.push(TcpAgentGate::bind(BOT_HOST, port)?);
    }

    let mut engine_ports = Vec::with_capacity(slots);
    for slot in 0..slots {
        let port = config.port_base + (slots + slot) as u16;
        let mut args = vec![
            "-listen".to_string(),
            BOT_HOST.to_string(),
            "-port".to_string(),
            port.to_string(),
            "-displayMode".to_string(),
            "0".to_string(),
        ];
        if let Some(version) = &config.data_version {
            args.push("-dataVersion".to_string());
            args.push(version.clone());
        }
        info!(slot, port, "starting engine instance");
        let handle = process::start(&config.engine_path, &args)
            .with_context(|| format!("engine for slot {slot}"))?;
        processes.push(handle);
        engine_ports.push(port);
    }

    // No readiness handshake in the engine protocol; the grace period is the
    // contract.
    info!(slots, timeout = ?config.engine_startup_timeout, "waiting for engines to come up");
    thread::sleep(config.engine_startup_timeout);

    Ok(EngineFleet {
        gates,
        engine_ports,
    })
}

/// Arguments a bot is launched with: its relay port, the shared extra-port
/// base, the coordinator address, and computer-opponent flags where relevant.
pub(crate) fn bot_args(bot: &Bot, game_port: u16, start_port: u16) -> Vec<String> {
    let mut args = vec![
        "--GamePort".to_string(),
        game_port.to_string(),
        "--StartPort".to_string(),
        start_port.to_string(),
        "--LadderServer".to_string(),
        BOT_HOST.to_string(),
    ];
    if bot.kind == PlayerKind::Computer {
        args.push("--ComputerOpponent".to_string());
        args.push("1".to_string());
        args.push("--ComputerRace".to_string());
        args.push(bot.race.as_str().to_string());
        args.push("--ComputerDifficulty".to_string());
        args.push(bot.difficulty.as_str().to_string());
    }
    args.extend(bot.args.iter().cloned());
    args
}

/// Spawn every bot executable, then give them their startup grace period.
///
/// A bot that fails to start is logged and left to decay into a crash through
/// the relay's idle path; the rest of the match goes on without it.
pub(crate) fn launch_bots(
    bots: &[Bot],
    config: &Configuration,
    processes: &mut Vec<ProcessHandle>,
) {
    for (slot, bot) in bots.iter().enumerate() {
        let args = bot_args(bot, config.port_base + slot as u16, config.start_port);
        info!(slot, name = %bot.name, "spawning bot");
        match process::start(&bot.path_to_exe, &args) {
            Ok(handle) => processes.push(handle),
            Err(error) => {
                warn!(slot, name = %bot.name, error = %format!("{error:#}"), "bot failed to start");
            }
        }
    }
    thread::sleep(config.agent_startup_grace);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{Difficulty, Race};

    #[test]
    fn participant_args_carry_ports_server_and_extras() {
        let bot =
            Bot::participant("p", "/bin/true", Race::Terran).with_args(vec!["--custom".into()]);
        let args = bot_args(&bot, 5678, 5690);
        assert_eq!(
            args,
            [
                "--GamePort",
                "5678",
                "--StartPort",
                "5690",
                "--LadderServer",
                "127.0.0.1",
                "--custom",
            ]
        );
    }

    #[test]
    fn computer_bots_get_opponent_flags() {
        let bot = Bot::computer("cpu", "/bin/true", Race::Zerg, Difficulty::CheatInsane);
        let args = bot_args(&bot, 5677, 5690);
        let joined = args.join(" ");
        assert!(joined.contains("--ComputerOpponent 1"));
        assert!(joined.contains("--ComputerRace Zerg"));
        assert!(joined.contains("--ComputerDifficulty CheatInsane"));
    }
}
