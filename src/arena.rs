//! Match orchestration: engines up, match created, bots in, relays pumped,
//! verdict out.

use anyhow::{ensure, Context};
use tracing::{error, info};

use crate::bot::Bot;
use crate::channel::{RelayChannel, TcpEngineLink};
use crate::configuration::Configuration;
use crate::launcher::{self, BOT_HOST};
use crate::logger::init_logger;
use crate::map::resolve_map;
use crate::match_runner::run_match;
use crate::process::ProcessHandle;
use crate::relay::RelaySettings;
use crate::setup::create_match;
use crate::verdict::{MatchVerdict, MAX_PLAYERS};

/// Runs head-to-head matches between a fixed roster of bots.
///
/// One `Arena` owns the roster and the candidate map list for its lifetime;
/// neither changes once a match has started. Slot `i` is roster position `i`.
pub struct Arena {
    bots: Vec<Bot>,
    maps: Vec<String>,
    config: Configuration,
}

impl Arena {
    /// Create an arena for `bots` playing on `maps`.
    pub fn new(bots: Vec<Bot>, maps: Vec<String>, config: Configuration) -> Arena {
        if config.log {
            init_logger();
        }
        Arena { bots, maps, config }
    }

    /// Play one match on `map` and return the composite verdict.
    ///
    /// Setup failures (endpoint binding, engine spawn, match creation) are
    /// logged and collapse into [`MatchVerdict::ERROR`]; per-slot bits are
    /// only produced by a match that actually started. Every process spawned
    /// for the match is killed before this returns, engines last so they can
    /// finish writing replays.
    pub fn play(&self, map: &str) -> MatchVerdict {
        let mut engine_processes = Vec::new();
        let mut bot_processes = Vec::new();

        let verdict = match self.run(map, &mut engine_processes, &mut bot_processes) {
            Ok(verdict) => verdict,
            Err(error) => {
                error!(error = %format!("{error:#}"), "match aborted during setup");
                MatchVerdict::ERROR
            }
        };

        teardown("bot", bot_processes);
        teardown("engine", engine_processes);
        info!(%verdict, "match finished");
        verdict
    }

    /// Play every candidate map in order, collecting one verdict per map.
    pub fn play_all(&self) -> Vec<MatchVerdict> {
        self.maps.iter().map(|map| self.play(map)).collect()
    }

    fn run(
        &self,
        map: &str,
        engine_processes: &mut Vec<ProcessHandle>,
        bot_processes: &mut Vec<ProcessHandle>,
    ) -> anyhow::Result<MatchVerdict> {
        ensure!(!self.bots.is_empty(), "roster is empty");
        ensure!(
            self.bots.len() <= MAX_PLAYERS,
            "roster exceeds {MAX_PLAYERS} slots"
        );

        let fleet = launcher::launch_engines(self.bots.len(), &self.config, engine_processes)?;

        let mut links = Vec::with_capacity(fleet.engine_ports.len());
        for (slot, port) in fleet.engine_ports.iter().enumerate() {
            info!(slot, port, "connecting to engine");
            let link = TcpEngineLink::connect(BOT_HOST, *port, self.config.engine_timeout)
                .with_context(|| format!("engine for slot {slot}"))?;
            links.push(link);
        }

        let map_ref = resolve_map(
            map,
            &self.config.engine_path,
            self.config.library_maps_dir.as_deref(),
        );
        info!(?map_ref, "map resolved");

        // Slot 0's connection is the host for the whole match.
        create_match(
            &mut links[0],
            map_ref,
            &self.bots,
            self.config.engine_timeout,
        )?;

        launcher::launch_bots(&self.bots, &self.config, bot_processes);

        let channels = fleet
            .gates
            .into_iter()
            .zip(links)
            .enumerate()
            .map(|(slot, (gate, link))| RelayChannel { slot, gate, link })
            .collect();

        let settings = RelaySettings {
            engine_timeout: self.config.engine_timeout,
            idle_timeout: self.config.idle_timeout,
            max_game_loops: self.config.max_game_loops,
        };
        Ok(run_match(channels, &settings, self.config.engine_timeout))
    }
}

fn teardown(kind: &str, processes: Vec<ProcessHandle>) {
    for mut process in processes {
        if process.is_running() {
            info!(kind, name = %process.name(), "killing process");
            process.kill();
        }
    }
}
