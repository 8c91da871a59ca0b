//! Match creation against the host engine instance.

use std::time::Duration;

use anyhow::{bail, Context};
use tracing::{error, info};

use crate::bot::Bot;
use crate::channel::EngineLink;
use crate::map::MapRef;
use crate::proto::{PlayerSetup, Request, RequestCreateGame};

/// Build and send the create-game request to the host connection, then
/// validate the engine's answer.
///
/// Any engine-side rejection aborts the match before a single bot is
/// launched; the returned error carries the engine's code and detail string.
pub fn create_match<L: EngineLink>(
    host: &mut L,
    map: MapRef,
    bots: &[Bot],
    timeout: Duration,
) -> anyhow::Result<()> {
    let request = RequestCreateGame {
        map,
        realtime: false,
        player_setup: bots
            .iter()
            .map(|bot| PlayerSetup {
                kind: bot.kind,
                race: bot.race,
                difficulty: bot.difficulty,
            })
            .collect(),
    };

    host.send(&Request::create_game(request))
        .context("sending create-game to host")?;

    let response = host
        .receive(timeout)
        .context("receiving create-game response")?
        .context("host did not answer the create-game request in time")?;

    let Some(create) = response.create_game else {
        bail!("host response is missing the create-game section");
    };
    if let Some(code) = create.error {
        let details = create.error_details.unwrap_or_default();
        error!(code = %code, details = %details, "create-game request was rejected");
        bail!("create-game request returned an error code: {code}");
    }

    info!("match created");
    Ok(())
}
