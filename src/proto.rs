//! Wire message model shared by bots, the orchestrator, and engine instances.
//!
//! Messages mirror the engine protocol's optional-field request/response
//! pairs. The relay interprets only a handful of fields (quit marker, status,
//! step counter, create-game outcome, player results); everything else rides
//! in `body` untouched. Framing lives in [`channel`](crate::channel).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bot::{Difficulty, PlayerKind, Race};
use crate::map::MapRef;

/// A request traveling from a bot (or the orchestrator itself) to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Request {
    /// Leave/quit marker. Never forwarded to the engine by the relay.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub quit: bool,
    /// Asks the engine for a fresh observation.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub observation: bool,
    /// Match creation. Sent to the host connection only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_game: Option<RequestCreateGame>,
    /// Opaque passthrough payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Request {
    /// A leave/quit request.
    pub fn quit() -> Request {
        Request {
            quit: true,
            ..Request::default()
        }
    }

    /// An observation request.
    pub fn observation() -> Request {
        Request {
            observation: true,
            ..Request::default()
        }
    }

    /// A create-game request.
    pub fn create_game(request: RequestCreateGame) -> Request {
        Request {
            create_game: Some(request),
            ..Request::default()
        }
    }
}

/// Match-creation request sent to the host engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCreateGame {
    /// The map to play on.
    pub map: MapRef,
    /// Realtime simulation flag. Always false for orchestrated matches.
    pub realtime: bool,
    /// One entry per slot, in roster order.
    pub player_setup: Vec<PlayerSetup>,
}

/// Per-player section of [`RequestCreateGame`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Participant or built-in AI.
    pub kind: PlayerKind,
    /// Faction.
    pub race: Race,
    /// Built-in AI strength.
    pub difficulty: Difficulty,
}

/// Engine status carried on every response.
///
/// The declaration order matters: everything past `InReplay` means the match
/// is no longer live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameStatus {
    /// Engine process is up, no match yet.
    Launched,
    /// Match is being created.
    InitGame,
    /// Match is running.
    InGame,
    /// Engine is replaying a finished match.
    InReplay,
    /// Match ended normally.
    Ended,
    /// Engine is shutting down.
    Quit,
    /// Engine reported a status this crate does not know.
    Unknown,
}

impl GameStatus {
    /// True once the engine reports the match is no longer live.
    pub fn is_match_over(self) -> bool {
        self > GameStatus::InReplay
    }
}

/// A response traveling from the engine back to a bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Engine status at the time of the response.
    pub status: GameStatus,
    /// Create-game outcome, present on responses to the host's request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_game: Option<ResponseCreateGame>,
    /// Observation excerpt, when the response carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<Observation>,
    /// End-of-match report. Empty while the match is live.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub player_results: Vec<PlayerResult>,
    /// Opaque passthrough payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl Response {
    /// A bare response carrying only a status.
    pub fn with_status(status: GameStatus) -> Response {
        Response {
            status,
            create_game: None,
            observation: None,
            player_results: vec![],
            body: None,
        }
    }
}

/// Step-counter excerpt of an engine observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Observation {
    /// Game loops simulated so far.
    pub game_loop: u32,
}

/// Create-game outcome section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseCreateGame {
    /// Rejection code, absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CreateGameError>,
    /// Free-form detail accompanying a rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

/// Rejection codes a create-game request can come back with.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateGameError {
    MissingMap,
    InvalidMapPath,
    InvalidMapData,
    InvalidMapName,
    InvalidMapHandle,
    MissingPlayerSetup,
    InvalidPlayerSetup,
}

impl std::fmt::Display for CreateGameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            CreateGameError::MissingMap => "Missing Map",
            CreateGameError::InvalidMapPath => "Invalid Map Path",
            CreateGameError::InvalidMapData => "Invalid Map Data",
            CreateGameError::InvalidMapName => "Invalid Map Name",
            CreateGameError::InvalidMapHandle => "Invalid Map Handle",
            CreateGameError::MissingPlayerSetup => "Missing Player Setup",
            CreateGameError::InvalidPlayerSetup => "Invalid Player Setup",
        };
        f.write_str(text)
    }
}

/// End-of-match verdict for one player, as reported by the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerResult {
    /// 1-based player id. Player ids follow roster order.
    pub player_id: u32,
    /// The engine's outcome for this player.
    pub result: GameResult,
}

/// Engine-reported outcome for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Won.
    Victory,
    /// Lost.
    Defeat,
    /// Drew.
    Tie,
    /// The engine could not decide.
    Undecided,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_past_in_replay_end_the_match() {
        assert!(!GameStatus::Launched.is_match_over());
        assert!(!GameStatus::InGame.is_match_over());
        assert!(!GameStatus::InReplay.is_match_over());
        assert!(GameStatus::Ended.is_match_over());
        assert!(GameStatus::Quit.is_match_over());
        assert!(GameStatus::Unknown.is_match_over());
    }

    #[test]
    fn rejection_codes_render_like_the_engine() {
        let expected = [
            (CreateGameError::MissingMap, "Missing Map"),
            (CreateGameError::InvalidMapPath, "Invalid Map Path"),
            (CreateGameError::InvalidMapData, "Invalid Map Data"),
            (CreateGameError::InvalidMapName, "Invalid Map Name"),
            (CreateGameError::InvalidMapHandle, "Invalid Map Handle"),
            (CreateGameError::MissingPlayerSetup, "Missing Player Setup"),
            (CreateGameError::InvalidPlayerSetup, "Invalid Player Setup"),
        ];
        for (code, text) in expected {
            assert_eq!(code.to_string(), text);
        }
    }

    #[test]
    fn quit_marker_survives_the_wire() {
        let bytes = serde_json::to_vec(&Request::quit()).unwrap();
        let back: Request = serde_json::from_slice(&bytes).unwrap();
        assert!(back.quit);
        assert!(back.create_game.is_none());
    }
}
