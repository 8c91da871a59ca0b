//! Bot roster entries and the player attributes the engine is told about.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One roster entry: an external bot executable bound to a match slot.
///
/// The slot index is the entry's position in the roster handed to
/// [`Arena::new`](crate::arena::Arena::new). Entries are immutable once the
/// match starts.
#[derive(Debug, Clone)]
pub struct Bot {
    /// Display name used in logs.
    pub name: String,
    /// Path to the bot executable.
    pub path_to_exe: PathBuf,
    /// Extra arguments appended after the computed relay arguments.
    pub args: Vec<String>,
    /// Faction the bot plays.
    pub race: Race,
    /// Whether the slot is an external participant or an engine-driven opponent.
    pub kind: PlayerKind,
    /// Strength of the built-in AI. Only meaningful for [`PlayerKind::Computer`].
    pub difficulty: Difficulty,
}

impl Bot {
    /// A participant entry with no extra launch arguments.
    pub fn participant(
        name: impl Into<String>,
        path_to_exe: impl Into<PathBuf>,
        race: Race,
    ) -> Bot {
        Bot {
            name: name.into(),
            path_to_exe: path_to_exe.into(),
            args: vec![],
            race,
            kind: PlayerKind::Participant,
            difficulty: Difficulty::Easy,
        }
    }

    /// An entry hosting the engine's built-in AI at the given strength.
    pub fn computer(
        name: impl Into<String>,
        path_to_exe: impl Into<PathBuf>,
        race: Race,
        difficulty: Difficulty,
    ) -> Bot {
        Bot {
            name: name.into(),
            path_to_exe: path_to_exe.into(),
            args: vec![],
            race,
            kind: PlayerKind::Computer,
            difficulty,
        }
    }

    /// Replace the extra launch arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Bot {
        self.args = args;
        self
    }
}

/// Factions a player can field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Race {
    /// Terran.
    Terran,
    /// Zerg.
    Zerg,
    /// Protoss.
    Protoss,
    /// Let the engine pick.
    Random,
}

impl Race {
    /// The CLI form handed to bots hosting a computer opponent.
    pub fn as_str(self) -> &'static str {
        match self {
            Race::Terran => "Terran",
            Race::Zerg => "Zerg",
            Race::Protoss => "Protoss",
            Race::Random => "Random",
        }
    }
}

/// Who controls a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    /// An external bot process connected through a relay channel.
    Participant,
    /// The engine's built-in AI.
    Computer,
}

/// Strength levels of the engine's built-in AI.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    VeryEasy,
    Easy,
    Medium,
    MediumHard,
    Hard,
    HardVeryHard,
    VeryHard,
    CheatVision,
    CheatMoney,
    CheatInsane,
}

impl Difficulty {
    /// The CLI form handed to bots hosting a computer opponent.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::VeryEasy => "VeryEasy",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::MediumHard => "MediumHard",
            Difficulty::Hard => "Hard",
            Difficulty::HardVeryHard => "HardVeryHard",
            Difficulty::VeryHard => "VeryHard",
            Difficulty::CheatVision => "CheatVision",
            Difficulty::CheatMoney => "CheatMoney",
            Difficulty::CheatInsane => "CheatInsane",
        }
    }
}
