//! # Sc2 Arena
//!
//! A Rust crate for running head-to-head StarCraft II bot matches: it
//! launches one engine instance per roster slot, relays the protocol between
//! each bot and "its" engine, and folds every slot's fate into one composite
//! verdict.
//!
//! It provides:
//! - Match orchestration via [`Arena`](crate::arena::Arena): engine fleet
//!   launch, host designation and match creation, bot launch, teardown
//! - A per-slot relay pump ([`relay`]) that intercepts leave requests,
//!   enforces idle and match-duration limits, and classifies how each slot
//!   ended
//! - A composite [`MatchVerdict`](crate::verdict::MatchVerdict) bit set with
//!   per-slot win/crash/forfeit bits
//! - Map resolution against the usual directory precedence ([`map`])
//! - Pluggable transports: the relay is generic over the
//!   [`EngineLink`](crate::channel::EngineLink) and
//!   [`AgentGate`](crate::channel::AgentGate) traits, with TCP
//!   implementations included
//!
//! Each match consists of N bots, each running as a separate OS process and
//! talking only to its own engine instance through the relay. Relays run
//! concurrently and independently; one misbehaving bot never stalls the
//! others.
//!
//! # Usage Example
//!
//! ```no_run
//! use sc2_arena::prelude::*;
//!
//! fn main() {
//!     let bots = vec![
//!         Bot::participant("5minBot", "/opt/bots/5minBot", Race::Terran),
//!         Bot::computer("builtin", "/opt/bots/shim", Race::Protoss, Difficulty::Hard),
//!     ];
//!     let maps = vec!["AcolyteLE.SC2Map".to_string()];
//!     let config = Configuration::new()
//!         .with_engine_path("/opt/StarCraftII/Versions/Base75689/SC2_x64")
//!         .with_log(true);
//!
//!     let arena = Arena::new(bots, maps, config);
//!     let verdict = arena.play("AcolyteLE.SC2Map");
//!     println!("{verdict}");
//!     if verdict.is_error() {
//!         // Unrecoverable setup failure; details are in the log.
//!         std::process::exit(1);
//!     }
//! }
//! ```
//!
//! # Bot Requirements
//!
//! - A bot is an executable. It is launched with `--GamePort <port>`
//!   `--StartPort <port>` `--LadderServer 127.0.0.1` (plus
//!   computer-opponent flags for [`PlayerKind::Computer`](crate::bot::PlayerKind)
//!   entries and any extra per-bot arguments), and must connect to
//!   `127.0.0.1:<GamePort>`.
//! - Messages are framed as a 4-byte little-endian length prefix followed by
//!   a JSON body; see [`proto`] for the fields the relay interprets.
//! - A bot that stays silent past the idle timeout is scored as crashed; a
//!   bot that sends a leave request is scored as forfeiting.
#![warn(missing_docs)]

pub mod arena;
pub mod bot;
pub mod channel;
pub mod configuration;
mod launcher;
mod logger;
pub mod map;
pub mod match_runner;
mod process;
pub mod proto;
pub mod relay;
pub mod setup;
pub mod verdict;

pub use anyhow;

/// Commonly used types for quick access.
///
/// ```rust
/// use sc2_arena::prelude::*;
/// ```
pub mod prelude {
    pub use crate::arena::Arena;
    pub use crate::bot::{Bot, Difficulty, PlayerKind, Race};
    pub use crate::configuration::Configuration;
    pub use crate::verdict::MatchVerdict;
}
