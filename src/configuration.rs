//! Config for the arena's ports, timeouts, and engine location.
//!
//! Configuration can be created programmatically using
//! [`Configuration::new()`] or by reading environment variables using
//! [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! All values are optional; an unset or unparsable variable keeps the
//! default.
//!
//! - `ARENA_LOG` — Enable logging to a file, `"true"` to enable (default: `false`)
//! - `ARENA_ENGINE_PATH` — Path to the engine executable
//! - `ARENA_DATA_VERSION` — Data version handed to engine instances
//! - `ARENA_LIBRARY_MAPS_DIR` — Shared map library directory
//! - `ARENA_PORT_BASE` (u16) — First relay port (default: `5677`)
//! - `ARENA_START_PORT` (u16) — Extra-port base handed to bots (default: `5690`)
//! - `ARENA_ENGINE_TIMEOUT_MS` (u64) — Bound on one engine response (default: `10000`)
//! - `ARENA_ENGINE_STARTUP_TIMEOUT_MS` (u64) — Grace period after engine spawn (default: `10000`)
//! - `ARENA_AGENT_STARTUP_GRACE_MS` (u64) — Grace period after bot spawn (default: `5000`)
//! - `ARENA_IDLE_TIMEOUT_MS` (u64) — Bot inactivity window (default: `50000`)
//! - `ARENA_MAX_GAME_LOOPS` (u32) — Match duration ceiling (default: `72000`)

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one [`Arena`](crate::arena::Arena).
#[derive(Debug, Clone)]
pub struct Configuration {
    pub(crate) log: bool,
    pub(crate) engine_path: PathBuf,
    pub(crate) data_version: Option<String>,
    pub(crate) library_maps_dir: Option<PathBuf>,
    pub(crate) port_base: u16,
    pub(crate) start_port: u16,
    pub(crate) engine_timeout: Duration,
    pub(crate) engine_startup_timeout: Duration,
    pub(crate) agent_startup_grace: Duration,
    pub(crate) idle_timeout: Duration,
    pub(crate) max_game_loops: u32,
}

impl Configuration {
    /// Create a configuration with default parameters.
    ///
    /// The engine path starts empty and must be set with
    /// [`with_engine_path`](Self::with_engine_path) (or `ARENA_ENGINE_PATH`)
    /// before a match can start.
    pub fn new() -> Self {
        Self {
            log: false,
            engine_path: PathBuf::new(),
            data_version: None,
            library_maps_dir: None,
            port_base: 5677,
            start_port: 5690,
            engine_timeout: Duration::from_secs(10),
            engine_startup_timeout: Duration::from_secs(10),
            agent_startup_grace: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(50),
            max_game_loops: 72_000,
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// See the module documentation for the recognized variables. Any other
    /// value (including unset) keeps the default for that field.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn parse_env<T: std::str::FromStr>(var: &str) -> Option<T> {
            std::env::var(var).ok()?.parse().ok()
        }

        fn parse_duration_millis(var: &str) -> Option<Duration> {
            parse_env::<u64>(var).map(Duration::from_millis)
        }

        let defaults = Self::new();
        Self {
            log: get_env_flag("ARENA_LOG", defaults.log),
            engine_path: std::env::var("ARENA_ENGINE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.engine_path),
            data_version: std::env::var("ARENA_DATA_VERSION").ok(),
            library_maps_dir: std::env::var("ARENA_LIBRARY_MAPS_DIR")
                .ok()
                .map(PathBuf::from),
            port_base: parse_env("ARENA_PORT_BASE").unwrap_or(defaults.port_base),
            start_port: parse_env("ARENA_START_PORT").unwrap_or(defaults.start_port),
            engine_timeout: parse_duration_millis("ARENA_ENGINE_TIMEOUT_MS")
                .unwrap_or(defaults.engine_timeout),
            engine_startup_timeout: parse_duration_millis("ARENA_ENGINE_STARTUP_TIMEOUT_MS")
                .unwrap_or(defaults.engine_startup_timeout),
            agent_startup_grace: parse_duration_millis("ARENA_AGENT_STARTUP_GRACE_MS")
                .unwrap_or(defaults.agent_startup_grace),
            idle_timeout: parse_duration_millis("ARENA_IDLE_TIMEOUT_MS")
                .unwrap_or(defaults.idle_timeout),
            max_game_loops: parse_env("ARENA_MAX_GAME_LOOPS").unwrap_or(defaults.max_game_loops),
        }
    }

    /// Enable or disable logging to file.
    #[must_use]
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Set the path to the engine executable.
    #[must_use]
    pub fn with_engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.engine_path = path.into();
        self
    }

    /// Set the data version handed to engine instances.
    #[must_use]
    pub fn with_data_version(mut self, version: impl Into<String>) -> Self {
        self.data_version = Some(version.into());
        self
    }

    /// Set the shared map library directory searched during map resolution.
    #[must_use]
    pub fn with_library_maps_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_maps_dir = Some(dir.into());
        self
    }

    /// Set the first relay port. Slot `i`'s bot endpoint binds `port_base + i`
    /// and its engine listens on `port_base + slots + i`.
    #[must_use]
    pub fn with_port_base(mut self, port: u16) -> Self {
        self.port_base = port;
        self
    }

    /// Set the extra-port base handed to bots as `--StartPort`.
    #[must_use]
    pub fn with_start_port(mut self, port: u16) -> Self {
        self.start_port = port;
        self
    }

    /// Bound on waiting for a single engine response (relay forwarding, match
    /// creation, and the final outcome query).
    #[must_use]
    pub fn with_engine_timeout(mut self, timeout: Duration) -> Self {
        self.engine_timeout = timeout;
        self
    }

    /// Grace period engine instances get to come up after spawning.
    #[must_use]
    pub fn with_engine_startup_timeout(mut self, timeout: Duration) -> Self {
        self.engine_startup_timeout = timeout;
        self
    }

    /// Grace period bots get to connect and join after spawning.
    #[must_use]
    pub fn with_agent_startup_grace(mut self, grace: Duration) -> Self {
        self.agent_startup_grace = grace;
        self
    }

    /// Bot inactivity window before its slot is written off as crashed.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Match duration ceiling, in game loops.
    #[must_use]
    pub fn with_max_game_loops(mut self, loops: u32) -> Self {
        self.max_game_loops = loops;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
