//! Map identifier resolution.
//!
//! Identifiers are resolved best-effort against a fixed directory precedence.
//! A miss is not an error here: the engine itself reports unusable maps when
//! the match is created.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Extension marking a locally stored map file.
pub const LOCAL_MAP_EXTENSION: &str = "SC2Map";

/// A resolved map reference, as understood by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapRef {
    /// A map hosted by the remote service, referenced by bare name.
    Remote(String),
    /// A map file on the local filesystem.
    Local(PathBuf),
}

/// Resolve a map identifier against the local filesystem.
///
/// Identifiers without the [`LOCAL_MAP_EXTENSION`] always denote remote maps
/// and are returned without touching the filesystem. Local identifiers are
/// checked in order, first match wins: the identifier itself, the engine's
/// `maps` directory, then `library_dir`. When nothing exists the bare
/// identifier is returned as a local path, presumed to live in the
/// remote-synced maps directory and to be fetched later.
pub fn resolve_map(name: &str, engine_path: &Path, library_dir: Option<&Path>) -> MapRef {
    let has_extension = Path::new(name)
        .extension()
        .is_some_and(|ext| ext == LOCAL_MAP_EXTENSION);
    if !has_extension {
        return MapRef::Remote(name.to_string());
    }

    let direct = PathBuf::from(name);
    if direct.is_file() {
        return MapRef::Local(direct);
    }

    let game_relative = engine_path.join("maps").join(name);
    if game_relative.is_file() {
        return MapRef::Local(game_relative);
    }

    if let Some(dir) = library_dir {
        let library_relative = dir.join(name);
        if library_relative.is_file() {
            return MapRef::Local(library_relative);
        }
    }

    MapRef::Local(direct)
}
