//! Error taxonomy.
//!
//! Only failures of the outside world live here (files, assets).
//! Game rule outcomes (walls, traps, being caught) are events, not errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entity::GridPos;

/// Problems found while turning map text into a level.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("level map is empty")]
    Empty,

    #[error("duplicate '{marker}' marker at {second} (first at {first})")]
    DuplicateMarker {
        marker: char,
        first: GridPos,
        second: GridPos,
    },

    #[error("no 'P' marker and fallback spawn {fallback} is not a floor cell")]
    NoSpawn { fallback: GridPos },
}

/// Level resource could not be produced. Fatal at startup.
#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("could not read level file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write default level to {path}: {source}")]
    WriteDefault {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("level file {path} is invalid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// A sprite file is missing or unusable. Always recovered with a fallback.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("sprite {path} unreadable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sprite {path} has no glyph")]
    NoGlyph { path: PathBuf },
}

/// Persistence failure. Logged; gameplay continues.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode save record: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("corrupted save record in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
