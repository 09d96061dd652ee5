//! Save/load and the high-score line.
//!
//! ## Save record (toml):
//!   ```text
//!   position = [col, row]
//!   score = n
//!   ```
//! Written on an explicit save command. Loading only restores the record
//! when the saved cell is walkable on the current map.
//!
//! ## High score:
//!   A single human-readable line, `High score: n`, overwritten when a won
//!   game beats it.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::entity::{GridPos, Movable};
use crate::error::SaveError;
use crate::sim::world::GameState;

const HIGH_SCORE_PREFIX: &str = "High score:";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub position: (i32, i32),
    pub score: u32,
}

impl SaveRecord {
    pub fn capture(state: &GameState) -> Self {
        SaveRecord {
            position: (state.player.pos.col, state.player.pos.row),
            score: state.score,
        }
    }

    pub fn grid_pos(&self) -> GridPos {
        GridPos::new(self.position.0, self.position.1)
    }
}

// ══════════════════════════════════════════════════════════════
// Save record
// ══════════════════════════════════════════════════════════════

pub fn save_game(path: &Path, record: &SaveRecord) -> Result<(), SaveError> {
    let text = toml::to_string(record)?;
    std::fs::write(path, text).map_err(|source| SaveError::Io { path: path.to_path_buf(), source })?;
    info!("saved {:?} to {}", record, path.display());
    Ok(())
}

/// `Ok(None)` when nothing has been saved yet.
pub fn load_game(path: &Path) -> Result<Option<SaveRecord>, SaveError> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(SaveError::Io { path: path.to_path_buf(), source }),
    };
    let record = toml::from_str::<SaveRecord>(&text)
        .map_err(|source| SaveError::Decode { path: path.to_path_buf(), source })?;
    Ok(Some(record))
}

/// Put the player back where the record says. The score can only go up, so
/// a record below the current score leaves it alone. The record carries no
/// pickup state: after a restart, cheese already counted in the saved score
/// is back on the map and scores again.
///
/// Returns false (and changes nothing) when the saved cell is not walkable
/// on this map.
pub fn restore(state: &mut GameState, record: &SaveRecord) -> bool {
    let pos = record.grid_pos();
    if !state.grid.is_floor(pos) {
        warn!("save position {} is not a floor cell on this map, ignoring", pos);
        return false;
    }
    state.player.set_position(pos);
    state.visited.insert(pos);
    state.score = state.score.max(record.score);
    true
}

// ══════════════════════════════════════════════════════════════
// High score
// ══════════════════════════════════════════════════════════════

/// Stored best, or None when missing or unreadable.
pub fn read_high_score(path: &Path) -> Option<u32> {
    let text = std::fs::read_to_string(path).ok()?;
    text.trim().strip_prefix(HIGH_SCORE_PREFIX)?.trim().parse().ok()
}

/// Overwrite the high-score file if `score` beats it. Returns whether it did.
pub fn record_high_score(path: &Path, score: u32) -> Result<bool, SaveError> {
    if read_high_score(path).is_some_and(|best| best >= score) {
        return Ok(false);
    }
    std::fs::write(path, format!("{HIGH_SCORE_PREFIX} {score}\n"))
        .map_err(|source| SaveError::Io { path: path.to_path_buf(), source })?;
    info!("new high score {} written to {}", score, path.display());
    Ok(true)
}
