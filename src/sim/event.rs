//! Events emitted during a simulation step.
//! The loop driver logs them and the HUD reflects the latest ones.

use crate::domain::entity::{Direction, EntityId, GridPos};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved { to: GridPos },
    EnemyMoved { dir: Direction, to: GridPos },
    CheeseEaten { id: EntityId, at: GridPos, bonus: u32 },
    KeyTaken { id: EntityId, at: GridPos },
    /// Door reached without the key or with cheese left.
    DoorLocked { has_key: bool, cheese_left: usize },
    TrapHit { id: EntityId, at: GridPos },
    Caught { at: GridPos },
    Won { score: u32 },
    Quit,
}

impl GameEvent {
    /// Does this event end the level?
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameEvent::TrapHit { .. } | GameEvent::Caught { .. } | GameEvent::Won { .. } | GameEvent::Quit
        )
    }
}
